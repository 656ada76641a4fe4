//! Market data access
//!
//! Capabilities talk to Alpha Vantage only through [`MarketDataSource`], so
//! tests can swap in a mock that returns canned bodies.

pub mod alpha_vantage;

pub use alpha_vantage::AlphaVantageClient;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// Alpha Vantage query functions used by the desk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFunction {
    SymbolSearch,
    GlobalQuote,
    TimeSeriesDaily,
    NewsSentiment,
}

impl ApiFunction {
    /// Value of the `function` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SymbolSearch => "SYMBOL_SEARCH",
            Self::GlobalQuote => "GLOBAL_QUOTE",
            Self::TimeSeriesDaily => "TIME_SERIES_DAILY",
            Self::NewsSentiment => "NEWS_SENTIMENT",
        }
    }
}

impl fmt::Display for ApiFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound query, without credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub function: ApiFunction,
    pub params: Vec<(&'static str, String)>,
}

impl QueryRequest {
    pub fn new(function: ApiFunction) -> Self {
        Self {
            function,
            params: Vec::new(),
        }
    }

    /// Add a query parameter
    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    /// Look up a parameter value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Source of raw Alpha Vantage response bodies
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Run one query and return the decoded JSON body
    ///
    /// Errors are transport failures only; a 200 answer that lacks data is
    /// returned as-is for the caller to inspect.
    async fn query(&self, request: QueryRequest) -> Result<Value>;
}

/// Keys Alpha Vantage uses for notices sent in place of data
const NOTICE_KEYS: [&str; 3] = ["Error Message", "Note", "Information"];

/// Extract a provider notice (bad symbol, rate limit, bad key) from a body
pub fn provider_notice(body: &Value) -> Option<String> {
    NOTICE_KEYS.iter().find_map(|key| {
        body.get(*key).map(|v| match v.as_str() {
            Some(text) => text.to_string(),
            None => v.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_request_params() {
        let request = QueryRequest::new(ApiFunction::TimeSeriesDaily)
            .param("symbol", "AAPL")
            .param("outputsize", "full");
        assert_eq!(request.get("symbol"), Some("AAPL"));
        assert_eq!(request.get("outputsize"), Some("full"));
        assert_eq!(request.get("apikey"), None);
        assert_eq!(request.function.to_string(), "TIME_SERIES_DAILY");
    }

    #[test]
    fn test_provider_notice() {
        assert_eq!(
            provider_notice(&json!({"Note": "Thank you for using Alpha Vantage!"})).as_deref(),
            Some("Thank you for using Alpha Vantage!")
        );
        assert_eq!(
            provider_notice(&json!({"Error Message": "Invalid API call."})).as_deref(),
            Some("Invalid API call.")
        );
        assert!(provider_notice(&json!({"bestMatches": []})).is_none());
    }
}
