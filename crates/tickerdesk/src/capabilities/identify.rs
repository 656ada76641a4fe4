//! Ticker resolution from a company name or keyword

use super::{data_absent, from_stock_error, parse_params, required_text, respond, text_or_na};
use crate::api::{ApiFunction, MarketDataSource, QueryRequest};
use crate::envelope::{Envelope, TickerMatch};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tickerdesk_core::{Result, Tool};
use tickerdesk_llm::tools::schema;
use tracing::{debug, instrument};

pub const TOOL_NAME: &str = "get_ticker";

/// Resolves a free-text keyword to its best-matching ticker
pub struct TickerResolver {
    source: Arc<dyn MarketDataSource>,
}

#[derive(Debug, Deserialize)]
struct Params {
    keyword: String,
}

impl TickerResolver {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }

    /// Look up `keyword`; the provider's first match wins
    #[instrument(skip(self))]
    pub async fn resolve(&self, keyword: &str) -> Envelope<TickerMatch> {
        let keyword = match required_text(keyword, "keyword") {
            Ok(k) => k,
            Err(failure) => return failure.into(),
        };

        let request = QueryRequest::new(ApiFunction::SymbolSearch).param("keywords", keyword.as_str());
        let body = match self.source.query(request).await {
            Ok(body) => body,
            Err(e) => {
                return from_stock_error(
                    format!("Failed to retrieve ticker information for '{keyword}'."),
                    &e,
                )
                .into();
            }
        };

        let best = body
            .get("bestMatches")
            .and_then(Value::as_array)
            .and_then(|matches| matches.first())
            .filter(|m| m.get("1. symbol").and_then(Value::as_str).is_some());

        match best {
            Some(best) => {
                let ticker = text_or_na(best, "1. symbol");
                debug!(%keyword, %ticker, "Ticker resolved");
                Envelope::Success(TickerMatch {
                    ticker,
                    name: text_or_na(best, "2. name"),
                    currency: text_or_na(best, "8. currency"),
                })
            }
            None => data_absent(format!("No ticker found for '{keyword}'."), &body).into(),
        }
    }
}

#[async_trait]
impl Tool for TickerResolver {
    async fn execute(&self, params: Value) -> Result<Value> {
        let envelope = match parse_params::<Params>(TOOL_NAME, params) {
            Ok(p) => self.resolve(&p.keyword).await,
            Err(failure) => failure.into(),
        };
        respond(&envelope)
    }

    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Find the stock ticker symbol for a company name or keyword. \
         Returns the ticker, company name and trading currency of the best match."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({ "keyword": schema::string("Company name or keyword, e.g. 'tesla'") }),
            &["keyword"],
        )
    }
}
