//! The five stock capabilities
//!
//! Each capability wraps one Alpha Vantage query (the analysis composes two)
//! and always answers with an [`Envelope`]. They implement [`Tool`] so the
//! planner can call them by name; `execute` never fails, bad arguments come
//! back as `invalid_input` envelopes.

pub mod analysis;
pub mod identify;
pub mod news;
pub mod price;
pub mod price_change;

pub use analysis::AnalysisComposer;
pub use identify::TickerResolver;
pub use news::NewsLookup;
pub use price::PriceLookup;
pub use price_change::PriceChangeCalculator;

use crate::api::{MarketDataSource, provider_notice};
use crate::config::DeskConfig;
use crate::envelope::{Envelope, Failure, FailureKind, NOT_AVAILABLE};
use crate::error::StockError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tickerdesk_core::{Error, Tool, ToolRegistry};

/// Tool names, in registration order
pub const TOOL_NAMES: [&str; 5] = [
    identify::TOOL_NAME,
    price::TOOL_NAME,
    price_change::TOOL_NAME,
    news::TOOL_NAME,
    analysis::TOOL_NAME,
];

/// All five capabilities over one market data source
#[derive(Clone)]
pub struct CapabilitySet {
    pub resolver: Arc<TickerResolver>,
    pub price: Arc<PriceLookup>,
    pub price_change: Arc<PriceChangeCalculator>,
    pub news: Arc<NewsLookup>,
    pub analysis: Arc<AnalysisComposer>,
}

impl CapabilitySet {
    pub fn new(source: Arc<dyn MarketDataSource>, config: &DeskConfig) -> Self {
        let price_change = PriceChangeCalculator::new(Arc::clone(&source), config.default_days);
        let news = NewsLookup::new(Arc::clone(&source), config.news_limit);

        Self {
            resolver: Arc::new(TickerResolver::new(Arc::clone(&source))),
            price: Arc::new(PriceLookup::new(source)),
            analysis: Arc::new(AnalysisComposer::new(news.clone(), price_change.clone())),
            price_change: Arc::new(price_change),
            news: Arc::new(news),
        }
    }

    /// The capabilities as tools, in a fixed order
    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        vec![
            Arc::clone(&self.resolver) as Arc<dyn Tool>,
            Arc::clone(&self.price) as Arc<dyn Tool>,
            Arc::clone(&self.price_change) as Arc<dyn Tool>,
            Arc::clone(&self.news) as Arc<dyn Tool>,
            Arc::clone(&self.analysis) as Arc<dyn Tool>,
        ]
    }

    /// A registry holding all five tools
    pub fn registry(&self) -> ToolRegistry {
        let registry = ToolRegistry::new();
        for tool in self.tools() {
            registry.register(tool);
        }
        registry
    }
}

/// Fold a client error into a failure with the capability's message
pub(crate) fn from_stock_error(message: String, err: &StockError) -> Failure {
    let kind = match err {
        StockError::InvalidInput(_) => FailureKind::InvalidInput,
        _ => FailureKind::Transport,
    };
    Failure::new(kind, message).with_detail(Some(err.to_string()))
}

/// Data-absent failure carrying any provider notice found in `body`
pub(crate) fn data_absent(message: String, body: &Value) -> Failure {
    Failure::data_absent(message).with_detail(provider_notice(body))
}

/// Trimmed, non-empty text argument
pub(crate) fn required_text(value: &str, what: &str) -> Result<String, Failure> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Failure::invalid_input(format!("{what} must not be empty.")))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Session window argument
pub(crate) fn required_days(days: i64) -> Result<usize, Failure> {
    usize::try_from(days)
        .ok()
        .filter(|d| *d >= 1)
        .ok_or_else(|| Failure::invalid_input(format!("days must be at least 1, got {days}.")))
}

/// String field of a provider object, `"N/A"` when absent
pub(crate) fn text_or_na(object: &Value, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .map_or_else(|| NOT_AVAILABLE.to_string(), str::to_string)
}

/// Decode tool arguments
pub(crate) fn parse_params<T: DeserializeOwned>(tool: &str, params: Value) -> Result<T, Failure> {
    serde_json::from_value(params)
        .map_err(|e| Failure::invalid_input(format!("Invalid arguments for '{tool}': {e}")))
}

/// Envelope as a tool result
pub(crate) fn respond<T: Serialize>(envelope: &Envelope<T>) -> tickerdesk_core::Result<Value> {
    envelope
        .to_value()
        .map_err(|e| Error::ProcessingFailed(format!("failed to encode result: {e}")))
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::api::{ApiFunction, MockMarketDataSource};
    use crate::error::StockError;
    use serde_json::Value;

    /// Mock that answers every call with `body`, asserting the function
    pub fn answering(function: ApiFunction, body: Value) -> MockMarketDataSource {
        let mut source = MockMarketDataSource::new();
        source
            .expect_query()
            .withf(move |request| request.function == function)
            .returning(move |_| Ok(body.clone()));
        source
    }

    /// Mock whose calls all fail at the transport level
    pub fn unreachable() -> MockMarketDataSource {
        let mut source = MockMarketDataSource::new();
        source
            .expect_query()
            .returning(|_| Err(StockError::Http { status: 502 }));
        source
    }

    /// Mock that must never be called
    pub fn untouched() -> MockMarketDataSource {
        let mut source = MockMarketDataSource::new();
        source.expect_query().never();
        source
    }
}
