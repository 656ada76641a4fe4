//! Latest price lookup

use super::{data_absent, from_stock_error, parse_params, required_text, respond};
use crate::api::{ApiFunction, MarketDataSource, QueryRequest};
use crate::envelope::{Envelope, Quote};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tickerdesk_core::{Result, Tool};
use tickerdesk_llm::tools::schema;
use tracing::instrument;

pub const TOOL_NAME: &str = "get_ticker_price";

/// Fetches the latest traded price for a ticker
pub struct PriceLookup {
    source: Arc<dyn MarketDataSource>,
}

#[derive(Debug, Deserialize)]
struct Params {
    ticker: String,
}

impl PriceLookup {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }

    #[instrument(skip(self))]
    pub async fn quote(&self, ticker: &str) -> Envelope<Quote> {
        let ticker = match required_text(ticker, "ticker") {
            Ok(t) => t,
            Err(failure) => return failure.into(),
        };

        let request = QueryRequest::new(ApiFunction::GlobalQuote).param("symbol", ticker.as_str());
        let body = match self.source.query(request).await {
            Ok(body) => body,
            Err(e) => {
                return from_stock_error(
                    format!("Failed to retrieve price information for '{ticker}'."),
                    &e,
                )
                .into();
            }
        };

        let price = body
            .get("Global Quote")
            .and_then(|quote| quote.get("05. price"))
            .and_then(Value::as_str);

        match price {
            Some(price) => Envelope::Success(Quote {
                price: price.to_string(),
                ticker,
            }),
            None => data_absent(format!("No price found for ticker '{ticker}'."), &body).into(),
        }
    }
}

#[async_trait]
impl Tool for PriceLookup {
    async fn execute(&self, params: Value) -> Result<Value> {
        let envelope = match parse_params::<Params>(TOOL_NAME, params) {
            Ok(p) => self.quote(&p.ticker).await,
            Err(failure) => failure.into(),
        };
        respond(&envelope)
    }

    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Get the latest traded price for a stock ticker symbol."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({ "ticker": schema::string("Ticker symbol, e.g. 'TSLA'") }),
            &["ticker"],
        )
    }
}
