//! Combined news and price-change analysis

use super::{parse_params, required_days, required_text, respond};
use crate::capabilities::{NewsLookup, PriceChangeCalculator};
use crate::envelope::{Analysis, Envelope, Failure, FailureKind};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tickerdesk_core::{Result, Tool};
use tickerdesk_llm::tools::schema;
use tracing::{info, instrument, warn};

pub const TOOL_NAME: &str = "get_ticker_analysis";

/// Runs news and price-change lookups concurrently and merges them
pub struct AnalysisComposer {
    news: NewsLookup,
    price_change: PriceChangeCalculator,
}

#[derive(Debug, Deserialize)]
struct Params {
    ticker: String,
    #[serde(default)]
    days: Option<i64>,
}

impl AnalysisComposer {
    pub fn new(news: NewsLookup, price_change: PriceChangeCalculator) -> Self {
        Self { news, price_change }
    }

    /// Succeeds only if both parts succeed
    ///
    /// On failure the generic message names the ticker and the individual
    /// failures are kept in `causes`, news first.
    #[instrument(skip(self))]
    pub async fn analyze(&self, ticker: &str, days: i64) -> Envelope<Analysis> {
        let ticker = match required_text(ticker, "ticker") {
            Ok(t) => t,
            Err(failure) => return failure.into(),
        };
        if let Err(failure) = required_days(days) {
            return failure.into();
        }

        let (news, change) = tokio::join!(
            self.news.lookup(&ticker),
            self.price_change.change(&ticker, days)
        );

        match (news.into_result(), change.into_result()) {
            (Ok(report), Ok(change)) => {
                info!(%ticker, days, items = report.news.digest.feed.len(), "Analysis assembled");
                Envelope::Success(Analysis {
                    news: report.news.digest,
                    price_change: change.movement,
                    ticker,
                })
            }
            (news, change) => {
                let causes: Vec<Failure> = [news.err(), change.err()].into_iter().flatten().collect();
                warn!(%ticker, failed_parts = causes.len(), "Analysis incomplete");
                let kind = causes.first().map_or(FailureKind::Transport, |c| c.kind);
                Failure::new(
                    kind,
                    format!("Failed to retrieve complete analysis for '{ticker}'."),
                )
                .with_causes(causes)
                .into()
            }
        }
    }
}

#[async_trait]
impl Tool for AnalysisComposer {
    async fn execute(&self, params: Value) -> Result<Value> {
        let envelope = match parse_params::<Params>(TOOL_NAME, params) {
            Ok(p) => {
                let days = p.days.unwrap_or_else(|| self.price_change.default_days());
                self.analyze(&p.ticker, days).await
            }
            Err(failure) => failure.into(),
        };
        respond(&envelope)
    }

    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Get a combined picture of a stock ticker: the latest news with sentiment plus \
         the closing price change over the last N trading days (default 7). Use this for \
         questions about a stock's current status or why its price moved."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "ticker": schema::string("Ticker symbol, e.g. 'MSFT'"),
                "days": schema::integer_min("Number of trading sessions for the price change", 1),
            }),
            &["ticker"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiFunction, MockMarketDataSource};
    use crate::capabilities::news::tests::news_body;
    use crate::capabilities::price_change::tests::daily_series;
    use crate::capabilities::testing::untouched;
    use crate::error::StockError;
    use std::sync::Arc;

    fn composer(source: MockMarketDataSource) -> AnalysisComposer {
        let source: Arc<dyn crate::api::MarketDataSource> = Arc::new(source);
        AnalysisComposer::new(
            NewsLookup::new(Arc::clone(&source), 15),
            PriceChangeCalculator::new(source, 7),
        )
    }

    /// Answers news and series queries independently
    fn source(news: Option<Value>, series: Option<Value>) -> MockMarketDataSource {
        let mut source = MockMarketDataSource::new();
        source
            .expect_query()
            .withf(|r| r.function == ApiFunction::NewsSentiment)
            .times(1)
            .returning(move |_| news.clone().ok_or(StockError::Http { status: 500 }));
        source
            .expect_query()
            .withf(|r| r.function == ApiFunction::TimeSeriesDaily)
            .times(1)
            .returning(move |_| series.clone().ok_or(StockError::Http { status: 500 }));
        source
    }

    const CLOSES: [f64; 8] = [410.0, 409.0, 405.5, 404.0, 401.25, 400.0, 398.0, 395.0];

    #[tokio::test]
    async fn test_both_parts_merge_without_nested_ticker() {
        let composer = composer(source(Some(news_body(3)), Some(daily_series(&CLOSES))));

        let value = composer
            .execute(json!({"ticker": "MSFT", "days": 7}))
            .await
            .unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["ticker"], "MSFT");
        assert_eq!(value["news"]["feed"].as_array().unwrap().len(), 3);
        assert!(value["news"].get("ticker").is_none());
        assert!(value["price_change"].get("ticker").is_none());
        assert!(value["price_change"].get("status").is_none());
        assert_eq!(value["price_change"]["price_change"], CLOSES[0] - CLOSES[6]);
    }

    #[tokio::test]
    async fn test_news_failure_fails_whole_analysis() {
        let composer = composer(source(None, Some(daily_series(&CLOSES))));

        let failure = composer.analyze("MSFT", 7).await.into_result().unwrap_err();
        assert_eq!(
            failure.error_message,
            "Failed to retrieve complete analysis for 'MSFT'."
        );
        assert_eq!(failure.kind, FailureKind::Transport);
        assert_eq!(failure.causes.len(), 1);
        assert_eq!(
            failure.causes[0].error_message,
            "Failed to retrieve news information for 'MSFT'."
        );
    }

    #[tokio::test]
    async fn test_both_failures_are_kept_in_order() {
        let composer = composer(source(
            Some(json!({"feed": []})),
            Some(daily_series(&CLOSES[..2])),
        ));

        let failure = composer.analyze("MSFT", 7).await.into_result().unwrap_err();
        assert_eq!(failure.kind, FailureKind::DataAbsent);
        assert_eq!(failure.causes.len(), 2);
        assert_eq!(failure.causes[0].error_message, "No news found for ticker 'MSFT'.");
        assert_eq!(
            failure.causes[1].error_message,
            "Not enough data available for 'MSFT' over 7 days."
        );
    }

    #[tokio::test]
    async fn test_invalid_days_rejected_up_front() {
        let source: Arc<dyn crate::api::MarketDataSource> = Arc::new(untouched());
        let composer = AnalysisComposer::new(
            NewsLookup::new(Arc::clone(&source), 15),
            PriceChangeCalculator::new(source, 7),
        );

        let failure = composer.analyze("MSFT", 0).await.into_result().unwrap_err();
        assert_eq!(failure.kind, FailureKind::InvalidInput);
        assert!(failure.causes.is_empty());
    }
}
