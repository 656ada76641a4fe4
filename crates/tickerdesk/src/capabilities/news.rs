//! Recent news with sentiment for a ticker

use super::{data_absent, from_stock_error, parse_params, required_text, respond, text_or_na};
use crate::api::{ApiFunction, MarketDataSource, QueryRequest};
use crate::envelope::{Envelope, NewsDigest, NewsItem, NewsReport, TickerNews};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tickerdesk_core::{Result, Tool};
use tickerdesk_llm::tools::schema;
use tracing::{debug, instrument};

pub const TOOL_NAME: &str = "get_ticker_news";

/// Fetches the most recent news items and their sentiment
#[derive(Clone)]
pub struct NewsLookup {
    source: Arc<dyn MarketDataSource>,
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct Params {
    ticker: String,
}

impl NewsLookup {
    /// `limit` caps how many feed items are returned
    pub fn new(source: Arc<dyn MarketDataSource>, limit: usize) -> Self {
        Self { source, limit }
    }

    #[instrument(skip(self))]
    pub async fn lookup(&self, ticker: &str) -> Envelope<NewsReport> {
        let ticker = match required_text(ticker, "ticker") {
            Ok(t) => t,
            Err(failure) => return failure.into(),
        };

        let request = QueryRequest::new(ApiFunction::NewsSentiment).param("tickers", ticker.as_str());
        let body = match self.source.query(request).await {
            Ok(body) => body,
            Err(e) => {
                return from_stock_error(
                    format!("Failed to retrieve news information for '{ticker}'."),
                    &e,
                )
                .into();
            }
        };

        let feed = match body.get("feed").and_then(Value::as_array) {
            Some(feed) if !feed.is_empty() => feed,
            _ => return data_absent(format!("No news found for ticker '{ticker}'."), &body).into(),
        };

        let items: Vec<NewsItem> = feed.iter().take(self.limit).map(news_item).collect();
        debug!(%ticker, available = feed.len(), returned = items.len(), "News collected");

        Envelope::Success(NewsReport {
            news: TickerNews {
                ticker,
                digest: NewsDigest {
                    sentiment_score_definition: text_or_na(&body, "sentiment_score_definition"),
                    feed: items,
                },
            },
        })
    }
}

fn news_item(entry: &Value) -> NewsItem {
    let overall_sentiment_score = match entry.get("overall_sentiment_score") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };

    NewsItem {
        title: text_or_na(entry, "title"),
        time_published: text_or_na(entry, "time_published"),
        source: text_or_na(entry, "source"),
        summary: text_or_na(entry, "summary"),
        overall_sentiment_score,
        overall_sentiment_label: text_or_na(entry, "overall_sentiment_label"),
    }
}

#[async_trait]
impl Tool for NewsLookup {
    async fn execute(&self, params: Value) -> Result<Value> {
        let envelope = match parse_params::<Params>(TOOL_NAME, params) {
            Ok(p) => self.lookup(&p.ticker).await,
            Err(failure) => failure.into(),
        };
        respond(&envelope)
    }

    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Get the latest news articles about a stock ticker, each with an overall \
         sentiment score and label."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({ "ticker": schema::string("Ticker symbol, e.g. 'NVDA'") }),
            &["ticker"],
        )
    }
}
