//! Close-to-close price change over N trading sessions

use super::{from_stock_error, parse_params, required_days, required_text, respond};
use crate::api::{ApiFunction, MarketDataSource, QueryRequest, provider_notice};
use crate::envelope::{Envelope, Failure, PriceChange, PriceMovement};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tickerdesk_core::{Result, Tool};
use tickerdesk_llm::tools::schema;
use tracing::{debug, instrument};

pub const TOOL_NAME: &str = "get_ticker_price_change";

/// Sessions in the compact daily series
const COMPACT_SESSIONS: usize = 100;

const SERIES_KEY: &str = "Time Series (Daily)";
const CLOSE_KEY: &str = "4. close";

/// Computes the change in closing price across a window of sessions
#[derive(Clone)]
pub struct PriceChangeCalculator {
    source: Arc<dyn MarketDataSource>,
    default_days: i64,
}

#[derive(Debug, Deserialize)]
struct Params {
    ticker: String,
    #[serde(default)]
    days: Option<i64>,
}

/// Why a series could not produce a movement
#[derive(Debug, PartialEq)]
enum SeriesError {
    TooShort,
    BadDate(String),
    BadClose(String),
}

impl PriceChangeCalculator {
    pub fn new(source: Arc<dyn MarketDataSource>, default_days: i64) -> Self {
        Self {
            source,
            default_days,
        }
    }

    /// Window used when a caller gives none
    pub fn default_days(&self) -> i64 {
        self.default_days
    }

    /// Change between the latest close and the close `days - 1` sessions earlier
    #[instrument(skip(self))]
    pub async fn change(&self, ticker: &str, days: i64) -> Envelope<PriceChange> {
        let (ticker, sessions) = match (required_text(ticker, "ticker"), required_days(days)) {
            (Ok(t), Ok(d)) => (t, d),
            (Err(failure), _) | (_, Err(failure)) => return failure.into(),
        };

        let mut request =
            QueryRequest::new(ApiFunction::TimeSeriesDaily).param("symbol", ticker.as_str());
        if sessions > COMPACT_SESSIONS {
            request = request.param("outputsize", "full");
        }

        let body = match self.source.query(request).await {
            Ok(body) => body,
            Err(e) => {
                return from_stock_error(
                    format!("Failed to retrieve price change information for '{ticker}'."),
                    &e,
                )
                .into();
            }
        };

        let Some(series) = body.get(SERIES_KEY).and_then(Value::as_object) else {
            return Failure::data_absent(format!("No data found for ticker '{ticker}'."))
                .with_detail(provider_notice(&body))
                .into();
        };

        match movement(series, sessions) {
            Ok(movement) => {
                debug!(%ticker, sessions, price_change = movement.price_change, "Price change computed");
                Envelope::Success(PriceChange { ticker, movement })
            }
            Err(SeriesError::TooShort) => Failure::data_absent(format!(
                "Not enough data available for '{ticker}' over {sessions} days."
            ))
            .into(),
            Err(SeriesError::BadDate(key)) => Failure::data_absent(format!(
                "Malformed data for '{ticker}': unparsable date '{key}'."
            ))
            .into(),
            Err(SeriesError::BadClose(date)) => Failure::data_absent(format!(
                "Malformed data for '{ticker}': unparsable '{CLOSE_KEY}' on {date}."
            ))
            .into(),
        }
    }
}

/// Pick the latest entry and the entry `sessions - 1` places before it
fn movement(series: &Map<String, Value>, sessions: usize) -> std::result::Result<PriceMovement, SeriesError> {
    let mut dates: Vec<&String> = series.keys().collect();
    if dates.len() < sessions {
        return Err(SeriesError::TooShort);
    }
    // ISO dates sort lexically
    dates.sort_unstable_by(|a, b| b.cmp(a));

    let latest = dates[0];
    let previous = dates[sessions - 1];
    let latest_price = close(series, latest)?;
    let previous_price = close(series, previous)?;

    Ok(PriceMovement {
        price_change: latest_price - previous_price,
        latest_date: parse_date(latest)?,
        latest_price,
        previous_date: parse_date(previous)?,
        previous_price,
    })
}

fn parse_date(key: &str) -> std::result::Result<NaiveDate, SeriesError> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").map_err(|_| SeriesError::BadDate(key.to_string()))
}

fn close(series: &Map<String, Value>, date: &str) -> std::result::Result<f64, SeriesError> {
    let value = series.get(date).and_then(|entry| entry.get(CLOSE_KEY));
    match value {
        Some(Value::String(text)) => text.trim().parse().ok(),
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    }
    .ok_or_else(|| SeriesError::BadClose(date.to_string()))
}

#[async_trait]
impl Tool for PriceChangeCalculator {
    async fn execute(&self, params: Value) -> Result<Value> {
        let envelope = match parse_params::<Params>(TOOL_NAME, params) {
            Ok(p) => {
                self.change(&p.ticker, p.days.unwrap_or(self.default_days))
                    .await
            }
            Err(failure) => failure.into(),
        };
        respond(&envelope)
    }

    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Get the change in closing price of a stock ticker over the last N trading days \
         (1 = latest session only, 7 = about a week, 30 = about a month). Defaults to 7."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "ticker": schema::string("Ticker symbol, e.g. 'AAPL'"),
                "days": schema::integer_min("Number of trading sessions in the window", 1),
            }),
            &["ticker"],
        )
    }
}
