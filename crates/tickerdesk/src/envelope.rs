//! Result envelopes returned by every capability
//!
//! Each capability answers with `{"status": "success", ...payload}` or
//! `{"status": "error", "error_message": ...}`. The payload types below fix
//! the field names the model sees.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder for fields the provider left out
pub const NOT_AVAILABLE: &str = "N/A";

/// Outcome of a capability call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope<T> {
    /// Payload fields are flattened next to `"status"`
    Success(T),
    /// Failure description
    Error(Failure),
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Borrow the failure, if any
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Success(_) => None,
            Self::Error(failure) => Some(failure),
        }
    }

    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Error(failure) => Err(failure),
        }
    }
}

impl<T> From<Failure> for Envelope<T> {
    fn from(failure: Failure) -> Self {
        Self::Error(failure)
    }
}

impl<T: Serialize> Envelope<T> {
    /// JSON form handed back to the planner
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Broad class of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The provider could not be reached or answered garbage
    Transport,
    /// The provider answered but had nothing usable
    DataAbsent,
    /// Arguments were rejected before any request
    InvalidInput,
}

/// Error side of an envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    /// Human-readable message naming the offending keyword or ticker
    pub error_message: String,

    pub kind: FailureKind,

    /// Provider notice or low-level error text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Underlying failures of a composed call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<Failure>,
}

impl Failure {
    pub fn new(kind: FailureKind, error_message: impl Into<String>) -> Self {
        Self {
            error_message: error_message.into(),
            kind,
            detail: None,
            causes: Vec::new(),
        }
    }

    pub fn transport(error_message: impl Into<String>) -> Self {
        Self::new(FailureKind::Transport, error_message)
    }

    pub fn data_absent(error_message: impl Into<String>) -> Self {
        Self::new(FailureKind::DataAbsent, error_message)
    }

    pub fn invalid_input(error_message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidInput, error_message)
    }

    /// Attach detail text
    pub fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }

    /// Attach underlying failures
    pub fn with_causes(mut self, causes: Vec<Failure>) -> Self {
        self.causes = causes;
        self
    }
}

/// A resolved ticker symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerMatch {
    pub ticker: String,
    pub name: String,
    pub currency: String,
}

/// Latest traded price, kept as the provider's decimal string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub ticker: String,
    pub price: String,
}

/// Close-to-close movement across a window of trading sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceMovement {
    /// `latest_price - previous_price`
    pub price_change: f64,
    pub latest_date: NaiveDate,
    pub latest_price: f64,
    pub previous_date: NaiveDate,
    pub previous_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub ticker: String,
    #[serde(flatten)]
    pub movement: PriceMovement,
}

/// One article from the news feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub time_published: String,
    pub source: String,
    pub summary: String,
    #[serde(with = "score_or_na")]
    pub overall_sentiment_score: Option<f64>,
    pub overall_sentiment_label: String,
}

/// News feed without the ticker it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsDigest {
    pub sentiment_score_definition: String,
    pub feed: Vec<NewsItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerNews {
    pub ticker: String,
    #[serde(flatten)]
    pub digest: NewsDigest,
}

/// Success payload of a news lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsReport {
    pub news: TickerNews,
}

/// News and price movement for one ticker
///
/// The nested parts carry no ticker of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub ticker: String,
    pub news: NewsDigest,
    pub price_change: PriceMovement,
}

/// Sentiment scores serialize as a number, or `"N/A"` when missing
mod score_or_na {
    use super::NOT_AVAILABLE;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(score: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match score {
            Some(value) => serializer.serialize_f64(*value),
            None => serializer.serialize_str(NOT_AVAILABLE),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Some(value),
            Raw::Text(text) => text.trim().parse().ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn movement() -> PriceMovement {
        PriceMovement {
            price_change: 2.5,
            latest_date: date("2024-06-10"),
            latest_price: 195.0,
            previous_date: date("2024-06-03"),
            previous_price: 192.5,
        }
    }

    #[test]
    fn test_success_is_flattened_next_to_status() {
        let env = Envelope::Success(Quote {
            ticker: "TSLA".to_string(),
            price: "177.2900".to_string(),
        });
        assert_eq!(
            env.to_value().unwrap(),
            json!({"status": "success", "ticker": "TSLA", "price": "177.2900"})
        );
    }

    #[test]
    fn test_error_shape() {
        let env: Envelope<Quote> =
            Failure::data_absent("No price found for ticker 'ZZZZ'.").into();
        assert_eq!(
            env.to_value().unwrap(),
            json!({
                "status": "error",
                "error_message": "No price found for ticker 'ZZZZ'.",
                "kind": "data_absent"
            })
        );
    }

    #[test]
    fn test_price_change_fields() {
        let env = Envelope::Success(PriceChange {
            ticker: "AAPL".to_string(),
            movement: movement(),
        });
        let value = env.to_value().unwrap();
        assert_eq!(value["latest_date"], "2024-06-10");
        assert_eq!(value["previous_date"], "2024-06-03");
        assert_eq!(value["price_change"], 2.5);
        assert_eq!(value["ticker"], "AAPL");
    }

    #[test]
    fn test_missing_sentiment_score_is_na() {
        let item = NewsItem {
            title: "t".to_string(),
            time_published: NOT_AVAILABLE.to_string(),
            source: "s".to_string(),
            summary: "x".to_string(),
            overall_sentiment_score: None,
            overall_sentiment_label: "Neutral".to_string(),
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["overall_sentiment_score"], "N/A");

        let back: NewsItem = serde_json::from_value(value).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_analysis_has_no_nested_ticker() {
        let env = Envelope::Success(Analysis {
            ticker: "MSFT".to_string(),
            news: NewsDigest {
                sentiment_score_definition: NOT_AVAILABLE.to_string(),
                feed: Vec::new(),
            },
            price_change: movement(),
        });
        let value = env.to_value().unwrap();
        assert_eq!(value["ticker"], "MSFT");
        assert!(value["news"].get("ticker").is_none());
        assert!(value["price_change"].get("ticker").is_none());
        assert!(value["price_change"].get("status").is_none());
    }

    #[test]
    fn test_envelope_parses_back() {
        let value = json!({
            "status": "error",
            "error_message": "Failed to retrieve complete analysis for 'X'.",
            "kind": "transport",
            "causes": [{"error_message": "boom", "kind": "transport"}]
        });
        let env: Envelope<Analysis> = serde_json::from_value(value).unwrap();
        let failure = env.failure().unwrap();
        assert_eq!(failure.causes.len(), 1);
        assert_eq!(failure.kind, FailureKind::Transport);
    }
}
