//! Error types for market data and desk configuration

use thiserror::Error;

/// Errors raised below the capability layer
///
/// Capabilities never surface these directly; they are folded into an
/// error envelope (see [`crate::envelope::Failure`]).
#[derive(Debug, Error)]
pub enum StockError {
    /// Alpha Vantage answered with a non-200 status
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// Network or HTTP client error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body was not JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied arguments were rejected before any request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl StockError {
    /// Whether the failure happened while talking to the provider
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Network(_) | Self::Json(_))
    }
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

impl From<StockError> for tickerdesk_core::Error {
    fn from(err: StockError) -> Self {
        match err {
            StockError::Config(msg) => tickerdesk_core::Error::InitializationFailed(msg),
            other => tickerdesk_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}

impl From<tickerdesk_core::Error> for StockError {
    fn from(err: tickerdesk_core::Error) -> Self {
        StockError::Other(err.to_string())
    }
}

impl From<tickerdesk_llm::LLMError> for StockError {
    fn from(err: tickerdesk_llm::LLMError) -> Self {
        match err {
            tickerdesk_llm::LLMError::ConfigurationError(msg) => StockError::Config(msg),
            other => StockError::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockError::Http { status: 503 };
        assert_eq!(err.to_string(), "HTTP error: status 503");
        assert!(err.is_transport());

        let err = StockError::InvalidInput("days must be at least 1".to_string());
        assert_eq!(err.to_string(), "Invalid input: days must be at least 1");
        assert!(!err.is_transport());
    }

    #[test]
    fn test_error_conversion() {
        let core: tickerdesk_core::Error = StockError::Config("no key".to_string()).into();
        assert!(matches!(core, tickerdesk_core::Error::InitializationFailed(msg) if msg == "no key"));

        let core: tickerdesk_core::Error = StockError::Http { status: 500 }.into();
        match core {
            tickerdesk_core::Error::ProcessingFailed(msg) => assert!(msg.contains("500")),
            other => panic!("Expected ProcessingFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_json_error_is_transport() {
        let err: StockError = serde_json::from_str::<serde_json::Value>("<html>")
            .unwrap_err()
            .into();
        assert!(err.is_transport());
    }
}
