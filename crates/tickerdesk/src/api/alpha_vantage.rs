//! Alpha Vantage API client

use crate::api::{MarketDataSource, QueryRequest};
use crate::config::{DEMO_API_KEY, DeskConfig};
use crate::error::{Result, StockError};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage API client
#[derive(Clone)]
pub struct AlphaVantageClient {
    client: Client,
    base_url: Url,
    api_key: String,
    rate_limiter: Option<SharedRateLimiter>,
}

impl fmt::Debug for AlphaVantageClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlphaVantageClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("rate_limited", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `base_url` - query endpoint
    /// * `timeout` - bound on each request
    /// * `rate_limit` - maximum requests per minute, 0 disables throttling
    pub fn new(
        api_key: impl Into<String>,
        base_url: Url,
        timeout: Duration,
        rate_limit: u32,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StockError::Config(format!("failed to build HTTP client: {e}")))?;

        let rate_limiter = NonZeroU32::new(rate_limit)
            .map(|per_minute| Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))));

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
            rate_limiter,
        })
    }

    /// Create from desk configuration
    ///
    /// Falls back to Alpha Vantage's demo key when none is configured; most
    /// symbols then answer with an `Information` notice.
    pub fn from_config(config: &DeskConfig) -> Result<Self> {
        let api_key = match &config.alpha_vantage_api_key {
            Some(key) => key.clone(),
            None => {
                warn!("ALPHA_VANTAGE_API_KEY not set, using the demo key");
                DEMO_API_KEY.to_string()
            }
        };

        Self::new(
            api_key,
            config.base_url()?,
            config.request_timeout,
            config.rate_limit_per_minute,
        )
    }

    /// Full request URL including credentials
    fn request_url(&self, request: &QueryRequest) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("function", request.function.as_str());
            for (key, value) in &request.params {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("apikey", &self.api_key);
        }
        url
    }
}

#[async_trait]
impl MarketDataSource for AlphaVantageClient {
    #[instrument(skip(self, request), fields(function = %request.function))]
    async fn query(&self, request: QueryRequest) -> Result<Value> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        debug!(params = ?request.params, "Sending Alpha Vantage request");

        // Errors carry the request URL, which includes the API key.
        let response = self
            .client
            .get(self.request_url(&request))
            .send()
            .await
            .map_err(|e| StockError::Network(e.without_url()))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "Alpha Vantage returned an error status");
            return Err(StockError::Http {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| StockError::Network(e.without_url()))?;
        let data: Value = serde_json::from_str(&body)?;

        debug!(bytes = body.len(), "Alpha Vantage response received");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiFunction;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn client(base_url: &str) -> AlphaVantageClient {
        AlphaVantageClient::new(
            "test_key",
            Url::parse(base_url).unwrap(),
            Duration::from_secs(5),
            0,
        )
        .unwrap()
    }

    /// Serve one canned HTTP response and return the endpoint URL
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0_u8; 4096];
            let mut read = 0;
            while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                if n == 0 {
                    break;
                }
                read += n;
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}/query")
    }

    #[test]
    fn test_client_creation() {
        let client = client("https://www.alphavantage.co/query");
        assert_eq!(client.api_key, "test_key");
        assert!(client.rate_limiter.is_none());
    }

    #[test]
    fn test_request_url() {
        let client = client("https://www.alphavantage.co/query");
        let request = QueryRequest::new(ApiFunction::SymbolSearch).param("keywords", "tesla motors");
        let url = client.request_url(&request);

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("function".to_string(), "SYMBOL_SEARCH".to_string()),
                ("keywords".to_string(), "tesla motors".to_string()),
                ("apikey".to_string(), "test_key".to_string()),
            ]
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = client("https://www.alphavantage.co/query");
        assert!(!format!("{client:?}").contains("test_key"));
    }

    #[test]
    fn test_from_config_without_key_uses_demo() {
        let config = DeskConfig::default();
        let client = AlphaVantageClient::from_config(&config).unwrap();
        assert_eq!(client.api_key, DEMO_API_KEY);
        assert!(client.rate_limiter.is_some());
    }

    #[tokio::test]
    async fn test_query_returns_body() {
        let url = serve_once("200 OK", r#"{"Global Quote": {"05. price": "10.0000"}}"#).await;
        let data = client(&url)
            .query(QueryRequest::new(ApiFunction::GlobalQuote).param("symbol", "IBM"))
            .await
            .unwrap();
        assert_eq!(data["Global Quote"]["05. price"], "10.0000");
    }

    #[tokio::test]
    async fn test_non_200_is_http_error() {
        let url = serve_once("503 Service Unavailable", "{}").await;
        let err = client(&url)
            .query(QueryRequest::new(ApiFunction::GlobalQuote))
            .await
            .unwrap_err();
        assert!(matches!(err, StockError::Http { status: 503 }));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_non_json_body_is_json_error() {
        let url = serve_once("200 OK", "<html>maintenance</html>").await;
        let err = client(&url)
            .query(QueryRequest::new(ApiFunction::GlobalQuote))
            .await
            .unwrap_err();
        assert!(matches!(err, StockError::Json(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error_without_key() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{addr}/query"))
            .query(QueryRequest::new(ApiFunction::GlobalQuote))
            .await
            .unwrap_err();
        assert!(matches!(err, StockError::Network(_)));
        assert!(!err.to_string().contains("test_key"));
    }
}
