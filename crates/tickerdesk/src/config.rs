//! Configuration for the stock desk

use crate::error::{Result, StockError};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Default Alpha Vantage endpoint
pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Key used when no Alpha Vantage key is configured
pub const DEMO_API_KEY: &str = "demo";

const ENV_API_KEY: &str = "ALPHA_VANTAGE_API_KEY";
const ENV_BASE_URL: &str = "ALPHA_VANTAGE_BASE_URL";
const ENV_LLM: &str = "TICKERDESK_LLM";
const ENV_MODEL: &str = "TICKERDESK_MODEL";
const ENV_DELEGATION: &str = "TICKERDESK_DELEGATION";

/// Which model provider drives the coordinator
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// Google Gemini
    #[default]
    Gemini,
    /// Anthropic Claude
    Anthropic,
}

impl LlmBackend {
    /// Model used when none is configured
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-1.5-flash",
            Self::Anthropic => "claude-sonnet-4-5-20250929",
        }
    }
}

impl FromStr for LlmBackend {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(StockError::Config(format!(
                "unknown LLM backend '{other}', expected 'gemini' or 'anthropic'"
            ))),
        }
    }
}

impl fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => f.write_str("gemini"),
            Self::Anthropic => f.write_str("anthropic"),
        }
    }
}

/// How the coordinator reaches the capabilities
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DelegationMode {
    /// Capabilities are the coordinator's tools
    #[default]
    Direct,
    /// Each capability sits behind its own delegate agent
    Agents,
}

impl FromStr for DelegationMode {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "agents" | "delegates" => Ok(Self::Agents),
            other => Err(StockError::Config(format!(
                "unknown delegation mode '{other}', expected 'direct' or 'agents'"
            ))),
        }
    }
}

impl fmt::Display for DelegationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("direct"),
            Self::Agents => f.write_str("agents"),
        }
    }
}

/// Configuration for the stock desk
#[derive(Clone, Serialize)]
pub struct DeskConfig {
    /// Alpha Vantage API key
    #[serde(skip_serializing)]
    pub alpha_vantage_api_key: Option<String>,

    /// Alpha Vantage query endpoint
    pub alpha_vantage_base_url: String,

    /// Timeout for a single market data request
    pub request_timeout: Duration,

    /// Client-side request budget per minute (0 disables throttling)
    pub rate_limit_per_minute: u32,

    /// Maximum news items returned by a news lookup
    pub news_limit: usize,

    /// Trading sessions used when a caller gives no window
    pub default_days: i64,

    /// Model provider
    pub llm_backend: LlmBackend,

    /// Model name, falls back to the backend's default
    pub model: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Maximum model calls per request
    pub max_iterations: usize,

    /// How the coordinator reaches the capabilities
    pub delegation: DelegationMode,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            alpha_vantage_api_key: None,
            alpha_vantage_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            rate_limit_per_minute: 5, // free tier
            news_limit: 15,
            default_days: 7,
            llm_backend: LlmBackend::Gemini,
            model: None,
            max_tokens: 4096,
            temperature: Some(0.2),
            max_iterations: 10,
            delegation: DelegationMode::Direct,
        }
    }
}

impl fmt::Debug for DeskConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeskConfig")
            .field(
                "alpha_vantage_api_key",
                &self.alpha_vantage_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("alpha_vantage_base_url", &self.alpha_vantage_base_url)
            .field("request_timeout", &self.request_timeout)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("news_limit", &self.news_limit)
            .field("default_days", &self.default_days)
            .field("llm_backend", &self.llm_backend)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("max_iterations", &self.max_iterations)
            .field("delegation", &self.delegation)
            .finish()
    }
}

impl DeskConfig {
    /// Create a new configuration builder
    pub fn builder() -> DeskConfigBuilder {
        DeskConfigBuilder::default()
    }

    /// Build a configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env()?.build()
    }

    /// Model name in effect
    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.llm_backend.default_model())
    }

    /// Parsed Alpha Vantage endpoint
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.alpha_vantage_base_url).map_err(|e| {
            StockError::Config(format!(
                "invalid Alpha Vantage base URL '{}': {e}",
                self.alpha_vantage_base_url
            ))
        })?;
        if matches!(url.scheme(), "http" | "https") {
            Ok(url)
        } else {
            Err(StockError::Config(format!(
                "Alpha Vantage base URL must be http or https, got '{}'",
                url.scheme()
            )))
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;

        if self.request_timeout.is_zero() {
            return Err(StockError::Config(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if !(1..=50).contains(&self.news_limit) {
            return Err(StockError::Config(format!(
                "news_limit must be between 1 and 50, got {}",
                self.news_limit
            )));
        }

        if self.default_days < 1 {
            return Err(StockError::Config(
                "default_days must be at least 1".to_string(),
            ));
        }

        if self.max_iterations == 0 {
            return Err(StockError::Config(
                "max_iterations must be greater than 0".to_string(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(StockError::Config(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(StockError::Config(format!(
                    "temperature must be between 0.0 and 2.0, got {t}"
                )));
            }
        }

        Ok(())
    }
}

/// Builder for DeskConfig
#[derive(Debug, Default)]
pub struct DeskConfigBuilder {
    alpha_vantage_api_key: Option<String>,
    alpha_vantage_base_url: Option<String>,
    request_timeout: Option<Duration>,
    rate_limit_per_minute: Option<u32>,
    news_limit: Option<usize>,
    default_days: Option<i64>,
    llm_backend: Option<LlmBackend>,
    model: Option<String>,
    max_tokens: Option<usize>,
    temperature: Option<Option<f32>>,
    max_iterations: Option<usize>,
    delegation: Option<DelegationMode>,
}

impl DeskConfigBuilder {
    /// Set Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set Alpha Vantage endpoint
    pub fn alpha_vantage_base_url(mut self, url: impl Into<String>) -> Self {
        self.alpha_vantage_base_url = Some(url.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set client-side rate limit
    pub fn rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = Some(limit);
        self
    }

    /// Set news item cap
    pub fn news_limit(mut self, limit: usize) -> Self {
        self.news_limit = Some(limit);
        self
    }

    /// Set default price-change window
    pub fn default_days(mut self, days: i64) -> Self {
        self.default_days = Some(days);
        self
    }

    /// Set model provider
    pub fn llm_backend(mut self, backend: LlmBackend) -> Self {
        self.llm_backend = Some(backend);
        self
    }

    /// Set model name
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set max tokens per completion
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set sampling temperature (`None` leaves it to the provider)
    pub fn temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set maximum planner iterations
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Set delegation mode
    pub fn delegation(mut self, mode: DelegationMode) -> Self {
        self.delegation = Some(mode);
        self
    }

    /// Apply values from the process environment
    pub fn with_env(self) -> Result<Self> {
        self.with_lookup(|key| std::env::var(key).ok())
    }

    /// Apply values from an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn with_lookup<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.alpha_vantage_api_key = Some(key.trim().to_string());
        }
        if let Some(url) = get(ENV_BASE_URL) {
            self.alpha_vantage_base_url = Some(url.trim().to_string());
        }
        if let Some(backend) = get(ENV_LLM) {
            self.llm_backend = Some(backend.parse()?);
        }
        if let Some(model) = get(ENV_MODEL) {
            self.model = Some(model.trim().to_string());
        }
        if let Some(mode) = get(ENV_DELEGATION) {
            self.delegation = Some(mode.parse()?);
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<DeskConfig> {
        let defaults = DeskConfig::default();

        let config = DeskConfig {
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            alpha_vantage_base_url: self
                .alpha_vantage_base_url
                .unwrap_or(defaults.alpha_vantage_base_url),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            rate_limit_per_minute: self
                .rate_limit_per_minute
                .unwrap_or(defaults.rate_limit_per_minute),
            news_limit: self.news_limit.unwrap_or(defaults.news_limit),
            default_days: self.default_days.unwrap_or(defaults.default_days),
            llm_backend: self.llm_backend.unwrap_or(defaults.llm_backend),
            model: self.model,
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
            delegation: self.delegation.unwrap_or(defaults.delegation),
        };

        config.validate()?;
        Ok(config)
    }
}
