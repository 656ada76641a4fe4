//! Coordinator and delegate agents
//!
//! The coordinator is a planner loop over exactly five tools. In
//! [`DelegationMode::Direct`](crate::config::DelegationMode) those tools are
//! the capabilities; in `Agents` mode each capability sits behind its own
//! delegate agent that the coordinator calls like a tool.

pub mod coordinator;
pub mod delegates;

pub use coordinator::{COORDINATOR_NAME, Conversation, CoordinatorAgent, MAX_HISTORY_SIZE};
pub use delegates::{DELEGATE_NAMES, delegate_tools};

use crate::config::{DeskConfig, LlmBackend};
use crate::error::Result;
use std::sync::Arc;
use tickerdesk_llm::LLMProvider;
use tickerdesk_llm::providers::{AnthropicProvider, GeminiProvider};
use tickerdesk_runtime::RuntimeConfig;
use tracing::info;

/// Model provider selected by the configuration
///
/// API keys come from `GEMINI_API_KEY`/`GOOGLE_API_KEY` or `ANTHROPIC_API_KEY`.
pub fn provider_from_config(config: &DeskConfig) -> Result<Arc<dyn LLMProvider>> {
    let provider: Arc<dyn LLMProvider> = match config.llm_backend {
        LlmBackend::Gemini => Arc::new(GeminiProvider::from_env(config.request_timeout)?),
        LlmBackend::Anthropic => Arc::new(AnthropicProvider::from_env(config.request_timeout)?),
    };
    info!(provider = provider.name(), model = config.model_name(), "LLM provider ready");
    Ok(provider)
}

/// Planner defaults derived from the configuration
pub fn runtime_config(config: &DeskConfig) -> RuntimeConfig {
    RuntimeConfig {
        default_max_iterations: config.max_iterations,
        default_model: config.model_name().to_string(),
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    }
}
