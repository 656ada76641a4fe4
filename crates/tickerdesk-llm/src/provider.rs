//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// A model service the planner loop can call
///
/// The orchestration layer depends only on this trait, so any model that
/// supports tool calling can drive it.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate one assistant turn
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Provider name (e.g. "gemini", "anthropic")
    fn name(&self) -> &str;
}
