//! Anthropic Claude provider implementation
//!
//! See: https://docs.anthropic.com/en/api/messages

use crate::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message, Result,
    StopReason, TokenUsage, ToolDefinition,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude provider
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    api_base: String,
}

impl AnthropicProvider {
    /// Create a provider with the given API key and request timeout
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            api_base: ANTHROPIC_API_BASE.to_string(),
        })
    }

    /// Create a provider from the `ANTHROPIC_API_KEY` environment variable
    pub fn from_env(timeout: Duration) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            LLMError::ConfigurationError("ANTHROPIC_API_KEY environment variable not set".to_string())
        })?;
        Self::new(api_key, timeout)
    }

    /// Point the provider at a different API base (proxies, gateways)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending request to Anthropic API");

        let model = request.model.clone();
        let body = AnthropicRequest::from(request);

        let response = self
            .client
            .post(format!("{}/messages", self.api_base))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await?;
            return Err(LLMError::from_status(status, error_text, &model));
        }

        let parsed: AnthropicResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        debug!(
            stop_reason = %parsed.stop_reason,
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "Received Anthropic response"
        );

        Ok(parsed.into_completion())
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDefinition>,
}

impl From<CompletionRequest> for AnthropicRequest {
    fn from(request: CompletionRequest) -> Self {
        Self {
            model: request.model,
            messages: request.messages,
            system: request.system,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            tools: request.tools,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    stop_reason: String,
    usage: UsageResponse,
}

#[derive(Debug, Deserialize)]
struct UsageResponse {
    input_tokens: usize,
    output_tokens: usize,
}

impl AnthropicResponse {
    fn into_completion(self) -> CompletionResponse {
        let stop_reason = match self.stop_reason.as_str() {
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            "tool_use" => StopReason::ToolUse,
            "end_turn" => StopReason::EndTurn,
            other => {
                debug!(stop_reason = other, "Unknown stop reason, treating as end of turn");
                StopReason::EndTurn
            }
        };

        CompletionResponse {
            message: Message::assistant_blocks(self.content),
            stop_reason,
            usage: TokenUsage {
                input_tokens: self.usage.input_tokens,
                output_tokens: self.usage.output_tokens,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_creation() {
        let provider = AnthropicProvider::new("test-key", Duration::from_secs(30)).unwrap();
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.api_base, ANTHROPIC_API_BASE);
    }

    #[test]
    fn test_request_omits_empty_tools() {
        let request = CompletionRequest::builder("claude-sonnet-4-5-20250929")
            .add_message(Message::user("hi"))
            .system("be brief")
            .build();
        let body = serde_json::to_value(AnthropicRequest::from(request)).unwrap();
        assert!(body.get("tools").is_none());
        assert_eq!(body["system"], "be brief");
        assert_eq!(body["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_tool_use_response() {
        let raw = json!({
            "content": [
                {"type": "text", "text": "Let me check."},
                {"type": "tool_use", "id": "toolu_1", "name": "get_ticker", "input": {"keyword": "tesla"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 12, "output_tokens": 7}
        });
        let parsed: AnthropicResponse = serde_json::from_value(raw).unwrap();
        let completion = parsed.into_completion();

        assert_eq!(completion.stop_reason, StopReason::ToolUse);
        assert_eq!(completion.usage.total(), 19);
        let uses = completion.message.tool_uses();
        assert_eq!(uses, vec![("toolu_1", "get_ticker", &json!({"keyword": "tesla"}))]);
    }
}
