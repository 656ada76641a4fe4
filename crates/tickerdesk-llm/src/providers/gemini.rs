//! Google Gemini provider implementation
//!
//! Talks to the `generateContent` endpoint and maps Gemini's
//! `functionCall`/`functionResponse` parts onto tool-use blocks.
//! See: https://ai.google.dev/api/generate-content

use crate::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message,
    MessageContent, Result, Role, StopReason, TokenUsage, ToolDefinition,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini provider
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    api_base: String,
}

impl GeminiProvider {
    /// Create a provider with the given API key and request timeout
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            api_base: GEMINI_API_BASE.to_string(),
        })
    }

    /// Create a provider from `GEMINI_API_KEY`, falling back to `GOOGLE_API_KEY`
    pub fn from_env(timeout: Duration) -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .map_err(|_| {
                LLMError::ConfigurationError(
                    "GEMINI_API_KEY (or GOOGLE_API_KEY) environment variable not set".to_string(),
                )
            })?;
        Self::new(api_key, timeout)
    }

    /// Point the provider at a different API base
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending request to Gemini API");

        let model = request.model.clone();
        let body = GeminiRequest::from_completion(request);

        let response = self
            .client
            .post(format!("{}/models/{model}:generateContent", self.api_base))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await?;
            return Err(LLMError::from_status(status, error_text, &model));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        parsed.into_completion()
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTools>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTools {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl GeminiRequest {
    fn from_completion(request: CompletionRequest) -> Self {
        let system_instruction = request.system.map(|text| GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: Some(text),
                ..GeminiPart::default()
            }],
        });

        let tools = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![GeminiTools {
                function_declarations: request.tools.into_iter().map(declaration).collect(),
            }]
        };

        Self {
            contents: convert_messages(request.messages),
            system_instruction,
            tools,
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
            },
        }
    }
}

fn declaration(tool: ToolDefinition) -> FunctionDeclaration {
    FunctionDeclaration {
        name: tool.name,
        description: tool.description,
        parameters: tool.input_schema,
    }
}

/// Convert the conversation into Gemini `contents`
///
/// Gemini answers a `functionCall` with a `functionResponse` keyed by
/// function name, not by call id, so ids seen on assistant turns are mapped
/// back to names as the conversation is walked.
fn convert_messages(messages: Vec<Message>) -> Vec<GeminiContent> {
    let mut call_names: HashMap<String, String> = HashMap::new();
    let mut contents = Vec::with_capacity(messages.len());

    for message in messages {
        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "model",
        };

        let blocks = match message.content {
            MessageContent::Text(text) => vec![ContentBlock::Text { text }],
            MessageContent::Blocks(blocks) => blocks,
        };

        let parts = blocks
            .into_iter()
            .map(|block| match block {
                ContentBlock::Text { text } => GeminiPart {
                    text: Some(text),
                    ..GeminiPart::default()
                },
                ContentBlock::ToolUse { id, name, input } => {
                    call_names.insert(id, name.clone());
                    GeminiPart {
                        function_call: Some(FunctionCall { name, args: input }),
                        ..GeminiPart::default()
                    }
                }
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    is_error,
                } => {
                    let name = call_names
                        .get(&tool_use_id)
                        .cloned()
                        .unwrap_or(tool_use_id);
                    GeminiPart {
                        function_response: Some(FunctionResponse {
                            name,
                            response: response_object(&content, is_error.unwrap_or(false)),
                        }),
                        ..GeminiPart::default()
                    }
                }
            })
            .collect();

        contents.push(GeminiContent {
            role: Some(role.to_string()),
            parts,
        });
    }

    contents
}

/// `functionResponse.response` must be a JSON object
fn response_object(content: &str, is_error: bool) -> Value {
    if is_error {
        return json!({ "error": content });
    }
    match serde_json::from_str::<Value>(content) {
        Ok(value @ Value::Object(_)) => value,
        Ok(other) => json!({ "result": other }),
        Err(_) => json!({ "result": content }),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

impl GeminiResponse {
    fn into_completion(self) -> Result<CompletionResponse> {
        let usage = self.usage_metadata.unwrap_or_default();
        let Some(candidate) = self.candidates.into_iter().next() else {
            let feedback = self
                .prompt_feedback
                .map_or_else(|| "no candidates returned".to_string(), |f| f.to_string());
            return Err(LLMError::UnexpectedResponse(feedback));
        };

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
        let mut blocks = Vec::with_capacity(parts.len());
        let mut saw_call = false;

        for (index, part) in parts.into_iter().enumerate() {
            if let Some(call) = part.function_call {
                saw_call = true;
                let input = if call.args.is_null() { json!({}) } else { call.args };
                blocks.push(ContentBlock::ToolUse {
                    id: format!("{}-{index}", call.name),
                    name: call.name,
                    input,
                });
            } else if let Some(text) = part.text {
                blocks.push(ContentBlock::Text { text });
            }
        }

        let finish_reason = candidate.finish_reason.unwrap_or_default();
        let stop_reason = if saw_call {
            StopReason::ToolUse
        } else {
            match finish_reason.as_str() {
                "MAX_TOKENS" => StopReason::MaxTokens,
                "STOP" | "" => StopReason::EndTurn,
                other => {
                    debug!(finish_reason = other, "Unhandled finish reason, treating as end of turn");
                    StopReason::EndTurn
                }
            }
        };

        debug!(
            ?stop_reason,
            input_tokens = usage.prompt_token_count,
            output_tokens = usage.candidates_token_count,
            "Received Gemini response"
        );

        Ok(CompletionResponse {
            message: Message::assistant_blocks(blocks),
            stop_reason,
            usage: TokenUsage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            },
        })
    }
}
