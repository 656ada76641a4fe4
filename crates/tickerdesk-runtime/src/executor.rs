//! Agent executor for running the planner loop
//!
//! The loop:
//! 1. Call the model with the conversation and the registered tools
//! 2. If it asks for tools, run every requested call in order, append the
//!    results as one user turn, and go back to 1
//! 3. Otherwise return the assistant's text
//!
//! Control always returns to the loop after a tool call; tools never call
//! back into the planner.

use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tickerdesk_core::{Error, Result, ToolRegistry};
use tickerdesk_llm::{
    CompletionRequest, ContentBlock, LLMProvider, Message, StopReason, TokenUsage, ToolDefinition,
};
use tracing::{debug, info, warn};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Callbacks fired while the loop runs
///
/// Useful for surfacing tool activity to a terminal or UI without putting
/// it into the model's final answer.
#[async_trait::async_trait]
pub trait ExecutorEventHandler: Send + Sync {
    /// Called before a tool executes
    async fn on_tool_start(&self, _id: &str, _name: &str, _input: &Value) {}

    /// Called after a tool finishes, with its result or error text
    async fn on_tool_done(
        &self,
        _id: &str,
        _name: &str,
        _result: std::result::Result<&Value, &str>,
        _duration_ms: u64,
    ) {
    }

    /// Called when the loop produces its final reply
    async fn on_complete(&self, _reply: &str) {}
}

/// No-op event handler
pub struct NoOpEventHandler;

#[async_trait::async_trait]
impl ExecutorEventHandler for NoOpEventHandler {}

/// Configuration for the planner loop
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum model calls per request (prevents infinite loops)
    pub max_iterations: usize,

    /// Model to use
    pub model: String,

    /// System instruction
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature
    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: "gemini-1.5-flash".to_string(),
            system_prompt: None,
            max_tokens: 4096,
            temperature: Some(0.2),
        }
    }
}

/// Result of one run of the loop
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Final text shown to the user
    pub reply: String,

    /// Full conversation including the new turn, tool calls and results
    pub transcript: Vec<Message>,

    /// Number of model calls made
    pub iterations: usize,

    /// Tokens used across all model calls
    pub usage: TokenUsage,
}

/// Runs the model ↔ tool loop
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
    event_handler: Option<Arc<dyn ExecutorEventHandler>>,
}

impl AgentExecutor {
    /// Create a new agent executor
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
            event_handler: None,
        }
    }

    /// Set the event handler for receiving execution events
    pub fn with_event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Executor configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Tools available to the model
    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    /// Run the loop for a single message with no prior history
    pub async fn run(&self, user_message: String) -> Result<RunOutcome> {
        self.run_with_history(user_message, Vec::new()).await
    }

    /// Run the loop for a new user message appended to `history`
    pub async fn run_with_history(
        &self,
        user_message: String,
        history: Vec<Message>,
    ) -> Result<RunOutcome> {
        let mut conversation = history;
        conversation.push(Message::user(user_message));

        let tools = self.build_tool_definitions();
        let mut usage = TokenUsage::default();
        let mut iteration = 0;

        loop {
            iteration += 1;
            if iteration > self.config.max_iterations {
                warn!(
                    max_iterations = self.config.max_iterations,
                    "Max iterations reached, stopping"
                );
                let reply = "I could not finish this request within the allowed number of steps."
                    .to_string();
                conversation.push(Message::assistant(reply.clone()));
                return Ok(self
                    .finish(reply, conversation, iteration - 1, usage)
                    .await);
            }

            debug!(
                iteration,
                max_iterations = self.config.max_iterations,
                tool_count = tools.len(),
                "Planner iteration started"
            );

            let request = CompletionRequest::builder(&self.config.model)
                .messages(conversation.clone())
                .system(
                    self.config
                        .system_prompt
                        .clone()
                        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
                )
                .max_tokens(self.config.max_tokens)
                .temperature(self.config.temperature)
                .tools(tools.clone())
                .build();

            let response = self
                .provider
                .complete(request)
                .await
                .map_err(|e| Error::ProcessingFailed(e.to_string()))?;

            usage += response.usage;
            info!(
                provider = self.provider.name(),
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "Model response received"
            );

            let message = response.message;
            conversation.push(message.clone());

            match response.stop_reason {
                StopReason::ToolUse if message.has_tool_uses() => {
                    let results = self.execute_tools(&message).await;
                    conversation.push(Message::tool_results(results));
                }
                StopReason::ToolUse => {
                    warn!("Tool use stop reason without tool calls");
                    let reply = message.text().unwrap_or_default();
                    return Ok(self.finish(reply, conversation, iteration, usage).await);
                }
                StopReason::MaxTokens => {
                    warn!("Hit max tokens in model response");
                    let reply = message
                        .text()
                        .unwrap_or_else(|| "Response truncated due to token limit".to_string());
                    return Ok(self.finish(reply, conversation, iteration, usage).await);
                }
                StopReason::EndTurn | StopReason::StopSequence => {
                    let reply = message.text().unwrap_or_default();
                    info!(iteration, reply_length = reply.len(), "Planner completed");
                    return Ok(self.finish(reply, conversation, iteration, usage).await);
                }
            }
        }
    }

    async fn finish(
        &self,
        reply: String,
        transcript: Vec<Message>,
        iterations: usize,
        usage: TokenUsage,
    ) -> RunOutcome {
        if let Some(handler) = &self.event_handler {
            handler.on_complete(&reply).await;
        }
        RunOutcome {
            reply,
            transcript,
            iterations,
            usage,
        }
    }

    fn build_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tool_registry
            .list_tools()
            .iter()
            .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.input_schema()))
            .collect()
    }

    /// Run every tool call in the message, in order
    ///
    /// Failures become error results for the model to read; they never
    /// abort the loop.
    async fn execute_tools(&self, message: &Message) -> Vec<ContentBlock> {
        let mut results = Vec::new();

        for (id, name, input) in message.tool_uses() {
            let input_preview: String = input.to_string().chars().take(300).collect();
            info!(tool_name = %name, tool_id = %id, input = %input_preview, "Executing tool");

            if let Some(handler) = &self.event_handler {
                handler.on_tool_start(id, name, input).await;
            }

            let start = Instant::now();
            let outcome = match self.tool_registry.get(name) {
                Some(tool) => tool.execute(input.clone()).await,
                None => Err(Error::ToolNotFound(name.to_string())),
            };
            let duration_ms = start.elapsed().as_millis() as u64;

            match outcome {
                Ok(value) => {
                    let content = value.to_string();
                    debug!(tool_name = %name, duration_ms, result_length = content.len(), "Tool succeeded");
                    if let Some(handler) = &self.event_handler {
                        handler.on_tool_done(id, name, Ok(&value), duration_ms).await;
                    }
                    results.push(Message::tool_result_block(id, content));
                }
                Err(e) => {
                    let error = format!("Error: {e}");
                    warn!(tool_name = %name, duration_ms, error = %e, "Tool failed");
                    if let Some(handler) = &self.event_handler {
                        handler.on_tool_done(id, name, Err(&error), duration_ms).await;
                    }
                    results.push(Message::tool_error_block(id, error));
                }
            }
        }

        results
    }
}
