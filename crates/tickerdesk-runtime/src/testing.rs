//! Test doubles for code built on the runtime
//!
//! Compiled for this crate's tests and, with the `testing` feature, for
//! dependent crates' tests.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use tickerdesk_core::Tool;
use tickerdesk_llm::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message,
    StopReason, TokenUsage,
};

/// Provider that replays canned turns and records every request
pub struct ScriptedProvider {
    turns: Mutex<VecDeque<CompletionResponse>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(turns: Vec<CompletionResponse>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> tickerdesk_llm::Result<CompletionResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.turns
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| LLMError::UnexpectedResponse("script exhausted".to_string()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub fn text_turn(text: &str) -> CompletionResponse {
    CompletionResponse {
        message: Message::assistant(text),
        stop_reason: StopReason::EndTurn,
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
        },
    }
}

pub fn tool_turn(calls: &[(&str, &str, Value)]) -> CompletionResponse {
    let blocks = calls
        .iter()
        .map(|(id, name, input)| ContentBlock::ToolUse {
            id: (*id).to_string(),
            name: (*name).to_string(),
            input: input.clone(),
        })
        .collect();
    CompletionResponse {
        message: Message::assistant_blocks(blocks),
        stop_reason: StopReason::ToolUse,
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
        },
    }
}

/// Tool result contents sent back to the model in `request`
pub fn tool_results(request: &CompletionRequest) -> Vec<Value> {
    request
        .messages
        .iter()
        .flat_map(Message::blocks)
        .filter_map(|block| match block {
            ContentBlock::ToolResult { content, .. } => serde_json::from_str(&content).ok(),
            _ => None,
        })
        .collect()
}

/// Tool that always answers with the same value
pub struct StaticTool {
    name: String,
    reply: Value,
}

impl StaticTool {
    pub fn new(name: &str, reply: Value) -> Self {
        Self {
            name: name.to_string(),
            reply,
        }
    }
}

#[async_trait]
impl Tool for StaticTool {
    async fn execute(&self, _params: Value) -> tickerdesk_core::Result<Value> {
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "static test tool"
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }
}
