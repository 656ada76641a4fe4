//! Message types for LLM communication
//!
//! The block layout follows Anthropic's Messages API (text, `tool_use`,
//! `tool_result`); other providers translate to and from it.

use serde::{Deserialize, Serialize};

/// Message role in a conversation
///
/// System instructions travel separately in
/// [`CompletionRequest::system`](crate::CompletionRequest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message (also carries tool results back to the model)
    User,
    /// Assistant message
    Assistant,
}

/// Content block in a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text content
    Text {
        /// Text content
        text: String,
    },

    /// Tool call requested by the assistant
    ToolUse {
        /// Unique ID for this tool use
        id: String,
        /// Tool name
        name: String,
        /// Tool arguments
        input: serde_json::Value,
    },

    /// Result of a tool call, sent back as a user message
    ToolResult {
        /// ID of the tool use this is responding to
        tool_use_id: String,
        /// Serialized result
        content: String,
        /// Whether this is an error result
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// Message content: either simple text or structured blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),
    /// Structured content blocks
    Blocks(Vec<ContentBlock>),
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Message content
    pub content: MessageContent,
}

impl Message {
    /// Create a user message with text
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Create an assistant message with text
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Create an assistant message from blocks
    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Blocks(blocks),
        }
    }

    /// Create a user message carrying several tool results
    ///
    /// All results of one assistant turn go back in a single message; some
    /// providers reject consecutive user messages.
    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Blocks(results),
        }
    }

    /// Build a successful tool result block
    pub fn tool_result_block(tool_use_id: impl Into<String>, content: impl Into<String>) -> ContentBlock {
        ContentBlock::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: None,
        }
    }

    /// Build an error tool result block
    pub fn tool_error_block(tool_use_id: impl Into<String>, error: impl Into<String>) -> ContentBlock {
        ContentBlock::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: error.into(),
            is_error: Some(true),
        }
    }

    /// All text in the message joined with newlines
    pub fn text(&self) -> Option<String> {
        match &self.content {
            MessageContent::Text(s) => Some(s.clone()),
            MessageContent::Blocks(blocks) => {
                let parts: Vec<&str> = blocks
                    .iter()
                    .filter_map(|b| match b {
                        ContentBlock::Text { text } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("\n"))
                }
            }
        }
    }

    /// Tool calls requested in this message, as `(id, name, input)`
    pub fn tool_uses(&self) -> Vec<(&str, &str, &serde_json::Value)> {
        match &self.content {
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::ToolUse { id, name, input } => {
                        Some((id.as_str(), name.as_str(), input))
                    }
                    _ => None,
                })
                .collect(),
            MessageContent::Text(_) => vec![],
        }
    }

    /// Check if this message contains any tool uses
    pub fn has_tool_uses(&self) -> bool {
        !self.tool_uses().is_empty()
    }

    /// The message content as blocks, wrapping plain text in one text block
    pub fn blocks(&self) -> Vec<ContentBlock> {
        match &self.content {
            MessageContent::Text(text) => vec![ContentBlock::Text { text: text.clone() }],
            MessageContent::Blocks(blocks) => blocks.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_message() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text().as_deref(), Some("Hello"));
        assert!(!msg.has_tool_uses());
    }

    #[test]
    fn test_tool_uses_extracted_in_order() {
        let msg = Message::assistant_blocks(vec![
            ContentBlock::Text {
                text: "Looking that up".to_string(),
            },
            ContentBlock::ToolUse {
                id: "call_0".to_string(),
                name: "get_ticker".to_string(),
                input: json!({"keyword": "tesla"}),
            },
            ContentBlock::ToolUse {
                id: "call_1".to_string(),
                name: "get_ticker".to_string(),
                input: json!({"keyword": "apple"}),
            },
        ]);

        let uses = msg.tool_uses();
        assert_eq!(uses.len(), 2);
        assert_eq!(uses[0].0, "call_0");
        assert_eq!(uses[1].2["keyword"], "apple");
        assert_eq!(msg.text().as_deref(), Some("Looking that up"));
    }

    #[test]
    fn test_tool_result_serialization() {
        let msg = Message::tool_results(vec![
            Message::tool_result_block("call_0", "{}"),
            Message::tool_error_block("call_1", "boom"),
        ]);
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "user");
        assert_eq!(value["content"][0]["type"], "tool_result");
        assert!(value["content"][0].get("is_error").is_none());
        assert_eq!(value["content"][1]["is_error"], true);
    }
}
