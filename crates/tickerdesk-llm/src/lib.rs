//! LLM provider abstraction layer for tickerdesk
//!
//! This crate provides provider-agnostic abstractions for talking to the
//! planning model:
//!
//! - Message types with tool-use and tool-result blocks
//! - Completion request/response types
//! - Tool definitions for function calling
//! - The [`LLMProvider`] trait
//! - Gemini and Anthropic implementations (behind feature flags)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod tools;

pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use tools::ToolDefinition;

#[cfg(any(feature = "gemini", feature = "anthropic"))]
pub mod providers;
