//! Error types for tickerdesk-core

use thiserror::Error;

/// Result type alias for tickerdesk-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent and tool operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Agent or runtime construction failed
    #[error("Agent initialization failed: {0}")]
    InitializationFailed(String),

    /// Agent processing failed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    /// A tool was asked for by name but never registered
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool arguments did not match the tool's input schema
    #[error("Invalid tool parameters for '{tool}': {reason}")]
    InvalidParameters {
        /// Tool name
        tool: String,
        /// What was wrong with the arguments
        reason: String,
    },
}
