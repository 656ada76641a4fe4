//! Core abstractions for tickerdesk
//!
//! Defines the traits every agent and every planner-callable tool implements,
//! the registry tools are published through, and the shared error type.

pub mod agent;
pub mod error;
pub mod registry;
pub mod tool;

pub use agent::Agent;
pub use error::{Error, Result};
pub use registry::ToolRegistry;
pub use tool::Tool;
