//! Planner runtime for tickerdesk
//!
//! Provides the tool-calling loop ([`AgentExecutor`]), the [`ToolAgent`]
//! that wraps it behind the `Agent` trait, [`AgentTool`] for exposing an
//! agent to another agent as a tool, and the [`AgentRuntime`] factory that
//! shares one model provider between agents.

pub mod agents;
pub mod executor;
pub mod runtime;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use agents::{AgentTool, ToolAgent};
pub use executor::{AgentExecutor, ExecutorConfig, ExecutorEventHandler, NoOpEventHandler, RunOutcome};
pub use runtime::{AgentRuntime, RuntimeConfig};
