//! Concrete agent implementations
//!
//! - [`ToolAgent`]: an agent driven by the planner loop
//! - [`AgentTool`]: any agent exposed to another agent as a callable tool

pub mod agent_tool;
pub mod tool;

pub use agent_tool::AgentTool;
pub use tool::ToolAgent;
