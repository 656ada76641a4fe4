//! Exposing an agent as a tool
//!
//! A coordinator that hands work to a sub-agent through a tool call keeps
//! control of the conversation: the sub-agent's answer comes back as a tool
//! result and the coordinator decides what to do next.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tickerdesk_core::{Agent, Error, Result, Tool};
use tickerdesk_llm::tools::schema;
use tracing::debug;

/// A tool whose execution is a full turn of another agent
pub struct AgentTool {
    agent: Arc<dyn Agent>,
    description: String,
}

#[derive(Debug, Deserialize)]
struct AgentToolParams {
    request: String,
}

impl AgentTool {
    /// Wrap `agent`; the tool takes the agent's name
    pub fn new(agent: Arc<dyn Agent>, description: impl Into<String>) -> Self {
        Self {
            agent,
            description: description.into(),
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let params: AgentToolParams =
            serde_json::from_value(params).map_err(|e| Error::InvalidParameters {
                tool: self.agent.name().to_string(),
                reason: e.to_string(),
            })?;

        debug!(agent = self.agent.name(), "Delegating request to sub-agent");
        let reply = self.agent.process(params.request).await?;
        Ok(json!({ "result": reply }))
    }

    fn name(&self) -> &str {
        self.agent.name()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "request": schema::string(
                    "Self-contained instruction for the agent, including any ticker symbol or company name it needs",
                ),
            }),
            &["request"],
        )
    }
}
