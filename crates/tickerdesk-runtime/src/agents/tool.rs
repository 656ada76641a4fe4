//! Tool agent implementation (wraps AgentExecutor)

use crate::executor::{AgentExecutor, RunOutcome};
use async_trait::async_trait;
use tickerdesk_core::{Agent, Result};
use tickerdesk_llm::Message;

/// An agent that answers by running the tool-calling loop
pub struct ToolAgent {
    executor: AgentExecutor,
    name: String,
}

impl ToolAgent {
    /// Create a new tool agent
    pub fn new(executor: AgentExecutor, name: impl Into<String>) -> Self {
        Self {
            executor,
            name: name.into(),
        }
    }

    /// Get a reference to the underlying executor
    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }

    /// Answer `input` in the context of an earlier conversation
    pub async fn respond(&self, input: String, history: Vec<Message>) -> Result<RunOutcome> {
        self.executor.run_with_history(input, history).await
    }
}

#[async_trait]
impl Agent for ToolAgent {
    async fn process(&self, input: String) -> Result<String> {
        Ok(self.executor.run(input).await?.reply)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
