//! Shared runtime for building agents
//!
//! Holds the model provider and the defaults every agent starts from, so
//! a coordinator and its delegates all talk to the same model.

use crate::agents::ToolAgent;
use crate::executor::{AgentExecutor, ExecutorConfig, ExecutorEventHandler};
use std::sync::Arc;
use tickerdesk_core::ToolRegistry;
use tickerdesk_llm::LLMProvider;

/// Defaults applied to agents created by an [`AgentRuntime`]
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Maximum model calls per request
    pub default_max_iterations: usize,

    /// Model to use
    pub default_model: String,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let executor = ExecutorConfig::default();
        Self {
            default_max_iterations: executor.max_iterations,
            default_model: executor.model,
            max_tokens: executor.max_tokens,
            temperature: executor.temperature,
        }
    }
}

/// Factory for agents sharing one provider
pub struct AgentRuntime {
    provider: Arc<dyn LLMProvider>,
    config: RuntimeConfig,
    event_handler: Option<Arc<dyn ExecutorEventHandler>>,
}

impl AgentRuntime {
    /// Create a new agent runtime
    pub fn new(provider: Arc<dyn LLMProvider>, config: RuntimeConfig) -> Self {
        Self {
            provider,
            config,
            event_handler: None,
        }
    }

    /// Attach an event handler to every agent created afterwards
    pub fn with_event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Get a reference to the LLM provider
    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// Get a reference to the runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Executor settings for an agent with the given instruction
    pub fn executor_config(&self, system_prompt: impl Into<String>) -> ExecutorConfig {
        ExecutorConfig {
            max_iterations: self.config.default_max_iterations,
            model: self.config.default_model.clone(),
            system_prompt: Some(system_prompt.into()),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    /// Create a tool-using agent over its own registry
    pub fn create_tool_agent(
        &self,
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        tools: Arc<ToolRegistry>,
    ) -> ToolAgent {
        let mut executor = AgentExecutor::new(
            Arc::clone(&self.provider),
            tools,
            self.executor_config(system_prompt),
        );
        if let Some(handler) = &self.event_handler {
            executor = executor.with_event_handler(Arc::clone(handler));
        }
        ToolAgent::new(executor, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;

    #[test]
    fn test_runtime_config_default() {
        let config = RuntimeConfig::default();
        assert_eq!(config.default_max_iterations, 10);
        assert_eq!(config.default_model, "gemini-1.5-flash");
    }

    #[test]
    fn test_create_tool_agent_uses_runtime_defaults() {
        let runtime = AgentRuntime::new(
            Arc::new(ScriptedProvider::new(vec![])),
            RuntimeConfig {
                default_max_iterations: 4,
                default_model: "test-model".to_string(),
                ..RuntimeConfig::default()
            },
        );
        let registry = Arc::new(ToolRegistry::new());
        let agent = runtime.create_tool_agent("worker", "do work", registry);

        let config = agent.executor().config();
        assert_eq!(config.max_iterations, 4);
        assert_eq!(config.model, "test-model");
        assert_eq!(config.system_prompt.as_deref(), Some("do work"));
        assert_eq!(runtime.provider().name(), "scripted");
    }
}
