//! The coordinating agent
//!
//! Plans over the five stock tools and produces one consolidated answer per
//! user turn. Tools never call back into the coordinator; control returns to
//! its loop after every call.

use crate::agents::delegates::delegate_tools;
use crate::capabilities::CapabilitySet;
use crate::config::DelegationMode;
use crate::prompts;
use async_trait::async_trait;
use std::sync::Arc;
use tickerdesk_core::{Agent, Result, ToolRegistry};
use tickerdesk_llm::{Message, MessageContent, Role};
use tickerdesk_runtime::{AgentRuntime, ToolAgent};
use tracing::{debug, info};

pub const COORDINATOR_NAME: &str = "stock_coordinator";

/// Maximum number of user turns kept in history
pub const MAX_HISTORY_SIZE: usize = 20;

/// Transcript of a multi-turn session
///
/// Holds at most `max_history` user turns. Older turns are dropped whole,
/// so a tool call never loses its result.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    turns: usize,
    max_history: usize,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self::with_max_history(MAX_HISTORY_SIZE)
    }

    /// Create with a custom history size (at least one turn)
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            messages: Vec::new(),
            turns: 0,
            max_history: max_history.max(1),
        }
    }

    /// Messages kept so far, tool calls included
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Completed user turns, including those no longer kept
    pub fn turns(&self) -> usize {
        self.turns
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.messages.clear();
        self.turns = 0;
    }

    fn record(&mut self, transcript: Vec<Message>) {
        self.messages = transcript;
        self.turns += 1;

        let starts: Vec<usize> = self
            .messages
            .iter()
            .enumerate()
            .filter(|(_, message)| opens_turn(message))
            .map(|(index, _)| index)
            .collect();
        if starts.len() > self.max_history {
            let cut = starts[starts.len() - self.max_history];
            self.messages.drain(..cut);
            debug!(
                dropped_messages = cut,
                kept = self.messages.len(),
                "Trimmed conversation history"
            );
        }
    }
}

/// A user text message starts a turn; tool results are user messages too
fn opens_turn(message: &Message) -> bool {
    message.role == Role::User && matches!(message.content, MessageContent::Text(_))
}

/// Stock desk coordinator
pub struct CoordinatorAgent {
    agent: ToolAgent,
    mode: DelegationMode,
}

impl CoordinatorAgent {
    /// Build the coordinator and its five tools
    pub fn new(runtime: &AgentRuntime, capabilities: &CapabilitySet, mode: DelegationMode) -> Self {
        let tools = match mode {
            DelegationMode::Direct => capabilities.tools(),
            DelegationMode::Agents => delegate_tools(runtime, capabilities),
        };

        let registry = ToolRegistry::new();
        for tool in tools {
            registry.register(tool);
        }
        info!(mode = %mode, tools = ?registry.names(), "Coordinator ready");

        let agent = runtime.create_tool_agent(
            COORDINATOR_NAME,
            prompts::coordinator(mode),
            Arc::new(registry),
        );
        Self { agent, mode }
    }

    pub fn mode(&self) -> DelegationMode {
        self.mode
    }

    /// Names of the tools the coordinator can call
    pub fn tool_names(&self) -> Vec<String> {
        self.agent.executor().tools().names()
    }

    /// Answer `input` as the next turn of `conversation`
    ///
    /// The transcript is only extended when the turn completes.
    pub async fn respond(
        &self,
        conversation: &mut Conversation,
        input: impl Into<String>,
    ) -> Result<String> {
        let outcome = self
            .agent
            .respond(input.into(), conversation.messages.clone())
            .await?;

        info!(
            iterations = outcome.iterations,
            tokens = outcome.usage.total(),
            turn = conversation.turns + 1,
            "Coordinator turn finished"
        );
        conversation.record(outcome.transcript);
        Ok(outcome.reply)
    }
}

#[async_trait]
impl Agent for CoordinatorAgent {
    async fn process(&self, input: String) -> Result<String> {
        self.agent.process(input).await
    }

    fn name(&self) -> &str {
        COORDINATOR_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::DELEGATE_NAMES;
    use tickerdesk_runtime::testing::{ScriptedProvider, text_turn, tool_results, tool_turn};
    use crate::api::{ApiFunction, MockMarketDataSource};
    use crate::capabilities::TOOL_NAMES;
    use crate::config::DeskConfig;
    use serde_json::json;
    use tickerdesk_runtime::RuntimeConfig;

    /// Answers symbol search for "tesla" and a quote for "TSLA"
    fn market() -> MockMarketDataSource {
        let mut source = MockMarketDataSource::new();
        source
            .expect_query()
            .withf(|r| r.function == ApiFunction::SymbolSearch && r.get("keywords") == Some("tesla"))
            .returning(|_| {
                Ok(json!({"bestMatches": [
                    {"1. symbol": "TSLA", "2. name": "Tesla Inc", "8. currency": "USD"}
                ]}))
            });
        source
            .expect_query()
            .withf(|r| r.function == ApiFunction::GlobalQuote && r.get("symbol") == Some("TSLA"))
            .returning(|_| Ok(json!({"Global Quote": {"05. price": "177.2900"}})));
        source
    }

    fn coordinator(model: Arc<ScriptedProvider>, mode: DelegationMode) -> CoordinatorAgent {
        let runtime = AgentRuntime::new(model, RuntimeConfig::default());
        let capabilities = CapabilitySet::new(Arc::new(market()), &DeskConfig::default());
        CoordinatorAgent::new(&runtime, &capabilities, mode)
    }

    #[test]
    fn test_registry_has_exactly_five_tools() {
        let model = Arc::new(ScriptedProvider::new(vec![]));
        assert_eq!(
            coordinator(model.clone(), DelegationMode::Direct).tool_names(),
            TOOL_NAMES.to_vec()
        );
        assert_eq!(
            coordinator(model, DelegationMode::Agents).tool_names(),
            DELEGATE_NAMES.to_vec()
        );
    }

    #[tokio::test]
    async fn test_tesla_price_chains_resolved_symbol() {
        let model = Arc::new(ScriptedProvider::new(vec![
            tool_turn(&[("c1", "get_ticker", json!({"keyword": "tesla"}))]),
            tool_turn(&[("c2", "get_ticker_price", json!({"ticker": "TSLA"}))]),
            text_turn("Tesla (TSLA) is trading at $177.29."),
        ]));
        let coordinator = coordinator(model.clone(), DelegationMode::Direct);

        let reply = coordinator
            .process("what is the current price of tesla stock?".to_string())
            .await
            .unwrap();
        assert_eq!(reply, "Tesla (TSLA) is trading at $177.29.");

        let requests = model.requests();
        assert_eq!(requests.len(), 3);
        let results = tool_results(&requests[2]);
        assert_eq!(
            results[0],
            json!({"status": "success", "ticker": "TSLA", "name": "Tesla Inc", "currency": "USD"})
        );
        assert_eq!(
            results[1],
            json!({"status": "success", "ticker": "TSLA", "price": "177.2900"})
        );
        assert!(
            requests[0]
                .system
                .as_deref()
                .unwrap()
                .contains("stock information desk")
        );
    }

    #[tokio::test]
    async fn test_agents_mode_round_trip() {
        let model = Arc::new(ScriptedProvider::new(vec![
            // coordinator asks the identify delegate
            tool_turn(&[(
                "c1",
                "identify_ticker_agent",
                json!({"request": "Find the ticker for tesla"}),
            )]),
            // delegate calls its capability, then reports
            tool_turn(&[("d1", "get_ticker", json!({"keyword": "tesla"}))]),
            text_turn("Ticker TSLA (Tesla Inc, USD)."),
            // coordinator answers
            text_turn("Tesla trades as TSLA."),
        ]));
        let coordinator = coordinator(model.clone(), DelegationMode::Agents);

        let reply = coordinator.process("tesla ticker?".to_string()).await.unwrap();
        assert_eq!(reply, "Tesla trades as TSLA.");

        let requests = model.requests();
        assert_eq!(requests.len(), 4);
        assert_eq!(
            tool_results(&requests[3]),
            vec![json!({"result": "Ticker TSLA (Tesla Inc, USD)."})]
        );
    }

    #[tokio::test]
    async fn test_conversation_carries_history() {
        let model = Arc::new(ScriptedProvider::new(vec![
            tool_turn(&[("c1", "get_ticker", json!({"keyword": "tesla"}))]),
            text_turn("Tesla's ticker is TSLA."),
            tool_turn(&[("c2", "get_ticker_price", json!({"ticker": "TSLA"}))]),
            text_turn("It is trading at $177.29."),
        ]));
        let coordinator = coordinator(model.clone(), DelegationMode::Direct);
        let mut conversation = Conversation::new();

        coordinator
            .respond(&mut conversation, "what is tesla's ticker?")
            .await
            .unwrap();
        let reply = coordinator
            .respond(&mut conversation, "and its price?")
            .await
            .unwrap();

        assert_eq!(reply, "It is trading at $177.29.");
        assert_eq!(conversation.turns(), 2);
        assert_eq!(conversation.messages()[0].role, Role::User);

        let second_turn = &model.requests()[2];
        assert_eq!(second_turn.messages[0].text().as_deref(), Some("what is tesla's ticker?"));

        conversation.clear();
        assert!(conversation.is_empty());
    }

    #[tokio::test]
    async fn test_failed_turn_leaves_conversation_untouched() {
        let model = Arc::new(ScriptedProvider::new(vec![]));
        let coordinator = coordinator(model, DelegationMode::Direct);
        let mut conversation = Conversation::new();

        assert!(coordinator.respond(&mut conversation, "hi").await.is_err());
        assert!(conversation.is_empty());
        assert_eq!(conversation.turns(), 0);
    }

    #[tokio::test]
    async fn test_history_keeps_only_recent_turns() {
        let mut script = Vec::new();
        for turn in 0..6 {
            script.push(tool_turn(&[(
                "c1",
                "get_ticker_price",
                json!({"ticker": "TSLA"}),
            )]));
            script.push(text_turn(&format!("answer {turn}")));
        }
        let model = Arc::new(ScriptedProvider::new(script));
        let coordinator = coordinator(model.clone(), DelegationMode::Direct);
        let mut conversation = Conversation::with_max_history(3);

        for turn in 0..6 {
            coordinator
                .respond(&mut conversation, format!("price {turn}?"))
                .await
                .unwrap();
        }

        // user, tool call, tool result, answer per turn
        assert_eq!(conversation.turns(), 6);
        assert_eq!(conversation.messages().len(), 12);
        let first = &conversation.messages()[0];
        assert_eq!(first.role, Role::User);
        assert_eq!(first.text().as_deref(), Some("price 3?"));
        assert_eq!(
            conversation.messages().last().and_then(Message::text).as_deref(),
            Some("answer 5")
        );

        // the last turn was sent three kept turns plus its own question
        let requests = model.requests();
        assert_eq!(requests.len(), 12);
        assert_eq!(requests[10].messages.len(), 13);
        assert_eq!(requests[10].messages[0].text().as_deref(), Some("price 2?"));
    }

    #[test]
    fn test_history_size_is_at_least_one_turn() {
        assert_eq!(Conversation::with_max_history(0).max_history(), 1);
        assert_eq!(Conversation::new().max_history(), MAX_HISTORY_SIZE);
    }
}
