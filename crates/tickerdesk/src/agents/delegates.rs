//! One delegate agent per capability

use crate::capabilities::CapabilitySet;
use crate::prompts;
use std::sync::Arc;
use tickerdesk_core::{Tool, ToolRegistry};
use tickerdesk_runtime::{AgentRuntime, AgentTool};
use tracing::debug;

/// Delegate names, in registration order
pub const DELEGATE_NAMES: [&str; 5] = [
    "identify_ticker_agent",
    "ticker_price_agent",
    "ticker_price_change_agent",
    "ticker_news_agent",
    "ticker_analysis_agent",
];

const DESCRIPTIONS: [&str; 5] = [
    "Identifies the stock ticker symbol, company name and currency for a company name or keyword.",
    "Retrieves the latest stock price for a ticker symbol.",
    "Retrieves the closing price change for a ticker symbol over a number of trading days.",
    "Retrieves and summarises the latest news articles and sentiment for a ticker symbol.",
    "Analyses a ticker symbol using its latest news and price change; use it for questions about \
     the current status of a stock or why its price moved.",
];

const INSTRUCTIONS: [&str; 5] = [
    prompts::IDENTIFY_TICKER,
    prompts::TICKER_PRICE,
    prompts::TICKER_PRICE_CHANGE,
    prompts::TICKER_NEWS,
    prompts::TICKER_ANALYSIS,
];

/// Wrap each capability in its own agent and expose the agents as tools
///
/// Every delegate sees only its own capability.
pub fn delegate_tools(runtime: &AgentRuntime, capabilities: &CapabilitySet) -> Vec<Arc<dyn Tool>> {
    capabilities
        .tools()
        .into_iter()
        .zip(DELEGATE_NAMES.iter().zip(INSTRUCTIONS.iter().zip(DESCRIPTIONS.iter())))
        .map(|(capability, (name, (instruction, description)))| {
            debug!(delegate = name, capability = capability.name(), "Creating delegate agent");
            let registry = ToolRegistry::new();
            registry.register(capability);
            let agent = runtime.create_tool_agent(*name, *instruction, Arc::new(registry));
            Arc::new(AgentTool::new(Arc::new(agent), *description)) as Arc<dyn Tool>
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickerdesk_runtime::testing::{ScriptedProvider, text_turn, tool_turn};
    use crate::api::{ApiFunction, MarketDataSource};
    use crate::capabilities::TOOL_NAMES;
    use crate::capabilities::testing::answering;
    use crate::config::DeskConfig;
    use serde_json::json;
    use tickerdesk_runtime::RuntimeConfig;

    fn capabilities(source: Arc<dyn MarketDataSource>) -> CapabilitySet {
        CapabilitySet::new(source, &DeskConfig::default())
    }

    #[test]
    fn test_one_delegate_per_capability() {
        let runtime = AgentRuntime::new(
            Arc::new(ScriptedProvider::new(vec![])),
            RuntimeConfig::default(),
        );
        let source = Arc::new(crate::capabilities::testing::untouched());
        let tools = delegate_tools(&runtime, &capabilities(source));

        let names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
        assert_eq!(names, DELEGATE_NAMES.to_vec());
        for tool in &tools {
            assert_eq!(tool.input_schema()["required"][0], "request");
        }
    }

    #[tokio::test]
    async fn test_delegate_runs_only_its_capability() {
        let model = Arc::new(ScriptedProvider::new(vec![
            tool_turn(&[("c1", "get_ticker_price", json!({"ticker": "TSLA"}))]),
            text_turn("TSLA last traded at 177.29 USD."),
        ]));
        let runtime = AgentRuntime::new(model.clone(), RuntimeConfig::default());
        let source = Arc::new(answering(
            ApiFunction::GlobalQuote,
            json!({"Global Quote": {"05. price": "177.2900"}}),
        ));
        let tools = delegate_tools(&runtime, &capabilities(source));

        let out = tools[1]
            .execute(json!({"request": "Price for TSLA"}))
            .await
            .unwrap();
        assert_eq!(out["result"], "TSLA last traded at 177.29 USD.");

        let requests = model.requests();
        let offered: Vec<&str> = requests[0].tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(offered, vec![TOOL_NAMES[1]]);
        assert_eq!(requests[0].system.as_deref(), Some(prompts::TICKER_PRICE));
    }
}
