//! Conversational stock desk
//!
//! Five capabilities over Alpha Vantage, each answering with a typed result
//! envelope, and a coordinating agent that plans over them:
//!
//! - `get_ticker`: company name or keyword to ticker symbol
//! - `get_ticker_price`: latest traded price
//! - `get_ticker_price_change`: closing price change over N trading sessions
//! - `get_ticker_news`: recent news with sentiment
//! - `get_ticker_analysis`: news and price change fetched concurrently
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickerdesk::{AlphaVantageClient, CapabilitySet, CoordinatorAgent, DeskConfig};
//! use tickerdesk::agents::{provider_from_config, runtime_config};
//! use tickerdesk_runtime::AgentRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = DeskConfig::from_env()?;
//!     let source = Arc::new(AlphaVantageClient::from_config(&config)?);
//!     let capabilities = CapabilitySet::new(source, &config);
//!
//!     // Call a capability directly
//!     let price = capabilities.price.quote("TSLA").await;
//!     println!("{}", serde_json::to_string(&price)?);
//!
//!     // Or ask the coordinator
//!     let runtime = AgentRuntime::new(provider_from_config(&config)?, runtime_config(&config));
//!     let desk = CoordinatorAgent::new(&runtime, &capabilities, config.delegation);
//!     let mut conversation = Default::default();
//!     println!("{}", desk.respond(&mut conversation, "How is Tesla doing this week?").await?);
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod api;
pub mod capabilities;
pub mod config;
pub mod envelope;
pub mod error;
pub mod prompts;
pub mod render;

pub use agents::{Conversation, CoordinatorAgent};
pub use api::{AlphaVantageClient, MarketDataSource};
pub use capabilities::CapabilitySet;
pub use config::{DelegationMode, DeskConfig, LlmBackend};
pub use envelope::{Envelope, Failure, FailureKind};
pub use error::{Result, StockError};
