//! Core Agent trait definition

use crate::Result;
use async_trait::async_trait;

/// Anything that turns one natural-language request into one reply.
///
/// Both the coordinating controller and the per-capability delegates
/// implement this, which is what lets a delegate be wrapped as a tool.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Handle a single request and return the final text reply
    async fn process(&self, input: String) -> Result<String>;

    /// Get the agent's name
    fn name(&self) -> &str;
}
