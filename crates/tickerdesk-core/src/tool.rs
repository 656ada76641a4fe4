//! Tool trait definition

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

/// An operation the planner can invoke by name
///
/// Each tool publishes a name, a description the model reads when deciding
/// what to call, and a JSON schema for its arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with arguments produced by the planner
    ///
    /// # Arguments
    ///
    /// * `params` - Tool input as JSON value (should match `input_schema`)
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Unique name within a [`ToolRegistry`](crate::ToolRegistry)
    fn name(&self) -> &str;

    /// Description shown to the model
    fn description(&self) -> &str;

    /// JSON Schema describing the expected arguments
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    ///
    /// let schema = json!({
    ///     "type": "object",
    ///     "properties": {
    ///         "ticker": { "type": "string", "description": "Stock ticker symbol" }
    ///     },
    ///     "required": ["ticker"]
    /// });
    /// assert_eq!(schema["required"][0], "ticker");
    /// ```
    fn input_schema(&self) -> Value;
}
