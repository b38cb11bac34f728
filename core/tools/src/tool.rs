//! The [`Tool`] trait.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use toolrun_protocol::ToolOutput;

use crate::context::ToolContext;
use crate::error::Result;

/// An operation a caller can invoke by name.
///
/// # Example
///
/// ```ignore
/// struct Echo;
///
/// #[async_trait]
/// impl Tool for Echo {
///     fn name(&self) -> &str { "echo" }
///     fn description(&self) -> &str { "Echo the input back" }
///     fn input_schema(&self) -> Value {
///         json!({"type": "object", "properties": {"text": {"type": "string"}}})
///     }
///     async fn execute(&self, input: Value, _ctx: &mut ToolContext) -> Result<ToolOutput> {
///         Ok(ToolOutput::text(input["text"].as_str().unwrap_or_default()))
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the input object.
    fn input_schema(&self) -> Value;

    /// Run the tool.
    ///
    /// Long-running implementations should watch `ctx.cancel_token`.
    async fn execute(&self, input: Value, ctx: &mut ToolContext) -> Result<ToolOutput>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Name, description and schema of a tool, as advertised to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}
