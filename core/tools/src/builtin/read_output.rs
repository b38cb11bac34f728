use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;
use toolrun_protocol::ToolOutput;

use super::optional_u64;
use super::required_str;
use crate::OutputStore;
use crate::Tool;
use crate::context::ToolContext;
use crate::error::Result;

/// Pages through an output that was too large to return inline.
pub struct ReadOutputTool {
    outputs: OutputStore,
    default_limit: usize,
}

impl ReadOutputTool {
    pub fn new(outputs: OutputStore, default_limit: usize) -> Self {
        Self {
            outputs,
            default_limit,
        }
    }
}

#[async_trait]
impl Tool for ReadOutputTool {
    fn name(&self) -> &str {
        "read_output"
    }

    fn description(&self) -> &str {
        "Read part of a truncated tool output. Offsets and limits count characters."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "output_id": {"type": "string"},
                "offset": {"type": "integer", "minimum": 0, "default": 0},
                "limit": {"type": "integer", "minimum": 1, "default": self.default_limit}
            },
            "required": ["output_id"]
        })
    }

    async fn execute(&self, input: Value, _ctx: &mut ToolContext) -> Result<ToolOutput> {
        let output_id = required_str(&input, "output_id")?;
        let offset = optional_u64(&input, "offset")?.unwrap_or(0) as usize;
        let limit = optional_u64(&input, "limit")?
            .map(|v| v as usize)
            .unwrap_or(self.default_limit);

        let page = self.outputs.read(output_id, offset, limit).await?;
        let mut value = serde_json::to_value(&page)?;
        value["output_id"] = json!(output_id);
        Ok(ToolOutput::structured(value))
    }
}

#[cfg(test)]
#[path = "read_output.test.rs"]
mod tests;
