//! Terminal session tools, all backed by one [`SessionMultiplexer`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;
use toolrun_protocol::ToolOutput;
use toolrun_terminal::OpenOptions;
use toolrun_terminal::SessionMultiplexer;

use super::optional_u16;
use super::optional_u64;
use super::required_str;
use crate::Tool;
use crate::context::ToolContext;
use crate::error::Result;
use crate::error::tool_error;

const SESSION_ID_PROPERTY: &str = "Terminal session id";

pub struct TerminalOpenTool {
    terminals: Arc<SessionMultiplexer>,
}

impl TerminalOpenTool {
    pub fn new(terminals: Arc<SessionMultiplexer>) -> Self {
        Self { terminals }
    }
}

#[async_trait]
impl Tool for TerminalOpenTool {
    fn name(&self) -> &str {
        "terminal_open"
    }

    fn description(&self) -> &str {
        "Open a terminal session, or reuse the one with the given id."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "session_id": {"type": "string", "description": "Generated when omitted"},
                "cols": {"type": "integer", "minimum": 1},
                "rows": {"type": "integer", "minimum": 1},
                "cwd": {"type": "string"}
            }
        })
    }

    async fn execute(&self, input: Value, _ctx: &mut ToolContext) -> Result<ToolOutput> {
        let options: OpenOptions = serde_json::from_value(input)?;
        let session_id = self.terminals.open(&options).await?;
        Ok(ToolOutput::structured(json!({ "session_id": session_id })))
    }
}

pub struct TerminalReadTool {
    terminals: Arc<SessionMultiplexer>,
}

impl TerminalReadTool {
    pub fn new(terminals: Arc<SessionMultiplexer>) -> Self {
        Self { terminals }
    }
}

#[async_trait]
impl Tool for TerminalReadTool {
    fn name(&self) -> &str {
        "terminal_read"
    }

    fn description(&self) -> &str {
        "Read buffered terminal output from an offset. Pass back next_offset to continue."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "session_id": {"type": "string", "description": SESSION_ID_PROPERTY},
                "offset": {"type": "integer", "minimum": 0, "default": 0}
            },
            "required": ["session_id"]
        })
    }

    async fn execute(&self, input: Value, _ctx: &mut ToolContext) -> Result<ToolOutput> {
        let session_id = required_str(&input, "session_id")?;
        let offset = optional_u64(&input, "offset")?.unwrap_or(0);
        let result = self.terminals.read(session_id, offset).await?;
        Ok(ToolOutput::structured(serde_json::to_value(&result)?))
    }
}

pub struct TerminalWriteTool {
    terminals: Arc<SessionMultiplexer>,
}

impl TerminalWriteTool {
    pub fn new(terminals: Arc<SessionMultiplexer>) -> Self {
        Self { terminals }
    }
}

#[async_trait]
impl Tool for TerminalWriteTool {
    fn name(&self) -> &str {
        "terminal_write"
    }

    fn description(&self) -> &str {
        "Write raw input to a terminal session. Include a trailing newline to submit a line."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "session_id": {"type": "string", "description": SESSION_ID_PROPERTY},
                "data": {"type": "string"}
            },
            "required": ["session_id", "data"]
        })
    }

    async fn execute(&self, input: Value, _ctx: &mut ToolContext) -> Result<ToolOutput> {
        let session_id = required_str(&input, "session_id")?;
        let data = required_str(&input, "data")?;
        self.terminals.write(session_id, data.as_bytes()).await?;
        Ok(ToolOutput::structured(json!({
            "session_id": session_id,
            "bytes_written": data.len(),
        })))
    }
}

pub struct TerminalResizeTool {
    terminals: Arc<SessionMultiplexer>,
}

impl TerminalResizeTool {
    pub fn new(terminals: Arc<SessionMultiplexer>) -> Self {
        Self { terminals }
    }
}

#[async_trait]
impl Tool for TerminalResizeTool {
    fn name(&self) -> &str {
        "terminal_resize"
    }

    fn description(&self) -> &str {
        "Resize a terminal session."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "session_id": {"type": "string", "description": SESSION_ID_PROPERTY},
                "cols": {"type": "integer", "minimum": 1},
                "rows": {"type": "integer", "minimum": 1}
            },
            "required": ["session_id", "cols", "rows"]
        })
    }

    async fn execute(&self, input: Value, _ctx: &mut ToolContext) -> Result<ToolOutput> {
        let session_id = required_str(&input, "session_id")?;
        let (Some(cols), Some(rows)) = (
            optional_u16(&input, "cols")?,
            optional_u16(&input, "rows")?,
        ) else {
            return tool_error::InvalidInputSnafu {
                message: "cols and rows are required",
            }
            .fail();
        };
        self.terminals.resize(session_id, cols, rows).await?;
        Ok(ToolOutput::structured(json!({
            "session_id": session_id,
            "cols": cols,
            "rows": rows,
        })))
    }
}

pub struct TerminalListTool {
    terminals: Arc<SessionMultiplexer>,
}

impl TerminalListTool {
    pub fn new(terminals: Arc<SessionMultiplexer>) -> Self {
        Self { terminals }
    }
}

#[async_trait]
impl Tool for TerminalListTool {
    fn name(&self) -> &str {
        "terminal_list"
    }

    fn description(&self) -> &str {
        "List open terminal sessions."
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _input: Value, _ctx: &mut ToolContext) -> Result<ToolOutput> {
        let sessions = self.terminals.list().await;
        Ok(ToolOutput::structured(json!({
            "count": sessions.len(),
            "sessions": serde_json::to_value(&sessions)?,
        })))
    }
}

pub struct TerminalCloseTool {
    terminals: Arc<SessionMultiplexer>,
}

impl TerminalCloseTool {
    pub fn new(terminals: Arc<SessionMultiplexer>) -> Self {
        Self { terminals }
    }
}

#[async_trait]
impl Tool for TerminalCloseTool {
    fn name(&self) -> &str {
        "terminal_close"
    }

    fn description(&self) -> &str {
        "Close a terminal session and end its process."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "session_id": {"type": "string", "description": SESSION_ID_PROPERTY}
            },
            "required": ["session_id"]
        })
    }

    async fn execute(&self, input: Value, _ctx: &mut ToolContext) -> Result<ToolOutput> {
        let session_id = required_str(&input, "session_id")?;
        self.terminals.close(session_id).await?;
        Ok(ToolOutput::structured(json!({
            "session_id": session_id,
            "closed": true,
        })))
    }
}

/// Runs one command in a session, after any command already queued there.
///
/// The result carries `success` and `exit_code`, so a backgrounded exec
/// with a non-zero status is recorded as failed.
pub struct TerminalExecTool {
    terminals: Arc<SessionMultiplexer>,
}

impl TerminalExecTool {
    pub fn new(terminals: Arc<SessionMultiplexer>) -> Self {
        Self { terminals }
    }
}

#[async_trait]
impl Tool for TerminalExecTool {
    fn name(&self) -> &str {
        "terminal_exec"
    }

    fn description(&self) -> &str {
        "Run a shell command in a terminal session and return its output and exit code. \
         The session is created if it does not exist. Commands in one session run in order."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "session_id": {"type": "string", "description": SESSION_ID_PROPERTY},
                "command": {"type": "string"},
                "command_timeout_ms": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "How long to wait for the command's completion marker"
                }
            },
            "required": ["session_id", "command"]
        })
    }

    async fn execute(&self, input: Value, ctx: &mut ToolContext) -> Result<ToolOutput> {
        let session_id = required_str(&input, "session_id")?;
        let command = required_str(&input, "command")?;
        let timeout = optional_u64(&input, "command_timeout_ms")?.map(Duration::from_millis);

        let result = self
            .terminals
            .exec(session_id, command, timeout, ctx.cancel_token.clone())
            .await?;
        Ok(ToolOutput::structured(json!({
            "session_id": session_id,
            "success": result.exit_code == 0,
            "exit_code": result.exit_code,
            "output": result.output,
        })))
    }
}

#[cfg(test)]
#[path = "terminal.test.rs"]
mod tests;
