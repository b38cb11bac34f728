use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;
use toolrun_async_utils::OrCancelExt;
use toolrun_protocol::ToolOutput;
use tracing::debug;

use super::required_str;
use crate::Tool;
use crate::context::ToolContext;
use crate::error::Result;
use crate::error::tool_error;

/// Runs a one-off command through `<shell> -c`.
///
/// Returns `{success, exit_code, stdout, stderr}`. The child is killed
/// when the execution is cancelled or dropped.
pub struct ShellCommandTool {
    shell: String,
}

impl ShellCommandTool {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellCommandTool {
    fn default() -> Self {
        Self::new("/bin/sh")
    }
}

#[async_trait]
impl Tool for ShellCommandTool {
    fn name(&self) -> &str {
        "shell"
    }

    fn description(&self) -> &str {
        "Run a shell command in the working directory and return its exit code, stdout and stderr."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {"type": "string", "description": "The command to run"}
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, input: Value, ctx: &mut ToolContext) -> Result<ToolOutput> {
        let command = required_str(&input, "command")?;
        debug!(shell = %self.shell, command, cwd = %ctx.cwd.display(), "Running shell command");

        let child = tokio::process::Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .current_dir(&ctx.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                tool_error::ExecutionFailedSnafu {
                    message: format!("Failed to spawn {}: {e}", self.shell),
                }
                .build()
            })?;

        // Dropping the child on cancellation kills it.
        let output = child
            .wait_with_output()
            .or_cancel(&ctx.cancel_token)
            .await
            .map_err(|_| tool_error::CancelledSnafu.build())?
            .map_err(|e| {
                tool_error::ExecutionFailedSnafu {
                    message: format!("Failed to wait for command: {e}"),
                }
                .build()
            })?;

        let exit_code = output.status.code().unwrap_or(-1);
        Ok(ToolOutput::structured(json!({
            "success": output.status.success(),
            "exit_code": exit_code,
            "stdout": String::from_utf8_lossy(&output.stdout),
            "stderr": String::from_utf8_lossy(&output.stderr),
        })))
    }
}

#[cfg(test)]
#[path = "shell.test.rs"]
mod tests;
