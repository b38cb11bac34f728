//! Built-in tools.
//!
//! Inspection surfaces for work that outlives a call:
//! - [`GetTaskTool`], [`CancelTaskTool`], [`ListTasksTool`] for background tasks
//! - [`ReadOutputTool`] for truncated outputs
//! - `terminal_*` tools for terminal sessions
//!
//! Plus two executing tools, [`ShellCommandTool`] and [`TerminalExecTool`],
//! meant to be registered behind a [`crate::WrappedTool`].

mod read_output;
mod shell;
mod tasks;
mod terminal;

pub use read_output::ReadOutputTool;
pub use shell::ShellCommandTool;
pub use tasks::CancelTaskTool;
pub use tasks::GetTaskTool;
pub use tasks::ListTasksTool;
pub use terminal::TerminalCloseTool;
pub use terminal::TerminalExecTool;
pub use terminal::TerminalListTool;
pub use terminal::TerminalOpenTool;
pub use terminal::TerminalReadTool;
pub use terminal::TerminalResizeTool;
pub use terminal::TerminalWriteTool;

use serde_json::Value;

use crate::error::Result;
use crate::error::tool_error::InvalidInputSnafu;

pub(crate) fn required_str<'a>(input: &'a Value, field: &str) -> Result<&'a str> {
    input[field].as_str().ok_or_else(|| {
        InvalidInputSnafu {
            message: format!("{field} must be a string"),
        }
        .build()
    })
}

/// A non-negative integer field, or `None` when absent or null.
pub(crate) fn optional_u64(input: &Value, field: &str) -> Result<Option<u64>> {
    match &input[field] {
        Value::Null => Ok(None),
        value => value.as_u64().map(Some).ok_or_else(|| {
            InvalidInputSnafu {
                message: format!("{field} must be a non-negative integer"),
            }
            .build()
        }),
    }
}

pub(crate) fn optional_u16(input: &Value, field: &str) -> Result<Option<u16>> {
    optional_u64(input, field)?
        .map(|v| {
            u16::try_from(v).map_err(|_| {
                InvalidInputSnafu {
                    message: format!("{field} is out of range"),
                }
                .build()
            })
        })
        .transpose()
}

pub(crate) fn optional_bool(input: &Value, field: &str) -> Result<Option<bool>> {
    match &input[field] {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        _ => InvalidInputSnafu {
            message: format!("{field} must be a boolean"),
        }
        .fail(),
    }
}

#[cfg(test)]
#[path = "mod.test.rs"]
mod tests;
