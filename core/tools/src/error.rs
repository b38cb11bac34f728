//! Error types for tool execution.

use snafu::Snafu;
use toolrun_error::ErrorExt;
use toolrun_error::Location;
use toolrun_error::StatusCode;
use toolrun_tasks::TaskError;
use toolrun_terminal::TerminalError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module)]
pub enum ToolError {
    /// Execution hit its deadline and could not be moved to the background.
    #[snafu(display("Timed out after {timeout_ms}ms"))]
    Timeout {
        timeout_ms: i64,
        #[snafu(implicit)]
        location: Location,
    },

    /// Execution was cancelled by the caller or the surrounding request.
    #[snafu(display("Cancelled"))]
    Cancelled {
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Execution failed: {message}"))]
    ExecutionFailed {
        message: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Tool not found: {name}"))]
    ToolNotFound {
        name: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Task not found: {task_id}"))]
    TaskNotFound {
        task_id: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Output not found: {output_id}"))]
    OutputNotFound {
        output_id: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Session not found: {session_id}"))]
    SessionNotFound {
        session_id: String,
        #[snafu(implicit)]
        location: Location,
    },

    /// Background execution was requested for a tool that does not allow it.
    #[snafu(display("Background execution is not allowed for {tool_name}"))]
    BackgroundNotAllowed {
        tool_name: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Invalid input: {message}"))]
    InvalidInput {
        message: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Terminal error: {message}"))]
    Terminal {
        message: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Internal error: {message}"))]
    Internal {
        message: String,
        #[snafu(implicit)]
        location: Location,
    },
}

impl ToolError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ToolError::Cancelled { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ToolError::Timeout { .. })
    }

    /// NotFound of any kind (tool, task, output or session).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ToolError::ToolNotFound { .. }
                | ToolError::TaskNotFound { .. }
                | ToolError::OutputNotFound { .. }
                | ToolError::SessionNotFound { .. }
        )
    }
}

impl ErrorExt for ToolError {
    fn status_code(&self) -> StatusCode {
        match self {
            ToolError::Timeout { .. } => StatusCode::Timeout,
            ToolError::Cancelled { .. } => StatusCode::Cancelled,
            ToolError::ExecutionFailed { .. } => StatusCode::ExecutionFailed,
            ToolError::ToolNotFound { .. } => StatusCode::ToolNotFound,
            ToolError::TaskNotFound { .. } => StatusCode::TaskNotFound,
            ToolError::OutputNotFound { .. } => StatusCode::OutputNotFound,
            ToolError::SessionNotFound { .. } => StatusCode::SessionNotFound,
            ToolError::BackgroundNotAllowed { .. } => StatusCode::NotPermittedByConfig,
            ToolError::InvalidInput { .. } => StatusCode::InvalidArguments,
            ToolError::Terminal { .. } => StatusCode::TerminalError,
            ToolError::Internal { .. } => StatusCode::Internal,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl From<TaskError> for ToolError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound { task_id, .. } => tool_error::TaskNotFoundSnafu { task_id }.build(),
        }
    }
}

impl From<TerminalError> for ToolError {
    fn from(err: TerminalError) -> Self {
        match err {
            TerminalError::SessionNotFound { session_id, .. } => {
                tool_error::SessionNotFoundSnafu { session_id }.build()
            }
            TerminalError::CommandTimeout { timeout_ms, .. } => {
                tool_error::TimeoutSnafu { timeout_ms }.build()
            }
            TerminalError::CommandCancelled { .. } => tool_error::CancelledSnafu.build(),
            other => tool_error::TerminalSnafu {
                message: other.to_string(),
            }
            .build(),
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        tool_error::InvalidInputSnafu {
            message: format!("JSON error: {err}"),
        }
        .build()
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;

#[cfg(test)]
#[path = "error.test.rs"]
mod tests;
