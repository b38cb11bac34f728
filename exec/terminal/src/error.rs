//! Error types for terminal sessions.

use snafu::Snafu;
use toolrun_error::ErrorExt;
use toolrun_error::Location;
use toolrun_error::StatusCode;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module)]
pub enum TerminalError {
    #[snafu(display("Session not found: {session_id}"))]
    SessionNotFound {
        session_id: String,
        #[snafu(implicit)]
        location: Location,
    },

    /// The terminal process could not be started.
    #[snafu(display("Failed to spawn terminal: {message}"))]
    Spawn {
        message: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Terminal I/O error: {message}"))]
    Io {
        message: String,
        #[snafu(implicit)]
        location: Location,
    },

    /// The session was closed or its process exited.
    #[snafu(display("Session {session_id} is closed: {reason}"))]
    Closed {
        session_id: String,
        reason: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Command in session {session_id} timed out after {timeout_ms}ms"))]
    CommandTimeout {
        session_id: String,
        timeout_ms: i64,
        #[snafu(implicit)]
        location: Location,
    },

    /// The command was interrupted because its caller went away.
    #[snafu(display("Command in session {session_id} cancelled"))]
    CommandCancelled {
        session_id: String,
        #[snafu(implicit)]
        location: Location,
    },

    /// A queued command panicked before producing a result.
    #[snafu(display("Command in session {session_id} aborted"))]
    CommandAborted {
        session_id: String,
        #[snafu(implicit)]
        location: Location,
    },
}

impl ErrorExt for TerminalError {
    fn status_code(&self) -> StatusCode {
        match self {
            TerminalError::SessionNotFound { .. } => StatusCode::SessionNotFound,
            TerminalError::Spawn { .. } => StatusCode::TerminalError,
            TerminalError::Io { .. } => StatusCode::IoError,
            TerminalError::Closed { .. } => StatusCode::TerminalError,
            TerminalError::CommandTimeout { .. } => StatusCode::Timeout,
            TerminalError::CommandCancelled { .. } => StatusCode::Cancelled,
            TerminalError::CommandAborted { .. } => StatusCode::Internal,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

pub type Result<T> = std::result::Result<T, TerminalError>;

#[cfg(test)]
#[path = "error.test.rs"]
mod tests;
