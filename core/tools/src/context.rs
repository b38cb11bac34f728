use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

/// Per-call execution context.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub call_id: String,
    /// Chat or agent session the call belongs to.
    pub session_id: String,
    pub cwd: PathBuf,
    /// Cancellation requested by the caller of this tool.
    pub cancel_token: CancellationToken,
    /// Cancellation of the surrounding request, if the host has one.
    ///
    /// A call promoted to the background stops listening to it.
    pub request_token: Option<CancellationToken>,
}

impl ToolContext {
    pub fn new(call_id: impl Into<String>, session_id: impl Into<String>, cwd: PathBuf) -> Self {
        Self {
            call_id: call_id.into(),
            session_id: session_id.into(),
            cwd,
            cancel_token: CancellationToken::new(),
            request_token: None,
        }
    }

    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn with_request_token(mut self, token: CancellationToken) -> Self {
        self.request_token = Some(token);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
            || self
                .request_token
                .as_ref()
                .is_some_and(CancellationToken::is_cancelled)
    }

    /// Copy of this context governed by `token` alone.
    pub fn scoped(&self, token: CancellationToken) -> Self {
        Self {
            cancel_token: token,
            request_token: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
#[path = "context.test.rs"]
mod tests;
