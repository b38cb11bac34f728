//! Extension trait shared by every error enum in the workspace.

use crate::StatusCode;

/// Common behaviour for errors that carry a [`StatusCode`].
pub trait ErrorExt: std::error::Error {
    /// Classify this error.
    fn status_code(&self) -> StatusCode;

    /// Downcast support for callers that hold `&dyn ErrorExt`.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Whether retrying the same call may succeed.
    fn is_retryable(&self) -> bool {
        self.status_code().is_retryable()
    }

    /// Message safe to hand back to an agent.
    ///
    /// Errors whose status is logged as unexpected (internal, unknown) are
    /// reduced to their numeric code so implementation details stay in logs.
    fn output_msg(&self) -> String {
        let code = self.status_code();
        match code {
            StatusCode::Internal | StatusCode::Unknown => {
                format!("Internal error: {}", code as i32)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "ext.test.rs"]
mod tests;
