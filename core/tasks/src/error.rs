//! Error types for the task store.

use snafu::Snafu;
use toolrun_error::ErrorExt;
use toolrun_error::Location;
use toolrun_error::StatusCode;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module)]
pub enum TaskError {
    /// No task with this id (never created, or already cleaned up).
    #[snafu(display("Task not found: {task_id}"))]
    NotFound {
        task_id: String,
        #[snafu(implicit)]
        location: Location,
    },
}

impl ErrorExt for TaskError {
    fn status_code(&self) -> StatusCode {
        match self {
            TaskError::NotFound { .. } => StatusCode::TaskNotFound,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

pub type Result<T> = std::result::Result<T, TaskError>;
