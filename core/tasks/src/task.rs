use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use toolrun_protocol::TaskStatus;
use toolrun_protocol::ToolOutput;

/// A tracked background execution.
#[derive(Debug, Clone, Serialize)]
pub struct BackgroundTask {
    /// `task-N`, assigned in creation order.
    pub id: String,
    pub tool_name: String,
    pub call_id: String,
    /// Arguments with execution options removed.
    pub args: Value,
    pub status: TaskStatus,
    pub started_at: DateTime<Utc>,
    /// Set on the transition into a terminal status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Present only when completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ToolOutput>,
    /// Present only when failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub logs: Vec<String>,
    #[serde(skip)]
    pub cancel_token: CancellationToken,
    #[serde(skip)]
    pub(crate) seq: u64,
}

impl BackgroundTask {
    /// Milliseconds between start and completion (or now, if still live).
    pub fn elapsed_ms(&self) -> i64 {
        let end = self.completed_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds().max(0)
    }
}

/// Partial update merged into a task by [`crate::TaskStore::update`].
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub status: Option<TaskStatus>,
    pub result: Option<ToolOutput>,
    pub error: Option<String>,
    /// Appended to the task's logs when the update applies.
    pub log: Option<String>,
}

impl TaskUpdate {
    pub fn running() -> Self {
        Self {
            status: Some(TaskStatus::Running),
            ..Default::default()
        }
    }

    pub fn completed(result: ToolOutput) -> Self {
        Self {
            status: Some(TaskStatus::Completed),
            result: Some(result),
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: Some(TaskStatus::Failed),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn cancelled() -> Self {
        Self {
            status: Some(TaskStatus::Cancelled),
            ..Default::default()
        }
    }

    pub fn with_log(mut self, line: impl Into<String>) -> Self {
        self.log = Some(line.into());
        self
    }
}

/// Result of [`crate::TaskStore::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CancelOutcome {
    /// False when the task had already finished.
    pub cancelled: bool,
    pub previous_status: TaskStatus,
}
