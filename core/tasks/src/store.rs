use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use chrono::TimeDelta;
use chrono::Utc;
use serde_json::Value;
use snafu::OptionExt;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use toolrun_protocol::TaskStatus;
use tracing::debug;
use tracing::info;

use crate::BackgroundTask;
use crate::CancelOutcome;
use crate::DetachedSpawner;
use crate::TaskUpdate;
use crate::TokioSpawner;
use crate::error::Result;
use crate::error::task_error::NotFoundSnafu;

/// In-memory registry of background tasks.
///
/// Cheap to clone; clones share the same tasks.
#[derive(Clone)]
pub struct TaskStore {
    pub(crate) tasks: Arc<Mutex<HashMap<String, BackgroundTask>>>,
    next_id: Arc<AtomicU64>,
    pub(crate) spawner: Arc<dyn DetachedSpawner>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::with_spawner(Arc::new(TokioSpawner))
    }

    pub fn with_spawner(spawner: Arc<dyn DetachedSpawner>) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            spawner,
        }
    }

    /// Register a new pending task with a fresh cancellation token.
    pub async fn create(
        &self,
        tool_name: impl Into<String>,
        args: Value,
        call_id: impl Into<String>,
    ) -> BackgroundTask {
        let seq = self.next_id.fetch_add(1, Ordering::Relaxed);
        let task = BackgroundTask {
            id: format!("task-{seq}"),
            tool_name: tool_name.into(),
            call_id: call_id.into(),
            args,
            status: TaskStatus::Pending,
            started_at: Utc::now(),
            completed_at: None,
            result: None,
            error: None,
            logs: Vec::new(),
            cancel_token: CancellationToken::new(),
            seq,
        };
        debug!(task_id = %task.id, tool = %task.tool_name, "Created background task");
        self.tasks
            .lock()
            .await
            .insert(task.id.clone(), task.clone());
        task
    }

    pub async fn get(&self, task_id: &str) -> Option<BackgroundTask> {
        self.tasks.lock().await.get(task_id).cloned()
    }

    /// All tasks in creation order, optionally filtered by status.
    pub async fn list(&self, status: Option<TaskStatus>) -> Vec<BackgroundTask> {
        let tasks = self.tasks.lock().await;
        let mut matching: Vec<BackgroundTask> = tasks
            .values()
            .filter(|task| status.is_none_or(|s| task.status == s))
            .cloned()
            .collect();
        matching.sort_by_key(|task| task.seq);
        matching
    }

    /// Merge `update` into the task.
    ///
    /// Returns false when the task is unknown or already terminal; a
    /// terminal task is never modified.
    pub async fn update(&self, task_id: &str, update: TaskUpdate) -> bool {
        let mut tasks = self.tasks.lock().await;
        let Some(task) = tasks.get_mut(task_id) else {
            return false;
        };
        if task.status.is_terminal() {
            debug!(task_id, status = %task.status, "Ignoring update to finished task");
            return false;
        }

        if let Some(status) = update.status {
            task.status = status;
            if status.is_terminal() {
                task.completed_at = Some(Utc::now());
            }
        }
        if update.result.is_some() {
            task.result = update.result;
        }
        if update.error.is_some() {
            task.error = update.error;
        }
        if let Some(line) = update.log {
            task.logs.push(line);
        }
        true
    }

    pub async fn append_log(&self, task_id: &str, line: impl Into<String>) -> Result<()> {
        let mut tasks = self.tasks.lock().await;
        let task = tasks.get_mut(task_id).context(NotFoundSnafu { task_id })?;
        task.logs.push(line.into());
        Ok(())
    }

    /// Cancel a live task.
    ///
    /// Cancels the token and marks the task cancelled in one step. A task
    /// that already finished is left alone and reported with
    /// `cancelled: false`.
    pub async fn cancel(&self, task_id: &str) -> Result<CancelOutcome> {
        let mut tasks = self.tasks.lock().await;
        let task = tasks.get_mut(task_id).context(NotFoundSnafu { task_id })?;
        let previous_status = task.status;
        if previous_status.is_terminal() {
            return Ok(CancelOutcome {
                cancelled: false,
                previous_status,
            });
        }

        task.cancel_token.cancel();
        task.status = TaskStatus::Cancelled;
        task.completed_at = Some(Utc::now());
        task.logs.push("cancelled by request".to_string());
        info!(task_id, previous = %previous_status, "Cancelled background task");
        Ok(CancelOutcome {
            cancelled: true,
            previous_status,
        })
    }

    /// Remove finished tasks whose completion is at least `max_age` old.
    ///
    /// Pending and running tasks are never removed.
    pub async fn cleanup(&self, max_age: Duration) -> usize {
        let max_age = TimeDelta::from_std(max_age).unwrap_or(TimeDelta::MAX);
        let now = Utc::now();
        let mut tasks = self.tasks.lock().await;
        let before = tasks.len();
        tasks.retain(|_, task| {
            let expired = task.status.is_terminal()
                && task
                    .completed_at
                    .is_some_and(|done| now.signed_duration_since(done) >= max_age);
            !expired
        });
        let removed = before - tasks.len();
        if removed > 0 {
            debug!(removed, "Cleaned up finished tasks");
        }
        removed
    }

    /// Poll until the task is terminal or `timeout` elapses.
    ///
    /// Returns the latest snapshot either way; callers check `status`.
    pub async fn wait_for_completion(
        &self,
        task_id: &str,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<BackgroundTask> {
        let start = Instant::now();
        let poll_interval = poll_interval.max(Duration::from_millis(1));
        loop {
            let task = self.get(task_id).await.context(NotFoundSnafu { task_id })?;
            let elapsed = start.elapsed();
            if task.status.is_terminal() || elapsed >= timeout {
                return Ok(task);
            }
            tokio::time::sleep(poll_interval.min(timeout - elapsed)).await;
        }
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStore")
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "store.test.rs"]
mod tests;
