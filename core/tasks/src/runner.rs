//! Detached execution of a task's operation.

use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use snafu::OptionExt;
use tokio_util::sync::CancellationToken;
use toolrun_async_utils::RaceErr;
use toolrun_async_utils::run_with_deadline;
use toolrun_protocol::TaskStatus;
use toolrun_protocol::ToolOutput;
use tracing::debug;
use tracing::info;

use crate::TaskStore;
use crate::TaskUpdate;
use crate::detect_failure;
use crate::error::Result;
use crate::error::task_error::NotFoundSnafu;

/// Runs a future past the lifetime of the request that started it.
///
/// Hosts without a long-lived Tokio runtime plug in their own keep-alive
/// mechanism here.
pub trait DetachedSpawner: Send + Sync {
    fn spawn(&self, fut: BoxFuture<'static, ()>);
}

/// Spawns onto the current Tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSpawner;

impl DetachedSpawner for TokioSpawner {
    fn spawn(&self, fut: BoxFuture<'static, ()>) {
        tokio::spawn(fut);
    }
}

impl TaskStore {
    /// Mark the task running and drive `factory`'s future in the background.
    ///
    /// The factory receives the task's cancellation token. The future races
    /// `timeout` and the token; whatever settles first decides the terminal
    /// status. A status already made terminal (by [`TaskStore::cancel`]) is
    /// never overwritten.
    pub async fn run_in_background<F, Fut, E>(
        &self,
        task_id: &str,
        factory: F,
        timeout: Duration,
    ) -> Result<()>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = std::result::Result<ToolOutput, E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        self.run_in_background_with(task_id, factory, timeout, |output| async move { output })
            .await
    }

    /// [`TaskStore::run_in_background`] with a `finish` step.
    ///
    /// `finish` runs on a successful result after [`detect_failure`] has
    /// judged the raw output, and its return value is what the task stores.
    pub async fn run_in_background_with<F, Fut, E, P, PFut>(
        &self,
        task_id: &str,
        factory: F,
        timeout: Duration,
        finish: P,
    ) -> Result<()>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = std::result::Result<ToolOutput, E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
        P: FnOnce(ToolOutput) -> PFut + Send + 'static,
        PFut: Future<Output = ToolOutput> + Send + 'static,
    {
        let token = {
            let mut tasks = self.tasks.lock().await;
            let task = tasks.get_mut(task_id).context(NotFoundSnafu { task_id })?;
            if task.status.is_terminal() {
                debug!(task_id, status = %task.status, "Task already finished, not starting");
                return Ok(());
            }
            task.status = TaskStatus::Running;
            task.logs.push("started".to_string());
            task.cancel_token.clone()
        };

        let fut = factory(token.clone());
        let store = self.clone();
        let task_id = task_id.to_string();
        let timeout_ms = timeout.as_millis();

        self.spawner.spawn(Box::pin(async move {
            let settled = run_with_deadline(fut, &token, timeout).await;
            let timed_out = matches!(settled, Err(RaceErr::TimedOut));
            let update = match settled {
                Ok(Ok(output)) => match detect_failure(&output) {
                    Some(message) => {
                        let line = format!("failed: {message}");
                        TaskUpdate::failed(message).with_log(line)
                    }
                    None => TaskUpdate::completed(finish(output).await).with_log("completed"),
                },
                Ok(Err(_)) if token.is_cancelled() => {
                    TaskUpdate::cancelled().with_log("cancelled")
                }
                Ok(Err(err)) => {
                    let message = err.to_string();
                    let line = format!("failed: {message}");
                    TaskUpdate::failed(message).with_log(line)
                }
                Err(RaceErr::Cancelled) => TaskUpdate::cancelled().with_log("cancelled"),
                Err(RaceErr::TimedOut) => {
                    TaskUpdate::failed(format!("Task timed out after {timeout_ms}ms"))
                        .with_log(format!("timed out after {timeout_ms}ms"))
                }
            };

            let status = update.status;
            let applied = store.update(&task_id, update).await;
            if timed_out {
                token.cancel();
            }
            info!(
                task_id = %task_id,
                status = ?status,
                applied,
                "Background task settled"
            );
        }));

        Ok(())
    }
}

#[cfg(test)]
#[path = "runner.test.rs"]
mod tests;
