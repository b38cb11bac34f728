//! Background task inspection: `get_task`, `cancel_task`, `list_tasks`.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;
use toolrun_protocol::TaskStatus;
use toolrun_protocol::TaskStoreConfig;
use toolrun_protocol::ToolOutput;
use toolrun_tasks::BackgroundTask;
use toolrun_tasks::TaskStore;

use super::optional_bool;
use super::optional_u64;
use super::required_str;
use crate::Tool;
use crate::context::ToolContext;
use crate::error::Result;
use crate::error::tool_error;

fn task_json(task: &BackgroundTask) -> Result<Value> {
    let mut value = serde_json::to_value(task)?;
    value["elapsed_ms"] = json!(task.elapsed_ms());
    Ok(value)
}

/// Snapshot of one task, optionally waiting for it to finish.
pub struct GetTaskTool {
    tasks: TaskStore,
    config: TaskStoreConfig,
}

impl GetTaskTool {
    pub fn new(tasks: TaskStore, config: TaskStoreConfig) -> Self {
        Self { tasks, config }
    }
}

#[async_trait]
impl Tool for GetTaskTool {
    fn name(&self) -> &str {
        "get_task"
    }

    fn description(&self) -> &str {
        "Get the status and result of a background task. Set wait_for_completion \
         to block until the task finishes or timeout_ms elapses."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "task_id": {"type": "string", "description": "The task id returned when the task started"},
                "wait_for_completion": {"type": "boolean", "default": false},
                "poll_interval_ms": {"type": "integer", "minimum": 1},
                "timeout_ms": {"type": "integer", "minimum": 0}
            },
            "required": ["task_id"]
        })
    }

    async fn execute(&self, input: Value, _ctx: &mut ToolContext) -> Result<ToolOutput> {
        let task_id = required_str(&input, "task_id")?;
        let wait = optional_bool(&input, "wait_for_completion")?.unwrap_or(false);

        let task = if wait {
            let poll = optional_u64(&input, "poll_interval_ms")?
                .unwrap_or(self.config.default_poll_interval_ms.max(1) as u64);
            let timeout = optional_u64(&input, "timeout_ms")?
                .unwrap_or(self.config.default_wait_timeout_ms.max(0) as u64);
            self.tasks
                .wait_for_completion(
                    task_id,
                    Duration::from_millis(poll),
                    Duration::from_millis(timeout),
                )
                .await?
        } else {
            self.tasks
                .get(task_id)
                .await
                .ok_or_else(|| tool_error::TaskNotFoundSnafu { task_id }.build())?
        };

        Ok(ToolOutput::structured(task_json(&task)?))
    }
}

pub struct CancelTaskTool {
    tasks: TaskStore,
}

impl CancelTaskTool {
    pub fn new(tasks: TaskStore) -> Self {
        Self { tasks }
    }
}

#[async_trait]
impl Tool for CancelTaskTool {
    fn name(&self) -> &str {
        "cancel_task"
    }

    fn description(&self) -> &str {
        "Cancel a pending or running background task. Cancelling a finished task has no effect."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "task_id": {"type": "string"}
            },
            "required": ["task_id"]
        })
    }

    async fn execute(&self, input: Value, _ctx: &mut ToolContext) -> Result<ToolOutput> {
        let task_id = required_str(&input, "task_id")?;
        let outcome = self.tasks.cancel(task_id).await?;
        Ok(ToolOutput::structured(json!({
            "task_id": task_id,
            "cancelled": outcome.cancelled,
            "previous_status": outcome.previous_status,
        })))
    }
}

pub struct ListTasksTool {
    tasks: TaskStore,
}

impl ListTasksTool {
    pub fn new(tasks: TaskStore) -> Self {
        Self { tasks }
    }
}

#[async_trait]
impl Tool for ListTasksTool {
    fn name(&self) -> &str {
        "list_tasks"
    }

    fn description(&self) -> &str {
        "List background tasks, oldest first, optionally filtered by status."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "status": {
                    "type": "string",
                    "enum": ["pending", "running", "completed", "failed", "cancelled"]
                }
            }
        })
    }

    async fn execute(&self, input: Value, _ctx: &mut ToolContext) -> Result<ToolOutput> {
        let status = match input["status"].as_str() {
            Some(s) => Some(TaskStatus::from_str(s).map_err(|_| {
                tool_error::InvalidInputSnafu {
                    message: format!("unknown task status: {s}"),
                }
                .build()
            })?),
            None => None,
        };

        let tasks: Vec<Value> = self
            .tasks
            .list(status)
            .await
            .iter()
            .map(|task| {
                json!({
                    "id": task.id,
                    "tool_name": task.tool_name,
                    "status": task.status,
                    "started_at": task.started_at,
                    "completed_at": task.completed_at,
                    "elapsed_ms": task.elapsed_ms(),
                })
            })
            .collect();
        Ok(ToolOutput::structured(json!({
            "count": tasks.len(),
            "tasks": tasks,
        })))
    }
}

#[cfg(test)]
#[path = "tasks.test.rs"]
mod tests;
