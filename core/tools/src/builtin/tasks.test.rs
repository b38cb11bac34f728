use super::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use toolrun_tasks::TaskUpdate;

fn ctx() -> ToolContext {
    ToolContext::new("call-1", "session-1", PathBuf::from("/tmp"))
}

#[tokio::test]
async fn test_get_task_snapshot() {
    let tasks = TaskStore::new();
    let task = tasks.create("shell", json!({"command": "ls"}), "call-7").await;
    let tool = GetTaskTool::new(tasks.clone(), TaskStoreConfig::default());

    let output = tool
        .execute(json!({"task_id": task.id}), &mut ctx())
        .await
        .unwrap();
    let value = output.content.as_structured().unwrap();
    assert_eq!(value["id"], "task-1");
    assert_eq!(value["status"], "pending");
    assert_eq!(value["call_id"], "call-7");
    assert_eq!(value["args"], json!({"command": "ls"}));
    assert!(value["elapsed_ms"].is_i64());
}

#[tokio::test]
async fn test_get_task_waits_for_completion() {
    let tasks = TaskStore::new();
    let task = tasks.create("shell", json!({}), "call-1").await;
    let tool = GetTaskTool::new(tasks.clone(), TaskStoreConfig::default());

    let store = tasks.clone();
    let task_id = task.id.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        store
            .update(&task_id, TaskUpdate::completed(ToolOutput::text("done")))
            .await;
    });

    let output = tool
        .execute(
            json!({"task_id": task.id, "wait_for_completion": true, "poll_interval_ms": 10}),
            &mut ctx(),
        )
        .await
        .unwrap();
    let value = output.content.as_structured().unwrap();
    assert_eq!(value["status"], "completed");
    assert_eq!(value["result"]["content"], "done");
}

#[tokio::test]
async fn test_get_task_wait_times_out_with_snapshot() {
    let tasks = TaskStore::new();
    let task = tasks.create("shell", json!({}), "call-1").await;
    let tool = GetTaskTool::new(tasks, TaskStoreConfig::default());

    let output = tool
        .execute(
            json!({"task_id": task.id, "wait_for_completion": true, "timeout_ms": 30}),
            &mut ctx(),
        )
        .await
        .unwrap();
    assert_eq!(output.content.as_structured().unwrap()["status"], "pending");
}

#[tokio::test]
async fn test_get_unknown_task() {
    let tool = GetTaskTool::new(TaskStore::new(), TaskStoreConfig::default());
    let err = tool
        .execute(json!({"task_id": "task-42"}), &mut ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, crate::ToolError::TaskNotFound { .. }));

    let err = tool
        .execute(json!({"task_id": "task-42", "wait_for_completion": true}), &mut ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, crate::ToolError::TaskNotFound { .. }));
}

#[tokio::test]
async fn test_cancel_twice() {
    let tasks = TaskStore::new();
    let task = tasks.create("shell", json!({}), "call-1").await;
    tasks.update(&task.id, TaskUpdate::running()).await;
    let tool = CancelTaskTool::new(tasks.clone());

    let first = tool
        .execute(json!({"task_id": task.id}), &mut ctx())
        .await
        .unwrap();
    assert_eq!(
        first.content.as_structured().unwrap(),
        &json!({"task_id": "task-1", "cancelled": true, "previous_status": "running"})
    );

    let second = tool
        .execute(json!({"task_id": task.id}), &mut ctx())
        .await
        .unwrap();
    assert_eq!(
        second.content.as_structured().unwrap(),
        &json!({"task_id": "task-1", "cancelled": false, "previous_status": "cancelled"})
    );
    assert!(task.cancel_token.is_cancelled());
}

#[tokio::test]
async fn test_cancel_unknown_task() {
    let tool = CancelTaskTool::new(TaskStore::new());
    let err = tool
        .execute(json!({"task_id": "task-3"}), &mut ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, crate::ToolError::TaskNotFound { .. }));
}

#[tokio::test]
async fn test_list_tasks_with_filter() {
    let tasks = TaskStore::new();
    let first = tasks.create("shell", json!({}), "call-1").await;
    tasks.create("edit", json!({}), "call-2").await;
    tasks.update(&first.id, TaskUpdate::failed("boom")).await;
    let tool = ListTasksTool::new(tasks);

    let all = tool.execute(json!({}), &mut ctx()).await.unwrap();
    let all = all.content.as_structured().unwrap();
    assert_eq!(all["count"], 2);
    assert_eq!(all["tasks"][0]["id"], "task-1");
    assert_eq!(all["tasks"][1]["tool_name"], "edit");

    let failed = tool
        .execute(json!({"status": "failed"}), &mut ctx())
        .await
        .unwrap();
    let failed = failed.content.as_structured().unwrap();
    assert_eq!(failed["count"], 1);
    assert_eq!(failed["tasks"][0]["status"], "failed");

    let err = tool
        .execute(json!({"status": "sleeping"}), &mut ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, crate::ToolError::InvalidInput { .. }));
}
