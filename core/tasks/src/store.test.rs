use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use toolrun_protocol::ToolOutput;

#[tokio::test]
async fn test_create_assigns_sequential_ids() {
    let store = TaskStore::new();
    let first = store.create("shell", json!({"command": "ls"}), "call-1").await;
    let second = store.create("shell", json!({}), "call-2").await;

    assert_eq!(first.id, "task-1");
    assert_eq!(second.id, "task-2");
    assert_eq!(first.status, TaskStatus::Pending);
    assert_eq!(first.args, json!({"command": "ls"}));
    assert!(first.completed_at.is_none());
    assert!(!first.cancel_token.is_cancelled());
}

#[tokio::test]
async fn test_list_filters_and_keeps_creation_order() {
    let store = TaskStore::new();
    for i in 0..12 {
        store.create("t", json!({}), format!("c{i}")).await;
    }
    store.update("task-3", TaskUpdate::running()).await;
    store.update("task-11", TaskUpdate::running()).await;

    let all = store.list(None).await;
    let ids: Vec<&str> = all.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids.first(), Some(&"task-1"));
    assert_eq!(ids.last(), Some(&"task-12"));

    let running: Vec<String> = store
        .list(Some(TaskStatus::Running))
        .await
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(running, vec!["task-3".to_string(), "task-11".to_string()]);
}

#[tokio::test]
async fn test_update_merges_and_sets_completed_at() {
    let store = TaskStore::new();
    let task = store.create("t", json!({}), "c").await;

    assert!(store.update(&task.id, TaskUpdate::running()).await);
    assert!(
        store
            .update(&task.id, TaskUpdate::completed(ToolOutput::text("ok")))
            .await
    );

    let task = store.get(&task.id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.result, Some(ToolOutput::text("ok")));
    assert!(task.error.is_none());
    assert!(task.completed_at.is_some());
}

#[tokio::test]
async fn test_terminal_status_is_final() {
    let store = TaskStore::new();
    let task = store.create("t", json!({}), "c").await;
    store.update(&task.id, TaskUpdate::failed("boom")).await;

    assert!(
        !store
            .update(&task.id, TaskUpdate::completed(ToolOutput::text("late")))
            .await
    );
    let task = store.get(&task.id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.error.as_deref(), Some("boom"));
    assert!(task.result.is_none());
}

#[tokio::test]
async fn test_update_unknown_task_is_noop() {
    let store = TaskStore::new();
    assert!(!store.update("task-99", TaskUpdate::running()).await);
}

#[tokio::test]
async fn test_cancel_twice_reports_previous_status() {
    let store = TaskStore::new();
    let task = store.create("t", json!({}), "c").await;
    store.update(&task.id, TaskUpdate::running()).await;

    let first = store.cancel(&task.id).await.unwrap();
    assert_eq!(
        first,
        CancelOutcome {
            cancelled: true,
            previous_status: TaskStatus::Running,
        }
    );
    assert!(task.cancel_token.is_cancelled());

    let second = store.cancel(&task.id).await.unwrap();
    assert_eq!(
        second,
        CancelOutcome {
            cancelled: false,
            previous_status: TaskStatus::Cancelled,
        }
    );
}

#[tokio::test]
async fn test_cancel_completed_task_is_noop() {
    let store = TaskStore::new();
    let task = store.create("t", json!({}), "c").await;
    store
        .update(&task.id, TaskUpdate::completed(ToolOutput::text("done")))
        .await;

    let outcome = store.cancel(&task.id).await.unwrap();
    assert!(!outcome.cancelled);
    assert_eq!(outcome.previous_status, TaskStatus::Completed);
    assert!(!task.cancel_token.is_cancelled());
}

#[tokio::test]
async fn test_cancel_unknown_task_is_not_found() {
    let store = TaskStore::new();
    let err = store.cancel("task-404").await.unwrap_err();
    assert!(err.to_string().contains("task-404"));
}

#[tokio::test]
async fn test_cleanup_zero_keeps_live_tasks() {
    let store = TaskStore::new();
    let pending = store.create("t", json!({}), "a").await;
    let running = store.create("t", json!({}), "b").await;
    let done = store.create("t", json!({}), "c").await;
    let failed = store.create("t", json!({}), "d").await;
    let cancelled = store.create("t", json!({}), "e").await;
    store.update(&running.id, TaskUpdate::running()).await;
    store
        .update(&done.id, TaskUpdate::completed(ToolOutput::text("x")))
        .await;
    store.update(&failed.id, TaskUpdate::failed("x")).await;
    store.cancel(&cancelled.id).await.unwrap();

    assert_eq!(store.cleanup(Duration::ZERO).await, 3);

    let left: Vec<String> = store.list(None).await.into_iter().map(|t| t.id).collect();
    assert_eq!(left, vec![pending.id, running.id]);
}

#[tokio::test]
async fn test_cleanup_respects_max_age() {
    let store = TaskStore::new();
    let task = store.create("t", json!({}), "c").await;
    store.update(&task.id, TaskUpdate::failed("x")).await;

    assert_eq!(store.cleanup(Duration::from_secs(3600)).await, 0);
    assert!(store.get(&task.id).await.is_some());
}

#[tokio::test]
async fn test_append_log() {
    let store = TaskStore::new();
    let task = store.create("t", json!({}), "c").await;
    store.append_log(&task.id, "started").await.unwrap();
    store.append_log(&task.id, "halfway").await.unwrap();

    let task = store.get(&task.id).await.unwrap();
    assert_eq!(task.logs, vec!["started".to_string(), "halfway".to_string()]);
    assert!(store.append_log("task-404", "x").await.is_err());
}

#[tokio::test]
async fn test_wait_for_completion_returns_when_done() {
    let store = TaskStore::new();
    let task = store.create("t", json!({}), "c").await;
    let finisher = store.clone();
    let id = task.id.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        finisher
            .update(&id, TaskUpdate::completed(ToolOutput::text("ok")))
            .await;
    });

    let task = store
        .wait_for_completion(&task.id, Duration::from_millis(5), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_wait_for_completion_times_out_with_snapshot() {
    let store = TaskStore::new();
    let task = store.create("t", json!({}), "c").await;

    let start = Instant::now();
    let task = store
        .wait_for_completion(&task.id, Duration::from_millis(5), Duration::from_millis(40))
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(start.elapsed() < Duration::from_secs(2));

    assert!(
        store
            .wait_for_completion("task-404", Duration::from_millis(5), Duration::ZERO)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_serialized_task_omits_token() {
    let store = TaskStore::new();
    let task = store.create("shell", json!({"a": 1}), "call").await;
    let value = serde_json::to_value(&task).unwrap();
    assert_eq!(value["id"], "task-1");
    assert_eq!(value["status"], "pending");
    assert!(value.get("cancel_token").is_none());
    assert!(value.get("result").is_none());
}
