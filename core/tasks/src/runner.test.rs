use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Instant;

async fn wait_terminal(store: &TaskStore, id: &str) -> crate::BackgroundTask {
    store
        .wait_for_completion(id, Duration::from_millis(5), Duration::from_secs(5))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_completed_result_recorded() {
    let store = TaskStore::new();
    let task = store.create("echo", json!({}), "c").await;

    store
        .run_in_background(
            &task.id,
            |_token| async { Ok::<_, String>(ToolOutput::text("hello")) },
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    let task = wait_terminal(&store, &task.id).await;
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.result, Some(ToolOutput::text("hello")));
    assert_eq!(task.logs, vec!["started".to_string(), "completed".to_string()]);
}

#[tokio::test]
async fn test_failure_heuristic_applies() {
    let store = TaskStore::new();
    let task = store.create("shell", json!({}), "c").await;

    store
        .run_in_background(
            &task.id,
            |_token| async {
                Ok::<_, String>(ToolOutput::structured(json!({
                    "success": false,
                    "exit_code": 3,
                    "stdout": "",
                    "stderr": ""
                })))
            },
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    let task = wait_terminal(&store, &task.id).await;
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.error.as_deref(), Some("exit code 3"));
    assert!(task.result.is_none());
    assert_eq!(
        task.logs,
        vec!["started".to_string(), "failed: exit code 3".to_string()]
    );
}

#[tokio::test]
async fn test_finish_runs_after_failure_is_judged() {
    let store = TaskStore::new();
    let failing = store.create("shell", json!({}), "c").await;
    let passing = store.create("shell", json!({}), "c").await;

    let summarize = |_output: ToolOutput| async { ToolOutput::text("summary") };
    store
        .run_in_background_with(
            &failing.id,
            |_token| async {
                Ok::<_, String>(ToolOutput::structured(json!({
                    "success": false,
                    "exit_code": 2,
                    "stderr": "boom"
                })))
            },
            Duration::from_secs(5),
            summarize,
        )
        .await
        .unwrap();
    store
        .run_in_background_with(
            &passing.id,
            |_token| async {
                Ok::<_, String>(ToolOutput::structured(json!({
                    "success": true,
                    "exit_code": 0
                })))
            },
            Duration::from_secs(5),
            summarize,
        )
        .await
        .unwrap();

    let failing = wait_terminal(&store, &failing.id).await;
    assert_eq!(failing.status, TaskStatus::Failed);
    assert_eq!(failing.error.as_deref(), Some("boom"));

    let passing = wait_terminal(&store, &passing.id).await;
    assert_eq!(passing.status, TaskStatus::Completed);
    assert_eq!(passing.result, Some(ToolOutput::text("summary")));
}

#[tokio::test]
async fn test_error_recorded_as_failure() {
    let store = TaskStore::new();
    let task = store.create("t", json!({}), "c").await;

    store
        .run_in_background(
            &task.id,
            |_token| async { Err::<ToolOutput, _>("connection reset".to_string()) },
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    let task = wait_terminal(&store, &task.id).await;
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.error.as_deref(), Some("connection reset"));
}

#[tokio::test]
async fn test_timeout_marks_failed_and_cancels_token() {
    let store = TaskStore::new();
    let task = store.create("t", json!({}), "c").await;

    store
        .run_in_background(
            &task.id,
            |_token| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, String>(ToolOutput::text("late"))
            },
            Duration::from_millis(30),
        )
        .await
        .unwrap();

    let start = Instant::now();
    let task = wait_terminal(&store, &task.id).await;
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(
        task.logs,
        vec!["started".to_string(), "timed out after 30ms".to_string()]
    );
    assert!(task.error.unwrap().contains("timed out"));

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(task.cancel_token.is_cancelled());
}

#[tokio::test]
async fn test_cancel_while_running_wins() {
    let store = TaskStore::new();
    let task = store.create("t", json!({}), "c").await;

    store
        .run_in_background(
            &task.id,
            |token| async move {
                token.cancelled().await;
                Err::<ToolOutput, _>("aborted".to_string())
            },
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    assert_eq!(
        store.get(&task.id).await.unwrap().status,
        TaskStatus::Running
    );
    let outcome = store.cancel(&task.id).await.unwrap();
    assert!(outcome.cancelled);

    tokio::time::sleep(Duration::from_millis(30)).await;
    let task = store.get(&task.id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Cancelled);
    assert!(task.error.is_none());
    assert_eq!(
        task.logs,
        vec!["started".to_string(), "cancelled by request".to_string()]
    );
}

#[tokio::test]
async fn test_cancelled_before_start_is_not_run() {
    let store = TaskStore::new();
    let task = store.create("t", json!({}), "c").await;
    store.cancel(&task.id).await.unwrap();

    let ran = Arc::new(StdMutex::new(false));
    let flag = Arc::clone(&ran);
    store
        .run_in_background(
            &task.id,
            move |_token| {
                *flag.lock().unwrap() = true;
                async { Ok::<_, String>(ToolOutput::text("x")) }
            },
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    assert!(!*ran.lock().unwrap());
    assert_eq!(
        store.get(&task.id).await.unwrap().status,
        TaskStatus::Cancelled
    );
}

#[tokio::test]
async fn test_unknown_task_is_not_found() {
    let store = TaskStore::new();
    let result = store
        .run_in_background(
            "task-404",
            |_token| async { Ok::<_, String>(ToolOutput::text("x")) },
            Duration::from_secs(1),
        )
        .await;
    assert!(result.is_err());
}

struct CountingSpawner {
    spawned: StdMutex<usize>,
}

impl DetachedSpawner for CountingSpawner {
    fn spawn(&self, fut: BoxFuture<'static, ()>) {
        *self.spawned.lock().unwrap() += 1;
        tokio::spawn(fut);
    }
}

#[tokio::test]
async fn test_custom_spawner_is_used() {
    let spawner = Arc::new(CountingSpawner {
        spawned: StdMutex::new(0),
    });
    let store = TaskStore::with_spawner(spawner.clone());
    let task = store.create("t", json!({}), "c").await;

    store
        .run_in_background(
            &task.id,
            |_token| async { Ok::<_, String>(ToolOutput::text("x")) },
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(*spawner.spawned.lock().unwrap(), 1);
    let task = wait_terminal(&store, &task.id).await;
    assert_eq!(task.status, TaskStatus::Completed);
}
