use super::*;
use crate::FnTool;
use crate::error::ToolError;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use toolrun_protocol::TaskStatus;

/// Sleeps for `sleep_ms`, then echoes its input. Stops early with
/// `Cancelled` when its token fires.
fn sleeper(calls: Arc<AtomicUsize>) -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "sleeper",
        "Sleep, then echo",
        json!({"type": "object", "properties": {"sleep_ms": {"type": "integer"}}}),
        move |input: Value, ctx: ToolContext| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let ms = input["sleep_ms"].as_u64().unwrap_or(0);
                tokio::select! {
                    _ = ctx.cancel_token.cancelled() => tool_error::CancelledSnafu.fail(),
                    _ = tokio::time::sleep(Duration::from_millis(ms)) => {
                        Ok(ToolOutput::structured(input))
                    }
                }
            }
        },
    ))
}

fn failing() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "failing",
        "Always fails",
        json!({"type": "object"}),
        |_input, _ctx| async move {
            tool_error::ExecutionFailedSnafu {
                message: "disk full",
            }
            .fail()
        },
    ))
}

/// Command-shaped failure with a long stdout, after `sleep_ms`.
fn noisy_failure() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "noisy",
        "Fails with lots of output",
        json!({"type": "object"}),
        |input: Value, _ctx| async move {
            let ms = input["sleep_ms"].as_u64().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(ToolOutput::structured(json!({
                "success": false,
                "exit_code": 2,
                "stdout": "x".repeat(500),
                "stderr": "boom"
            })))
        },
    ))
}

fn config(max_duration_ms: i64, allow_background: bool) -> ToolCallConfig {
    ToolCallConfig {
        max_duration_ms,
        allow_background,
        max_output_tokens: None,
        ..Default::default()
    }
}

fn wrap(inner: Arc<dyn Tool>, config: ToolCallConfig) -> (WrappedTool, TaskStore, OutputStore) {
    let tasks = TaskStore::new();
    let outputs = OutputStore::new();
    let tool = WrappedTool::new(inner, config, tasks.clone(), outputs.clone());
    (tool, tasks, outputs)
}

fn ctx() -> ToolContext {
    ToolContext::new("call-1", "session-1", PathBuf::from("/tmp"))
}

fn handle_task_id(output: &ToolOutput) -> String {
    let payload = output.content.as_structured().unwrap();
    assert_eq!(payload["status"], "running");
    payload["task_id"].as_str().unwrap().to_string()
}

async fn wait(tasks: &TaskStore, task_id: &str) -> toolrun_tasks::BackgroundTask {
    tasks
        .wait_for_completion(task_id, Duration::from_millis(10), Duration::from_secs(5))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_foreground_success_passes_through() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (tool, tasks, _) = wrap(sleeper(calls.clone()), config(1_000, false));

    let output = tool
        .execute(json!({"sleep_ms": 1, "timeout": 500}), &mut ctx())
        .await
        .unwrap();
    assert_eq!(output, ToolOutput::structured(json!({"sleep_ms": 1})));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(tasks.list(None).await.is_empty());
}

#[tokio::test]
async fn test_timeout_without_background_fails() {
    let (tool, tasks, _) = wrap(sleeper(Arc::new(AtomicUsize::new(0))), config(100, false));

    let start = Instant::now();
    let err = tool
        .execute(json!({"sleep_ms": 500}), &mut ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Timeout { timeout_ms: 100, .. }));
    assert!(start.elapsed() < Duration::from_millis(400));
    assert!(tasks.list(None).await.is_empty());
}

#[tokio::test]
async fn test_requested_timeout_is_capped() {
    let (tool, _, _) = wrap(sleeper(Arc::new(AtomicUsize::new(0))), config(100, false));

    let err = tool
        .execute(json!({"sleep_ms": 500, "timeout": 60_000}), &mut ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Timeout { timeout_ms: 100, .. }));

    let err = tool
        .execute(json!({"sleep_ms": 500, "timeoutMs": 20}), &mut ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Timeout { timeout_ms: 20, .. }));
}

#[tokio::test]
async fn test_timeout_promotes_same_execution() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (tool, tasks, _) = wrap(sleeper(calls.clone()), config(100, true));

    let start = Instant::now();
    let output = tool
        .execute(json!({"sleep_ms": 500}), &mut ctx())
        .await
        .unwrap();
    assert!(start.elapsed() < Duration::from_millis(400));
    let task_id = handle_task_id(&output);

    let task = wait(&tasks, &task_id).await;
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(
        task.result,
        Some(ToolOutput::structured(json!({"sleep_ms": 500})))
    );
    assert_eq!(task.args, json!({"sleep_ms": 500}));
    assert_eq!(task.call_id, "call-1");
    // The in-flight execution moved; it was never restarted.
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_promoted_execution_ignores_request_cancellation() {
    let (tool, tasks, _) = wrap(sleeper(Arc::new(AtomicUsize::new(0))), config(50, true));
    let request = CancellationToken::new();
    let mut ctx = ctx().with_request_token(request.clone());

    let output = tool
        .execute(json!({"sleep_ms": 200}), &mut ctx)
        .await
        .unwrap();
    let task_id = handle_task_id(&output);
    request.cancel();

    let task = wait(&tasks, &task_id).await;
    assert_eq!(task.status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_cancel_task_reaches_promoted_execution() {
    let (tool, tasks, _) = wrap(sleeper(Arc::new(AtomicUsize::new(0))), config(50, true));

    let output = tool
        .execute(json!({"sleep_ms": 10_000}), &mut ctx())
        .await
        .unwrap();
    let task_id = handle_task_id(&output);

    let outcome = tasks.cancel(&task_id).await.unwrap();
    assert!(outcome.cancelled);
    assert_eq!(outcome.previous_status, TaskStatus::Running);

    let task = wait(&tasks, &task_id).await;
    assert_eq!(task.status, TaskStatus::Cancelled);
}

#[tokio::test]
async fn test_caller_cancellation() {
    let (tool, tasks, _) = wrap(sleeper(Arc::new(AtomicUsize::new(0))), config(5_000, true));
    let caller = CancellationToken::new();
    let mut ctx = ctx().with_cancel_token(caller.clone());

    let cancel = caller.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let start = Instant::now();
    let err = tool
        .execute(json!({"sleep_ms": 5_000}), &mut ctx)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(start.elapsed() < Duration::from_secs(2));
    assert!(tasks.list(None).await.is_empty());
}

#[tokio::test]
async fn test_business_failure_passes_through() {
    let (tool, _, _) = wrap(failing(), config(1_000, true));

    let err = tool.execute(json!({}), &mut ctx()).await.unwrap_err();
    assert!(matches!(err, ToolError::ExecutionFailed { ref message, .. } if message == "disk full"));
}

#[tokio::test]
async fn test_background_not_allowed() {
    let (tool, tasks, _) = wrap(sleeper(Arc::new(AtomicUsize::new(0))), config(1_000, false));

    let err = tool
        .execute(json!({"background": true}), &mut ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::BackgroundNotAllowed { .. }));
    assert!(tasks.list(None).await.is_empty());
}

#[tokio::test]
async fn test_background_returns_handle_immediately() {
    let (tool, tasks, _) = wrap(sleeper(Arc::new(AtomicUsize::new(0))), config(1_000, true));

    let start = Instant::now();
    let output = tool
        .execute(json!({"sleep_ms": 200, "background": true}), &mut ctx())
        .await
        .unwrap();
    assert!(start.elapsed() < Duration::from_millis(150));
    let task_id = handle_task_id(&output);

    let task = wait(&tasks, &task_id).await;
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.args, json!({"sleep_ms": 200}));
}

#[tokio::test]
async fn test_background_failure_recorded_on_task() {
    let (tool, tasks, _) = wrap(failing(), config(1_000, true));

    let output = tool
        .execute(json!({"background": true}), &mut ctx())
        .await
        .unwrap();
    let task_id = handle_task_id(&output);

    let task = wait(&tasks, &task_id).await;
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.error.as_deref(), Some("Execution failed: disk full"));
}

#[tokio::test]
async fn test_oversized_output_truncated() {
    let mut config = config(1_000, false);
    config.max_output_tokens = Some(2);
    let (tool, _, outputs) = wrap(sleeper(Arc::new(AtomicUsize::new(0))), config);

    let output = tool
        .execute(json!({"sleep_ms": 0, "padding": "x".repeat(100)}), &mut ctx())
        .await
        .unwrap();
    let payload = output.content.as_structured().unwrap();
    assert_eq!(payload["truncated"], true);
    assert_eq!(payload["content"].as_str().unwrap().chars().count(), 6);

    let stored = outputs.get_all().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].tool_name, "sleeper");
}

#[tokio::test]
async fn test_background_failure_judged_before_truncation() {
    let mut config = config(1_000, true);
    config.max_output_tokens = Some(10);
    let (tool, tasks, outputs) = wrap(noisy_failure(), config);

    let output = tool
        .execute(json!({"background": true}), &mut ctx())
        .await
        .unwrap();
    let task_id = handle_task_id(&output);

    let task = wait(&tasks, &task_id).await;
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.error.as_deref(), Some("boom"));
    assert!(outputs.is_empty().await);
}

#[tokio::test]
async fn test_promoted_failure_judged_before_truncation() {
    let mut config = config(50, true);
    config.max_output_tokens = Some(10);
    let (tool, tasks, _) = wrap(noisy_failure(), config);

    let output = tool
        .execute(json!({"sleep_ms": 200}), &mut ctx())
        .await
        .unwrap();
    let task_id = handle_task_id(&output);

    let task = wait(&tasks, &task_id).await;
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.error.as_deref(), Some("boom"));
    assert_eq!(
        task.logs,
        vec![
            "promoted after 50ms in the foreground".to_string(),
            "started".to_string(),
            "failed: boom".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_promoted_result_truncated_on_task() {
    let mut config = config(50, true);
    config.max_output_tokens = Some(2);
    let (tool, tasks, outputs) = wrap(sleeper(Arc::new(AtomicUsize::new(0))), config);

    let output = tool
        .execute(json!({"sleep_ms": 200, "padding": "x".repeat(100)}), &mut ctx())
        .await
        .unwrap();
    let task_id = handle_task_id(&output);

    let task = wait(&tasks, &task_id).await;
    assert_eq!(task.status, TaskStatus::Completed);
    let result = task.result.unwrap();
    let payload = result.content.as_structured().unwrap();
    assert_eq!(payload["truncated"], true);
    assert_eq!(outputs.len().await, 1);
}

#[test]
fn test_schema_and_identity() {
    let (tool, _, _) = wrap(sleeper(Arc::new(AtomicUsize::new(0))), config(1_000, true));

    assert_eq!(tool.name(), "sleeper");
    assert_eq!(tool.description(), "Sleep, then echo");
    let schema = tool.input_schema();
    assert_eq!(schema["properties"]["sleep_ms"]["type"], "integer");
    assert_eq!(schema["properties"]["timeout"]["type"], "number");
    assert_eq!(schema["properties"]["background"]["type"], "boolean");
}
