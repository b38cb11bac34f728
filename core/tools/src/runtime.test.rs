use super::*;
use crate::FnTool;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::PathBuf;
use toolrun_protocol::TaskStatus;
use toolrun_protocol::ToolCallConfig;
use toolrun_terminal::testing::FakeBackend;

fn runtime_with(config: RuntimeConfig) -> ToolRuntime {
    ToolRuntime::new(config, Arc::new(FakeBackend::new()))
}

fn ctx() -> ToolContext {
    ToolContext::new("call-1", "session-1", PathBuf::from("/tmp"))
}

fn slow_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "slow",
        "Sleep, then report",
        json!({"type": "object", "properties": {}}),
        |_input, _ctx| async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok(ToolOutput::text("finished"))
        },
    ))
}

#[test]
fn test_builtins_registered() {
    let runtime = runtime_with(RuntimeConfig::default());
    let names = runtime.registry().names();
    for expected in [
        "cancel_task",
        "get_task",
        "list_tasks",
        "read_output",
        "shell",
        "terminal_close",
        "terminal_exec",
        "terminal_list",
        "terminal_open",
        "terminal_read",
        "terminal_resize",
        "terminal_write",
    ] {
        assert!(names.contains(&expected.to_string()), "missing {expected}");
    }
}

#[test]
fn test_registered_tool_uses_its_config() {
    let mut config = RuntimeConfig::default();
    config.tools.insert(
        "slow".to_string(),
        ToolCallConfig {
            allow_background: true,
            ..Default::default()
        },
    );
    let mut runtime = runtime_with(config);
    runtime.register(slow_tool());

    let definition = runtime
        .definitions()
        .into_iter()
        .find(|d| d.name == "slow")
        .unwrap();
    assert_eq!(
        definition.input_schema["properties"]["background"]["type"],
        "boolean"
    );

    let exec = runtime
        .definitions()
        .into_iter()
        .find(|d| d.name == "terminal_exec")
        .unwrap();
    assert!(exec.input_schema["properties"].get("background").is_none());
}

#[tokio::test]
async fn test_promotion_round_trip_through_get_task() {
    let mut config = RuntimeConfig::default();
    config.tools.insert(
        "slow".to_string(),
        ToolCallConfig {
            max_duration_ms: 50,
            allow_background: true,
            ..Default::default()
        },
    );
    let mut runtime = runtime_with(config);
    runtime.register(slow_tool());

    let handle = runtime.execute("slow", json!({}), &mut ctx()).await.unwrap();
    let task_id = handle.content.as_structured().unwrap()["task_id"]
        .as_str()
        .unwrap()
        .to_string();

    let snapshot = runtime
        .execute(
            "get_task",
            json!({"task_id": task_id, "wait_for_completion": true, "poll_interval_ms": 10}),
            &mut ctx(),
        )
        .await
        .unwrap();
    let snapshot = snapshot.content.as_structured().unwrap();
    assert_eq!(snapshot["status"], "completed");
    assert_eq!(snapshot["result"]["content"], "finished");
}

#[tokio::test]
async fn test_oversized_result_readable_through_read_output() {
    let mut config = RuntimeConfig::default();
    config.tools.insert(
        "big".to_string(),
        ToolCallConfig {
            max_output_tokens: Some(10),
            ..Default::default()
        },
    );
    let mut runtime = runtime_with(config);
    let full = "line\n".repeat(100);
    let body = full.clone();
    runtime.register(Arc::new(FnTool::new(
        "big",
        "Large output",
        json!({"type": "object"}),
        move |_input, _ctx| {
            let body = body.clone();
            async move { Ok(ToolOutput::text(body)) }
        },
    )));

    let truncated = runtime.execute("big", json!({}), &mut ctx()).await.unwrap();
    let payload = truncated.content.as_structured().unwrap();
    assert_eq!(payload["content"].as_str().unwrap().len(), 30);
    let output_id = payload["output_id"].as_str().unwrap();

    let page = runtime
        .execute(
            "read_output",
            json!({"output_id": output_id, "offset": 0, "limit": 500}),
            &mut ctx(),
        )
        .await
        .unwrap();
    let page = page.content.as_structured().unwrap();
    assert_eq!(page["content"], full);
    assert_eq!(page["has_more"], false);
}

#[tokio::test]
async fn test_terminal_exec_through_runtime() {
    let runtime = runtime_with(RuntimeConfig::default());

    let mut first = ctx();
    let mut second = ctx();
    let (a, b) = tokio::join!(
        runtime.execute(
            "terminal_exec",
            json!({"session_id": "t1", "command": "echo A"}),
            &mut first
        ),
        runtime.execute(
            "terminal_exec",
            json!({"session_id": "t1", "command": "echo B"}),
            &mut second
        ),
    );
    assert_eq!(a.unwrap().content.as_structured().unwrap()["output"], "A");
    assert_eq!(b.unwrap().content.as_structured().unwrap()["output"], "B");

    let read = runtime
        .execute("terminal_read", json!({"session_id": "t1", "offset": 0}), &mut ctx())
        .await
        .unwrap();
    assert_eq!(read.content.as_structured().unwrap()["output"], "A\nB\n");
}

#[tokio::test]
async fn test_sweep_respects_retention() {
    let mut config = RuntimeConfig::default();
    config.tasks.retention_ms = 0;
    config.outputs.retention_ms = 0;
    let runtime = runtime_with(config);

    let done = runtime.tasks().create("shell", json!({}), "call-1").await;
    runtime
        .tasks()
        .update(&done.id, toolrun_tasks::TaskUpdate::completed(ToolOutput::text("ok")))
        .await;
    let live = runtime.tasks().create("shell", json!({}), "call-2").await;
    runtime
        .outputs()
        .store("x".to_string(), crate::OutputMeta::default())
        .await;

    // Sweeping happens before the call itself.
    runtime.execute("list_tasks", json!({}), &mut ctx()).await.unwrap();

    assert!(runtime.tasks().get(&done.id).await.is_none());
    assert_eq!(
        runtime.tasks().get(&live.id).await.unwrap().status,
        TaskStatus::Pending
    );
    assert!(runtime.outputs().is_empty().await);
}

#[tokio::test]
async fn test_unknown_tool() {
    let runtime = runtime_with(RuntimeConfig::default());
    let err = runtime
        .execute("nope", json!({}), &mut ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, crate::ToolError::ToolNotFound { .. }));
}

#[tokio::test]
async fn test_shutdown_cancels_live_tasks() {
    let runtime = runtime_with(RuntimeConfig::default());
    let task = runtime.tasks().create("shell", json!({}), "call-1").await;
    runtime
        .execute("terminal_open", json!({"session_id": "t1"}), &mut ctx())
        .await
        .unwrap();

    runtime.shutdown().await;

    assert_eq!(
        runtime.tasks().get(&task.id).await.unwrap().status,
        TaskStatus::Cancelled
    );
    assert!(runtime.terminals().list().await.is_empty());
}

#[tokio::test]
async fn test_cancel_task_releases_terminal_session() {
    let mut config = RuntimeConfig::default();
    config.tools.insert(
        "terminal_exec".to_string(),
        ToolCallConfig {
            allow_background: true,
            ..Default::default()
        },
    );
    let runtime = runtime_with(config);

    let handle = runtime
        .execute(
            "terminal_exec",
            json!({"session_id": "t1", "command": "sleep 1500", "background": true}),
            &mut ctx(),
        )
        .await
        .unwrap();
    let task_id = handle.content.as_structured().unwrap()["task_id"]
        .as_str()
        .unwrap()
        .to_string();
    tokio::time::sleep(Duration::from_millis(50)).await;

    runtime
        .execute("cancel_task", json!({"task_id": task_id}), &mut ctx())
        .await
        .unwrap();

    let start = std::time::Instant::now();
    let next = runtime
        .execute(
            "terminal_exec",
            json!({"session_id": "t1", "command": "echo after"}),
            &mut ctx(),
        )
        .await
        .unwrap();
    assert!(start.elapsed() < Duration::from_millis(1000));
    assert_eq!(next.content.as_structured().unwrap()["exit_code"], 0);
    assert_eq!(runtime.terminals().list().await[0].active_commands, 0);
    assert_eq!(
        runtime.tasks().get(&task_id).await.unwrap().status,
        TaskStatus::Cancelled
    );
}
