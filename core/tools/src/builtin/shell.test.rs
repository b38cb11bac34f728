use super::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::time::Duration;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

fn ctx() -> ToolContext {
    ToolContext::new("call-1", "session-1", std::env::temp_dir())
}

#[cfg(unix)]
#[tokio::test]
async fn test_runs_command() {
    let tool = ShellCommandTool::default();
    let output = tool
        .execute(json!({"command": "echo out; echo err >&2"}), &mut ctx())
        .await
        .unwrap();
    assert_eq!(
        output.content.as_structured().unwrap(),
        &json!({"success": true, "exit_code": 0, "stdout": "out\n", "stderr": "err\n"})
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_non_zero_exit_is_a_result() {
    let tool = ShellCommandTool::default();
    let output = tool
        .execute(json!({"command": "exit 3"}), &mut ctx())
        .await
        .unwrap();
    let value = output.content.as_structured().unwrap();
    assert_eq!(value["success"], false);
    assert_eq!(value["exit_code"], 3);
    assert_eq!(
        toolrun_tasks::detect_failure(&output).as_deref(),
        Some("exit code 3")
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_cancellation_stops_command() {
    let tool = ShellCommandTool::default();
    let token = CancellationToken::new();
    let mut ctx = ctx().with_cancel_token(token.clone());

    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let start = Instant::now();
    let err = tool
        .execute(json!({"command": "sleep 10"}), &mut ctx)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_missing_command_is_invalid() {
    let tool = ShellCommandTool::default();
    let err = tool.execute(json!({}), &mut ctx()).await.unwrap_err();
    assert!(matches!(err, crate::ToolError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_bad_cwd_fails_to_spawn() {
    let tool = ShellCommandTool::default();
    let mut ctx = ToolContext::new("call-1", "session-1", PathBuf::from("/definitely/not/here"));
    let err = tool
        .execute(json!({"command": "true"}), &mut ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, crate::ToolError::ExecutionFailed { .. }));
}
