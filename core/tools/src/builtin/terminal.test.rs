use super::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use toolrun_protocol::TerminalConfig;
use toolrun_terminal::testing::FakeBackend;

fn terminals() -> Arc<SessionMultiplexer> {
    Arc::new(SessionMultiplexer::new(
        Arc::new(FakeBackend::new()),
        TerminalConfig::default(),
    ))
}

fn ctx() -> ToolContext {
    ToolContext::new("call-1", "session-1", PathBuf::from("/tmp"))
}

fn structured(output: &ToolOutput) -> &Value {
    output.content.as_structured().unwrap()
}

#[tokio::test]
async fn test_open_exec_read_close() {
    let terminals = terminals();
    let open = TerminalOpenTool::new(terminals.clone());
    let exec = TerminalExecTool::new(terminals.clone());
    let read = TerminalReadTool::new(terminals.clone());
    let close = TerminalCloseTool::new(terminals.clone());

    let opened = open
        .execute(json!({"session_id": "t1", "cols": 100, "rows": 30}), &mut ctx())
        .await
        .unwrap();
    assert_eq!(structured(&opened), &json!({"session_id": "t1"}));

    let ran = exec
        .execute(json!({"session_id": "t1", "command": "echo hi"}), &mut ctx())
        .await
        .unwrap();
    assert_eq!(
        structured(&ran),
        &json!({"session_id": "t1", "success": true, "exit_code": 0, "output": "hi"})
    );

    let buffered = read
        .execute(json!({"session_id": "t1"}), &mut ctx())
        .await
        .unwrap();
    assert_eq!(structured(&buffered)["output"], "hi\n");
    assert_eq!(structured(&buffered)["closed"], false);

    close
        .execute(json!({"session_id": "t1"}), &mut ctx())
        .await
        .unwrap();
    let err = read
        .execute(json!({"session_id": "t1"}), &mut ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, crate::ToolError::SessionNotFound { .. }));
}

#[tokio::test]
async fn test_open_generates_id() {
    let terminals = terminals();
    let open = TerminalOpenTool::new(terminals.clone());

    let opened = open.execute(json!({}), &mut ctx()).await.unwrap();
    let id = structured(&opened)["session_id"].as_str().unwrap().to_string();
    assert!(id.starts_with("term-"));
    assert_eq!(terminals.list().await.len(), 1);
}

#[tokio::test]
async fn test_exec_failure_reported_in_result() {
    let exec = TerminalExecTool::new(terminals());

    let ran = exec
        .execute(json!({"session_id": "t1", "command": "false"}), &mut ctx())
        .await
        .unwrap();
    assert_eq!(structured(&ran)["success"], false);
    assert_eq!(structured(&ran)["exit_code"], 1);
}

#[tokio::test]
async fn test_write_resize_list() {
    let terminals = terminals();
    let write = TerminalWriteTool::new(terminals.clone());
    let resize = TerminalResizeTool::new(terminals.clone());
    let list = TerminalListTool::new(terminals.clone());

    let written = write
        .execute(json!({"session_id": "t1", "data": "echo x\n"}), &mut ctx())
        .await
        .unwrap();
    assert_eq!(structured(&written)["bytes_written"], 7);

    resize
        .execute(json!({"session_id": "t1", "cols": 90, "rows": 20}), &mut ctx())
        .await
        .unwrap();

    let listed = list.execute(json!({}), &mut ctx()).await.unwrap();
    let listed = structured(&listed);
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["sessions"][0]["id"], "t1");
    assert_eq!(listed["sessions"][0]["cols"], 90);
    assert_eq!(listed["sessions"][0]["rows"], 20);
}

#[tokio::test]
async fn test_invalid_arguments() {
    let terminals = terminals();
    let resize = TerminalResizeTool::new(terminals.clone());
    let err = resize
        .execute(json!({"session_id": "t1", "cols": 90}), &mut ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, crate::ToolError::InvalidInput { .. }));

    let close = TerminalCloseTool::new(terminals);
    let err = close
        .execute(json!({"session_id": "nope"}), &mut ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, crate::ToolError::SessionNotFound { .. }));
}
