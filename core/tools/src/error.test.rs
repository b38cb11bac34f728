use super::*;
use pretty_assertions::assert_eq;
use toolrun_tasks::TaskStore;

#[tokio::test]
async fn test_task_not_found_converts() {
    let store = TaskStore::new();
    let err: ToolError = store.cancel("task-9").await.unwrap_err().into();
    assert!(matches!(err, ToolError::TaskNotFound { ref task_id, .. } if task_id == "task-9"));
    assert_eq!(err.status_code(), StatusCode::TaskNotFound);
    assert!(err.is_not_found());
}

#[test]
fn test_status_codes() {
    let err = tool_error::TimeoutSnafu { timeout_ms: 100i64 }.build();
    assert_eq!(err.status_code(), StatusCode::Timeout);
    assert!(err.is_timeout());
    assert_eq!(err.to_string(), "Timed out after 100ms");

    let err = tool_error::CancelledSnafu.build();
    assert_eq!(err.status_code(), StatusCode::Cancelled);
    assert!(err.is_cancelled());
    assert!(!err.is_timeout());

    let err = tool_error::BackgroundNotAllowedSnafu { tool_name: "edit" }.build();
    assert_eq!(err.status_code(), StatusCode::NotPermittedByConfig);
    assert!(!err.is_not_found());
}

#[test]
fn test_json_error_is_invalid_input() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: ToolError = json_err.into();
    assert_eq!(err.status_code(), StatusCode::InvalidArguments);
}
