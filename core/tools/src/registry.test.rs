use super::*;
use crate::FnTool;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn echo(name: &str) -> FnTool {
    FnTool::new(
        name,
        "Echo the input",
        serde_json::json!({"type": "object", "properties": {}}),
        |input, _ctx| async move { Ok(ToolOutput::structured(input)) },
    )
}

fn ctx() -> ToolContext {
    ToolContext::new("call-1", "session-1", PathBuf::from("/tmp"))
}

#[tokio::test]
async fn test_execute_by_name() {
    let mut registry = ToolRegistry::new();
    registry.register(echo("echo"));

    let output = registry
        .execute("echo", serde_json::json!({"a": 1}), &mut ctx())
        .await
        .unwrap();
    assert_eq!(output, ToolOutput::structured(serde_json::json!({"a": 1})));
}

#[tokio::test]
async fn test_unknown_tool() {
    let registry = ToolRegistry::new();
    let err = registry
        .execute("missing", serde_json::json!({}), &mut ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, crate::ToolError::ToolNotFound { ref name, .. } if name == "missing"));
}

#[test]
fn test_register_replaces_and_sorts() {
    let mut registry = ToolRegistry::new();
    assert!(registry.register(echo("b")).is_none());
    assert!(registry.register(echo("a")).is_none());
    assert!(registry.register(echo("b")).is_some());

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);
    let defs = registry.definitions();
    assert_eq!(defs[0].name, "a");
    assert_eq!(defs[0].description, "Echo the input");
}
