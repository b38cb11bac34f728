use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_tool_output_constructors() {
    let output = ToolOutput::text("hello");
    assert_eq!(output.content, ToolResultContent::Text("hello".to_string()));
    assert!(!output.is_error);

    let output = ToolOutput::error("boom");
    assert!(output.is_error);
    assert_eq!(output.to_text(), "boom");

    let output = ToolOutput::structured(json!({"a": 1}));
    assert_eq!(output.content.as_structured(), Some(&json!({"a": 1})));
}

#[test]
fn test_structured_to_text_is_stable() {
    let a = ToolOutput::structured(json!({"zeta": 1, "alpha": [1, 2]}));
    let b = ToolOutput::structured(json!({"alpha": [1, 2], "zeta": 1}));
    assert_eq!(a.to_text(), b.to_text());
    assert_eq!(a.to_text(), r#"{"alpha":[1,2],"zeta":1}"#);
}

#[test]
fn test_content_untagged_serde() {
    let output: ToolOutput = serde_json::from_value(json!({"content": "plain"})).unwrap();
    assert_eq!(output, ToolOutput::text("plain"));

    let output: ToolOutput =
        serde_json::from_value(json!({"content": {"success": true}, "is_error": false})).unwrap();
    assert_eq!(output, ToolOutput::structured(json!({"success": true})));
}
