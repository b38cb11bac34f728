use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_error_output_fails() {
    assert_eq!(
        detect_failure(&ToolOutput::error("disk full")),
        Some("disk full".to_string())
    );
    assert_eq!(
        detect_failure(&ToolOutput::error("")),
        Some("tool reported an error".to_string())
    );
}

#[test]
fn test_structured_error_field() {
    let output = ToolOutput::structured(json!({"error": "no such file"}));
    assert_eq!(detect_failure(&output), Some("no such file".to_string()));

    let output = ToolOutput::structured(json!({"error": "", "data": 1}));
    assert_eq!(detect_failure(&output), None);

    let output = ToolOutput::structured(json!({"error": null}));
    assert_eq!(detect_failure(&output), None);
}

#[test]
fn test_command_shaped_failure() {
    let output = ToolOutput::structured(json!({
        "success": false,
        "exit_code": 2,
        "stdout": "",
        "stderr": "ls: cannot access 'x'"
    }));
    assert_eq!(
        detect_failure(&output),
        Some("ls: cannot access 'x'".to_string())
    );

    let output = ToolOutput::structured(json!({"success": false, "exit_code": 7, "stderr": ""}));
    assert_eq!(detect_failure(&output), Some("exit code 7".to_string()));
}

#[test]
fn test_non_conforming_shapes_succeed() {
    assert_eq!(detect_failure(&ToolOutput::text("exit code 1")), None);
    assert_eq!(
        detect_failure(&ToolOutput::structured(json!(["success", false]))),
        None
    );
    assert_eq!(
        detect_failure(&ToolOutput::structured(json!({"success": "false"}))),
        None
    );
    assert_eq!(
        detect_failure(&ToolOutput::structured(json!({"success": true, "exit_code": 0}))),
        None
    );
}
