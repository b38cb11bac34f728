use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_split_strips_options() {
    let (options, args) = ExecutionOptions::split(json!({
        "command": "ls",
        "timeout": 5000,
        "background": true,
    }));
    assert_eq!(
        options,
        ExecutionOptions {
            timeout_ms: Some(5000),
            background: true,
        }
    );
    assert_eq!(args, json!({"command": "ls"}));
}

#[test]
fn test_timeout_wins_over_aliases() {
    let (options, args) = ExecutionOptions::split(json!({
        "timeout_ms": 1,
        "timeoutMs": 2,
        "timeout": 3,
    }));
    assert_eq!(options.timeout_ms, Some(3));
    assert_eq!(args, json!({}));

    let (options, _) = ExecutionOptions::split(json!({"timeoutMs": 2, "timeout_ms": 1}));
    assert_eq!(options.timeout_ms, Some(2));

    let (options, _) = ExecutionOptions::split(json!({"timeout_ms": 1}));
    assert_eq!(options.timeout_ms, Some(1));
}

#[test]
fn test_split_lenient_values() {
    let (options, _) = ExecutionOptions::split(json!({"timeout": "250", "background": "TRUE"}));
    assert_eq!(options.timeout_ms, Some(250));
    assert!(options.background);

    let (options, _) = ExecutionOptions::split(json!({"timeout": 1.9, "background": 1}));
    assert_eq!(options.timeout_ms, Some(1));
    assert!(!options.background);

    let (options, _) = ExecutionOptions::split(json!({"timeout": "soon", "timeout_ms": 7}));
    assert_eq!(options.timeout_ms, Some(7));
}

#[test]
fn test_split_non_object_passes_through() {
    let (options, args) = ExecutionOptions::split(json!("raw"));
    assert_eq!(options, ExecutionOptions::default());
    assert_eq!(args, json!("raw"));
}

#[test]
fn test_augment_schema_adds_enabled_options() {
    let base = json!({
        "type": "object",
        "properties": {"command": {"type": "string"}},
        "required": ["command"],
    });
    let config = ToolCallConfig {
        allow_background: true,
        ..Default::default()
    };

    let schema = augment_schema(&base, &config);
    assert_eq!(schema["properties"]["timeout"]["type"], "number");
    assert_eq!(schema["properties"]["background"]["type"], "boolean");
    assert_eq!(schema["properties"]["command"]["type"], "string");
    assert_eq!(schema["required"], json!(["command"]));
    // The base schema is rebuilt, not modified.
    assert!(base["properties"].get("timeout").is_none());
}

#[test]
fn test_augment_schema_respects_config() {
    let config = ToolCallConfig {
        allow_agent_set_duration: false,
        allow_background: false,
        ..Default::default()
    };
    let schema = augment_schema(&json!({"type": "object"}), &config);
    assert_eq!(schema, json!({"type": "object", "properties": {}}));
}
