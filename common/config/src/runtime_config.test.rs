use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_tool_config_falls_back_to_default() {
    let mut config = RuntimeConfig::default();
    config.tools.insert(
        "shell".to_string(),
        ToolCallConfig {
            allow_background: true,
            ..Default::default()
        },
    );

    assert!(config.tool_config("shell").allow_background);
    assert_eq!(config.tool_config("edit"), config.default_tool);
}

#[test]
fn test_default_config_is_valid() {
    assert!(RuntimeConfig::default().validate().is_ok());
}

#[test]
fn test_validate_rejects_negative_duration() {
    let mut config = RuntimeConfig::default();
    config.tools.insert(
        "shell".to_string(),
        ToolCallConfig {
            max_duration_ms: -1,
            ..Default::default()
        },
    );

    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("tools.shell.max_duration_ms"));
}

#[test]
fn test_validate_rejects_zero_buffer() {
    let mut config = RuntimeConfig::default();
    config.terminal.max_buffer_entries = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_deserialize_partial() {
    let json = r#"{
        "tools": { "shell": { "allow_background": true } },
        "terminal": { "idle_ttl_ms": 1000 }
    }"#;
    let config: RuntimeConfig = serde_json::from_str(json).unwrap();
    assert!(config.tools["shell"].allow_background);
    assert_eq!(config.terminal.idle_ttl_ms, 1000);
    assert_eq!(config.tasks, TaskStoreConfig::default());
    assert_eq!(config.logging, LoggingConfig::default());
}
