use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_empty_json_uses_defaults() {
    let tasks: TaskStoreConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(tasks, TaskStoreConfig::default());

    let outputs: OutputStoreConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(outputs, OutputStoreConfig::default());

    let terminal: TerminalConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(terminal, TerminalConfig::default());
}

#[test]
fn test_partial_terminal_config() {
    let terminal: TerminalConfig =
        serde_json::from_str(r#"{"shell": "/bin/bash", "max_buffer_entries": 8}"#).unwrap();
    assert_eq!(terminal.resolved_shell(), "/bin/bash");
    assert_eq!(terminal.buffer_capacity(), 8);
    assert_eq!(terminal.idle_ttl_ms, DEFAULT_IDLE_TTL_MS);
}

#[test]
fn test_buffer_capacity_is_at_least_one() {
    let terminal = TerminalConfig {
        max_buffer_entries: 0,
        ..Default::default()
    };
    assert_eq!(terminal.buffer_capacity(), 1);
}
