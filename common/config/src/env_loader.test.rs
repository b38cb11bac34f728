use super::*;
use pretty_assertions::assert_eq;

fn loader(pairs: &[(&str, &str)]) -> EnvLoader {
    EnvLoader::from_vars(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

#[test]
fn test_no_vars_leaves_defaults() {
    let mut config = RuntimeConfig::default();
    loader(&[]).apply(&mut config);
    assert_eq!(config, RuntimeConfig::default());
}

#[test]
fn test_tool_overrides() {
    let mut config = RuntimeConfig::default();
    loader(&[
        (ENV_MAX_DURATION_MS, "5000"),
        (ENV_MAX_BACKGROUND_DURATION_MS, "60000"),
        (ENV_ALLOW_BACKGROUND, "yes"),
        (ENV_MAX_OUTPUT_TOKENS, "0"),
    ])
    .apply(&mut config);

    assert_eq!(config.default_tool.max_duration_ms, 5000);
    assert_eq!(config.default_tool.max_background_duration_ms, 60000);
    assert!(config.default_tool.allow_background);
    assert_eq!(config.default_tool.max_output_tokens, None);
}

#[test]
fn test_store_and_terminal_overrides() {
    let mut config = RuntimeConfig::default();
    loader(&[
        (ENV_TASK_RETENTION_MS, "10"),
        (ENV_OUTPUT_RETENTION_MS, "20"),
        (ENV_TERMINAL_SHELL, "/bin/zsh"),
        (ENV_TERMINAL_IDLE_TTL_MS, "30"),
        (ENV_TERMINAL_MAX_BUFFER_ENTRIES, "40"),
        (ENV_LOG_LEVEL, "debug"),
    ])
    .apply(&mut config);

    assert_eq!(config.tasks.retention_ms, 10);
    assert_eq!(config.outputs.retention_ms, 20);
    assert_eq!(config.terminal.shell.as_deref(), Some("/bin/zsh"));
    assert_eq!(config.terminal.idle_ttl_ms, 30);
    assert_eq!(config.terminal.max_buffer_entries, 40);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_unparseable_values_ignored() {
    let mut config = RuntimeConfig::default();
    loader(&[
        (ENV_MAX_DURATION_MS, "soon"),
        (ENV_ALLOW_BACKGROUND, "maybe"),
        (ENV_TERMINAL_SHELL, "   "),
    ])
    .apply(&mut config);

    assert_eq!(config, RuntimeConfig::default());
}
