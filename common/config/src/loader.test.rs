use super::*;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) {
    std::fs::write(dir.path().join(CONFIG_FILE), content).unwrap();
}

fn no_env() -> EnvLoader {
    EnvLoader::from_vars(HashMap::new())
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let loader = ConfigLoader::from_path(dir.path());

    let config = loader.load_with_env(&no_env()).unwrap();
    assert_eq!(config, RuntimeConfig::default());
}

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        r#"{"tools": {"shell": {"max_duration_ms": 5000, "allow_background": true}}}"#,
    );
    let loader = ConfigLoader::from_path(dir.path());

    let config = loader.load_with_env(&no_env()).unwrap();
    let shell = config.tool_config("shell");
    assert_eq!(shell.max_duration_ms, 5000);
    assert!(shell.allow_background);
}

#[test]
fn test_env_overrides_file() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, r#"{"terminal": {"idle_ttl_ms": 1000}}"#);
    let loader = ConfigLoader::from_path(dir.path());
    let env = EnvLoader::from_vars(HashMap::from([(
        crate::env_loader::ENV_TERMINAL_IDLE_TTL_MS.to_string(),
        "2000".to_string(),
    )]));

    let config = loader.load_with_env(&env).unwrap();
    assert_eq!(config.terminal.idle_ttl_ms, 2000);
}

#[test]
fn test_invalid_json_reports_file() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "{ not json");
    let loader = ConfigLoader::from_path(dir.path());

    let err = loader.load_with_env(&no_env()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidJson { .. }));
    assert!(err.to_string().contains(CONFIG_FILE));
}

#[test]
fn test_invalid_values_rejected() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, r#"{"outputs": {"default_read_limit": 0}}"#);
    let loader = ConfigLoader::from_path(dir.path());

    let err = loader.load_with_env(&no_env()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn test_load_from_file_not_found() {
    let dir = TempDir::new().unwrap();
    let err = ConfigLoader::load_from_file(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(_)));
}
