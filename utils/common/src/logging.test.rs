use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_configurable_timer_local() {
    let timer = ConfigurableTimer::new(TimezoneConfig::Local);
    let mut buf = String::new();
    let mut writer = Writer::new(&mut buf);
    timer.format_time(&mut writer).unwrap();
    assert!(!buf.is_empty());
    assert!(!buf.ends_with('Z'));
}

#[test]
fn test_configurable_timer_utc() {
    let timer = ConfigurableTimer::new(TimezoneConfig::Utc);
    let mut buf = String::new();
    let mut writer = Writer::new(&mut buf);
    timer.format_time(&mut writer).unwrap();
    assert!(buf.ends_with('Z'));
}

#[test]
fn test_build_env_filter_with_default() {
    let logging = LoggingConfig::default();
    let filter = build_env_filter(&logging, "error");
    let _ = format!("{filter:?}");
}

#[test]
fn test_build_env_filter_with_modules() {
    let logging = LoggingConfig {
        level: "info".to_string(),
        modules: vec![
            "toolrun_tasks=debug".to_string(),
            "toolrun_terminal=trace".to_string(),
        ],
        ..Default::default()
    };
    let filter = build_env_filter(&logging, "error");
    let filter_str = format!("{filter:?}");
    assert!(filter_str.contains("toolrun_tasks") || filter_str.contains("debug"));
}

#[test]
fn test_logging_config_serde() {
    let config: LoggingConfig =
        serde_json::from_str(r#"{"timezone": "utc", "modules": ["a=debug"]}"#).unwrap();
    assert_eq!(config.timezone, TimezoneConfig::Utc);
    assert_eq!(config.level, "info");
    assert_eq!(config.modules, vec!["a=debug".to_string()]);
}
