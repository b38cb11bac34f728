use super::*;
use pretty_assertions::assert_eq;

fn config(max_ms: i64, agent_set: bool) -> ToolCallConfig {
    ToolCallConfig {
        max_duration_ms: max_ms,
        allow_agent_set_duration: agent_set,
        ..Default::default()
    }
}

#[test]
fn test_tool_call_config_default() {
    let config = ToolCallConfig::default();
    assert_eq!(config.max_duration_ms, DEFAULT_MAX_DURATION_MS);
    assert_eq!(
        config.max_background_duration_ms,
        DEFAULT_MAX_BACKGROUND_DURATION_MS
    );
    assert!(config.allow_agent_set_duration);
    assert!(!config.allow_background);
    assert_eq!(config.max_output_tokens, Some(DEFAULT_MAX_OUTPUT_TOKENS));
}

#[test]
fn test_tool_call_config_serde_defaults() {
    let config: ToolCallConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, ToolCallConfig::default());

    let json = r#"{"max_duration_ms": 500, "allow_background": true, "max_output_tokens": null}"#;
    let config: ToolCallConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.max_duration_ms, 500);
    assert!(config.allow_background);
    assert_eq!(config.max_output_tokens, None);
    assert_eq!(config.output_budget_chars(), None);
}

#[test]
fn test_effective_timeout_uses_max_when_unrequested() {
    let config = config(1_000, true);
    assert_eq!(config.effective_timeout(None), Duration::from_millis(1_000));
}

#[test]
fn test_effective_timeout_honours_shorter_request() {
    let config = config(1_000, true);
    assert_eq!(
        config.effective_timeout(Some(250)),
        Duration::from_millis(250)
    );
}

#[test]
fn test_effective_timeout_never_exceeds_max() {
    let config = config(1_000, true);
    for requested in [i64::MIN, -5, 0, 999, 1_000, 1_001, 86_400_000, i64::MAX] {
        let timeout = config.effective_timeout(Some(requested));
        assert!(timeout <= Duration::from_millis(1_000), "{requested}");
    }
    assert_eq!(config.effective_timeout(Some(-5)), Duration::ZERO);
}

#[test]
fn test_effective_timeout_ignores_request_when_not_allowed() {
    let config = config(1_000, false);
    assert_eq!(
        config.effective_timeout(Some(10)),
        Duration::from_millis(1_000)
    );
}

#[test]
fn test_negative_max_duration_clamps_to_zero() {
    let config = config(-1, true);
    assert_eq!(config.effective_timeout(None), Duration::ZERO);
    assert_eq!(config.effective_timeout(Some(50)), Duration::ZERO);
}

#[test]
fn test_output_budget_chars() {
    let config = ToolCallConfig {
        max_output_tokens: Some(100),
        ..Default::default()
    };
    assert_eq!(config.output_budget_chars(), Some(100 * CHARS_PER_TOKEN));

    let config = ToolCallConfig {
        max_output_tokens: Some(-3),
        ..Default::default()
    };
    assert_eq!(config.output_budget_chars(), Some(0));
}
