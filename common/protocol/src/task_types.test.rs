use std::str::FromStr;

use super::*;
use pretty_assertions::assert_eq;
use strum::IntoEnumIterator;

#[test]
fn test_terminal_statuses() {
    assert!(!TaskStatus::Pending.is_terminal());
    assert!(!TaskStatus::Running.is_terminal());
    assert!(TaskStatus::Completed.is_terminal());
    assert!(TaskStatus::Failed.is_terminal());
    assert!(TaskStatus::Cancelled.is_terminal());
}

#[test]
fn test_string_forms_agree() {
    for status in TaskStatus::iter() {
        let json = serde_json::to_value(status).unwrap();
        assert_eq!(json, serde_json::Value::String(status.as_str().to_string()));
        assert_eq!(TaskStatus::from_str(status.as_str()).unwrap(), status);
        assert_eq!(status.to_string(), status.as_str());
    }
}

#[test]
fn test_parse_unknown_status() {
    assert!(TaskStatus::from_str("done").is_err());
}
