use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_required_str() {
    let input = json!({"task_id": "task-1", "n": 3});
    assert_eq!(required_str(&input, "task_id").unwrap(), "task-1");
    assert!(required_str(&input, "n").is_err());
    assert!(required_str(&input, "missing").is_err());
}

#[test]
fn test_optional_numbers() {
    let input = json!({"offset": 10, "neg": -1, "big": 70_000, "null": null});
    assert_eq!(optional_u64(&input, "offset").unwrap(), Some(10));
    assert_eq!(optional_u64(&input, "missing").unwrap(), None);
    assert_eq!(optional_u64(&input, "null").unwrap(), None);
    assert!(optional_u64(&input, "neg").is_err());
    assert!(optional_u16(&input, "big").is_err());
    assert_eq!(optional_u16(&input, "offset").unwrap(), Some(10));
}

#[test]
fn test_optional_bool() {
    let input = json!({"wait": true, "bad": "yes"});
    assert_eq!(optional_bool(&input, "wait").unwrap(), Some(true));
    assert_eq!(optional_bool(&input, "missing").unwrap(), None);
    assert!(optional_bool(&input, "bad").is_err());
}
