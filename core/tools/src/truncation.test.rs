use super::*;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_within_budget_unchanged() {
    let store = OutputStore::new();
    let output = ToolOutput::text("short");

    let result = truncate_if_needed(output.clone(), "shell", "call-1", 5, &store).await;
    assert_eq!(result, output);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_oversized_text_is_stored() {
    let store = OutputStore::new();
    let full = "0123456789".repeat(5);

    let result = truncate_if_needed(ToolOutput::text(full.clone()), "shell", "call-1", 12, &store).await;
    let payload = result.content.as_structured().unwrap();
    assert_eq!(payload["truncated"], true);
    assert_eq!(payload["total_length"], 50);
    assert_eq!(payload["content"], "012345678901");
    assert!(payload["message"].as_str().unwrap().contains("read_output"));

    let id = payload["output_id"].as_str().unwrap();
    let page = store.read(id, 0, 50).await.unwrap();
    assert_eq!(page.content, full);
}

#[tokio::test]
async fn test_structured_serialized_with_sorted_keys() {
    let store = OutputStore::new();
    let output = ToolOutput::structured(json!({"b": "y".repeat(20), "a": 1}));

    let result = truncate_if_needed(output, "shell", "call-1", 10, &store).await;
    let payload = result.content.as_structured().unwrap();
    assert_eq!(payload["content"], "{\"a\":1,\"b\"");

    let id = payload["output_id"].as_str().unwrap();
    let stored = store.get(id).await.unwrap();
    assert!(stored.content.starts_with("{\"a\":1,\"b\":\"yyyy"));
}

#[tokio::test]
async fn test_error_flag_preserved() {
    let store = OutputStore::new();
    let result = truncate_if_needed(ToolOutput::error("e".repeat(30)), "shell", "call-1", 3, &store).await;
    assert!(result.is_error);
}
