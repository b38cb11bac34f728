use super::*;
use pretty_assertions::assert_eq;

fn meta() -> OutputMeta {
    OutputMeta {
        tool_name: "shell".to_string(),
        call_id: "call-1".to_string(),
    }
}

#[tokio::test]
async fn test_read_whole_output() {
    let store = OutputStore::new();
    let content = "x".repeat(10_000);
    let id = store.store(content.clone(), meta()).await;

    let page = store.read(&id, 0, 10_000).await.unwrap();
    assert_eq!(page.content, content);
    assert_eq!(page.total_length, 10_000);
    assert!(!page.has_more);

    let stored = store.get(&id).await.unwrap();
    assert_eq!(stored.tool_name, "shell");
    assert_eq!(stored.call_id, "call-1");
}

#[tokio::test]
async fn test_paginated_reads() {
    let store = OutputStore::new();
    let id = store.store("abcdefghij".to_string(), meta()).await;

    let first = store.read(&id, 0, 4).await.unwrap();
    assert_eq!(first.content, "abcd");
    assert!(first.has_more);

    let last = store.read(&id, 8, 4).await.unwrap();
    assert_eq!(last.content, "ij");
    assert_eq!(last.offset, 8);
    assert!(!last.has_more);

    let past = store.read(&id, 50, 4).await.unwrap();
    assert_eq!(past.content, "");
    assert_eq!(past.offset, 10);
    assert!(!past.has_more);
}

#[tokio::test]
async fn test_offsets_count_chars() {
    let store = OutputStore::new();
    let id = store.store("héllo wörld".to_string(), meta()).await;

    let page = store.read(&id, 1, 4).await.unwrap();
    assert_eq!(page.content, "éllo");
    assert_eq!(page.total_length, 11);
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let store = OutputStore::new();
    let err = store.read("output-missing", 0, 10).await.unwrap_err();
    assert!(matches!(err, crate::ToolError::OutputNotFound { .. }));
}

#[tokio::test]
async fn test_cleanup() {
    let store = OutputStore::new();
    store.store("a".to_string(), meta()).await;
    store.store("b".to_string(), meta()).await;
    assert_eq!(store.get_all().await.len(), 2);

    assert_eq!(store.cleanup(Duration::from_secs(3600)).await, 0);
    assert_eq!(store.cleanup(Duration::ZERO).await, 2);
    assert!(store.is_empty().await);
}
