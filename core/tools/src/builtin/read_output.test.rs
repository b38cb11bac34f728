use super::*;
use crate::OutputMeta;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn ctx() -> ToolContext {
    ToolContext::new("call-1", "session-1", PathBuf::from("/tmp"))
}

#[tokio::test]
async fn test_read_pages() {
    let outputs = OutputStore::new();
    let id = outputs
        .store("abcdefghij".to_string(), OutputMeta::default())
        .await;
    let tool = ReadOutputTool::new(outputs, 4);

    let first = tool
        .execute(json!({"output_id": id}), &mut ctx())
        .await
        .unwrap();
    assert_eq!(
        first.content.as_structured().unwrap(),
        &json!({
            "output_id": id,
            "content": "abcd",
            "offset": 0,
            "total_length": 10,
            "has_more": true,
        })
    );

    let rest = tool
        .execute(json!({"output_id": id, "offset": 4, "limit": 100}), &mut ctx())
        .await
        .unwrap();
    let rest = rest.content.as_structured().unwrap();
    assert_eq!(rest["content"], "efghij");
    assert_eq!(rest["has_more"], false);
}

#[tokio::test]
async fn test_unknown_output() {
    let tool = ReadOutputTool::new(OutputStore::new(), 100);
    let err = tool
        .execute(json!({"output_id": "output-nope"}), &mut ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, crate::ToolError::OutputNotFound { .. }));
}
