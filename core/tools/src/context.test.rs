use super::*;

#[test]
fn test_is_cancelled_checks_both_tokens() {
    let request = CancellationToken::new();
    let ctx = ToolContext::new("call-1", "session-1", PathBuf::from("/tmp"))
        .with_request_token(request.clone());
    assert!(!ctx.is_cancelled());

    request.cancel();
    assert!(ctx.is_cancelled());
}

#[test]
fn test_scoped_drops_request_token() {
    let request = CancellationToken::new();
    let ctx = ToolContext::new("call-1", "session-1", PathBuf::from("/tmp"))
        .with_request_token(request.clone());

    let scoped = ctx.scoped(CancellationToken::new());
    request.cancel();

    assert!(scoped.request_token.is_none());
    assert!(!scoped.is_cancelled());
    assert_eq!(scoped.call_id, "call-1");
}
