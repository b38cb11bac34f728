use super::*;
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::time::sleep;
use tokio::time::timeout;

#[tokio::test]
async fn any_source_cancels_combined() {
    let caller = CancellationToken::new();
    let request = CancellationToken::new();
    let linked = LinkedCancellation::from_sources([&caller, &request]);
    assert_eq!(linked.link_count(), 2);

    request.cancel();

    let combined = linked.token();
    timeout(Duration::from_secs(1), combined.cancelled())
        .await
        .expect("combined token should be cancelled");
    assert!(!caller.is_cancelled());
}

#[tokio::test]
async fn already_cancelled_source_cancels_immediately() {
    let source = CancellationToken::new();
    source.cancel();

    let linked = LinkedCancellation::from_sources([&source]);

    assert!(linked.is_cancelled());
    assert_eq!(linked.link_count(), 0);
}

#[tokio::test]
async fn detached_source_no_longer_propagates() {
    let request = CancellationToken::new();
    let mut linked = LinkedCancellation::from_sources([&request]);

    linked.detach();
    assert_eq!(linked.link_count(), 0);
    request.cancel();
    sleep(Duration::from_millis(20)).await;

    assert!(!linked.is_cancelled());
}

#[tokio::test]
async fn relink_after_detach() {
    let request = CancellationToken::new();
    let task = CancellationToken::new();
    let mut linked = LinkedCancellation::from_sources([&request]);

    linked.detach();
    linked.link(&task);
    request.cancel();
    sleep(Duration::from_millis(20)).await;
    assert!(!linked.is_cancelled());

    task.cancel();
    timeout(Duration::from_secs(1), linked.token().cancelled())
        .await
        .expect("task token should cancel combined");
}

#[tokio::test]
async fn combined_cancel_does_not_reach_sources() {
    let caller = CancellationToken::new();
    let linked = LinkedCancellation::from_sources([&caller]);

    linked.cancel();
    sleep(Duration::from_millis(10)).await;

    assert!(linked.is_cancelled());
    assert!(!caller.is_cancelled());
}
