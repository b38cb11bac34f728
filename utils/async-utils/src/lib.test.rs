use super::*;
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::task;
use tokio::time::sleep;

#[tokio::test]
async fn returns_ok_when_future_completes_first() {
    let token = CancellationToken::new();

    let result = async { 42 }.or_cancel(&token).await;

    assert_eq!(Ok(42), result);
}

#[tokio::test]
async fn returns_err_when_token_cancelled_first() {
    let token = CancellationToken::new();
    let trigger = token.clone();

    let cancel_handle = task::spawn(async move {
        sleep(Duration::from_millis(10)).await;
        trigger.cancel();
    });

    let result = async {
        sleep(Duration::from_millis(200)).await;
        7
    }
    .or_cancel(&token)
    .await;

    cancel_handle.await.expect("cancel task panicked");
    assert_eq!(Err(CancelErr::Cancelled), result);
}

#[tokio::test]
async fn already_cancelled_token_wins_over_ready_future() {
    let token = CancellationToken::new();
    token.cancel();

    let result = async { 5 }.or_cancel(&token).await;

    assert_eq!(Err(CancelErr::Cancelled), result);
}
