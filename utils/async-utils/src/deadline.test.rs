use super::*;
use pretty_assertions::assert_eq;
use std::time::Instant;
use tokio::time::sleep;

#[tokio::test]
async fn completes_before_deadline() {
    let token = CancellationToken::new();
    let result = run_with_deadline(async { 3 }, &token, Duration::from_secs(1)).await;
    assert_eq!(result, Ok(3));
}

#[tokio::test]
async fn times_out() {
    let token = CancellationToken::new();
    let start = Instant::now();
    let result = run_with_deadline(
        sleep(Duration::from_secs(5)),
        &token,
        Duration::from_millis(50),
    )
    .await;
    assert_eq!(result, Err(RaceErr::TimedOut));
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn cancellation_is_distinct_from_timeout() {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(10)).await;
        trigger.cancel();
    });
    let result = run_with_deadline(
        sleep(Duration::from_secs(5)),
        &token,
        Duration::from_secs(2),
    )
    .await;
    assert_eq!(result, Err(RaceErr::Cancelled));
}

#[tokio::test]
async fn in_flight_future_survives_timeout() {
    let token = CancellationToken::new();
    let mut fut = Box::pin(async {
        sleep(Duration::from_millis(100)).await;
        "done"
    });

    let first = run_with_deadline(&mut fut, &token, Duration::from_millis(10)).await;
    assert_eq!(first, Err(RaceErr::TimedOut));

    assert_eq!(fut.await, "done");
}
