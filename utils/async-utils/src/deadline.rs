use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Why a raced future did not produce a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceErr {
    TimedOut,
    Cancelled,
}

/// Race `fut` against a deadline and a cancellation token.
///
/// Cancellation is checked first, so a token that is already cancelled
/// always wins. Pass `&mut fut` (with `fut: Pin<Box<_>>`) to keep the
/// in-flight future alive after a timeout.
pub async fn run_with_deadline<F>(
    fut: F,
    token: &CancellationToken,
    deadline: Duration,
) -> Result<F::Output, RaceErr>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(RaceErr::Cancelled),
        result = tokio::time::timeout(deadline, fut) => result.map_err(|_| RaceErr::TimedOut),
    }
}

#[cfg(test)]
#[path = "deadline.test.rs"]
mod tests;
