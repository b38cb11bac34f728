//! Cancellation and deadline helpers shared by the runtime crates.

use async_trait::async_trait;
use std::future::Future;

pub use tokio_util::sync::CancellationToken;

mod deadline;
mod linked;

pub use deadline::RaceErr;
pub use deadline::run_with_deadline;
pub use linked::LinkedCancellation;

#[derive(Debug, PartialEq, Eq)]
pub enum CancelErr {
    Cancelled,
}

#[async_trait]
pub trait OrCancelExt: Sized {
    type Output;

    /// Resolve with the future's output, or `CancelErr::Cancelled` if the
    /// token fires first.
    async fn or_cancel(self, token: &CancellationToken) -> Result<Self::Output, CancelErr>;
}

#[async_trait]
impl<F> OrCancelExt for F
where
    F: Future + Send,
    F::Output: Send,
{
    type Output = F::Output;

    async fn or_cancel(self, token: &CancellationToken) -> Result<Self::Output, CancelErr> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(CancelErr::Cancelled),
            res = self => Ok(res),
        }
    }
}

#[cfg(test)]
#[path = "lib.test.rs"]
mod tests;
