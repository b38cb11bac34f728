//! A cancellation token fed by several independent sources.
//!
//! Each linked source forwards its cancellation into one combined token.
//! Links can be detached later, which stops the forwarding without touching
//! either side; a promoted execution uses this to stop listening to the
//! request that started it.

use tokio_util::sync::CancellationToken;

/// Combined cancellation token with detachable source links.
///
/// Dropping the value detaches every link, so no forwarding task outlives
/// its owner.
#[derive(Debug, Default)]
pub struct LinkedCancellation {
    combined: CancellationToken,
    links: Vec<CancellationToken>,
}

impl LinkedCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a combined token linked to every given source.
    pub fn from_sources<'a>(sources: impl IntoIterator<Item = &'a CancellationToken>) -> Self {
        let mut linked = Self::new();
        for source in sources {
            linked.link(source);
        }
        linked
    }

    /// The combined token. Cancelled as soon as any linked source is.
    pub fn token(&self) -> CancellationToken {
        self.combined.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.combined.is_cancelled()
    }

    /// Number of live links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Forward cancellation of `source` into the combined token.
    ///
    /// An already-cancelled source cancels the combined token immediately
    /// and leaves no link behind. Must be called inside a Tokio runtime.
    pub fn link(&mut self, source: &CancellationToken) {
        if source.is_cancelled() {
            self.combined.cancel();
            return;
        }

        let stop = CancellationToken::new();
        let stop_signal = stop.clone();
        let source = source.clone();
        let combined = self.combined.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = stop_signal.cancelled() => {}
                _ = combined.cancelled() => {}
                _ = source.cancelled() => combined.cancel(),
            }
        });
        self.links.push(stop);
    }

    /// Stop forwarding from every source linked so far.
    ///
    /// The combined token keeps its current state and can be linked again.
    pub fn detach(&mut self) {
        for stop in self.links.drain(..) {
            stop.cancel();
        }
    }

    /// Cancel the combined token directly.
    pub fn cancel(&self) {
        self.combined.cancel();
    }
}

impl Drop for LinkedCancellation {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
#[path = "linked.test.rs"]
mod tests;
