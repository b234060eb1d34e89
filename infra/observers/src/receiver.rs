use crate::channel::FlagChanged;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

/// An extension trait for flag-change receivers to provide a more ergonomic API.
///
/// For `watch::Receiver`, `recv_change` waits for a change before returning the
/// latest value.
pub trait EventReceiverExt<T> {
    /// Receive the next change, returning `None` when the channel is closed.
    fn recv_change(&mut self) -> impl Future<Output = Option<T>> + Send;
}

impl EventReceiverExt<Arc<FlagChanged>> for broadcast::Receiver<Arc<FlagChanged>> {
    async fn recv_change(&mut self) -> Option<Arc<FlagChanged>> {
        let mut skipped = 0u64;

        loop {
            match self.recv().await {
                Ok(change) => {
                    if skipped > 0 {
                        warn!(
                            skipped = skipped,
                            "Flag change receiver lagged; continuing from latest change"
                        );
                    }
                    return Some(change);
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    skipped = skipped.saturating_add(n);
                    debug!(
                        skipped = n,
                        total_skipped = skipped,
                        "Flag change receiver lagged; accumulating skipped changes"
                    );
                },
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl<T> EventReceiverExt<T> for watch::Receiver<T>
where
    T: Clone + Send + Sync,
{
    async fn recv_change(&mut self) -> Option<T> {
        match self.changed().await {
            Ok(()) => Some(self.borrow_and_update().clone()),
            Err(_) => None,
        }
    }
}
