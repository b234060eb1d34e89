use crate::receiver::EventReceiverExt;
use crate::registry::SubscriptionGuard;
use flagkit_domain::FlagId;
use std::sync::Arc;
use tokio::sync::broadcast;

/// One effective flag change, as delivered to async consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagChanged {
    pub id: FlagId,
    pub enabled: bool,
}

/// Async view of a registry's notifications.
///
/// The bridging observer stays registered for as long as this value lives.
#[derive(Debug)]
pub struct FlagChannel {
    receiver: broadcast::Receiver<Arc<FlagChanged>>,
    _subscription: SubscriptionGuard,
}

impl FlagChannel {
    pub(crate) const fn new(
        receiver: broadcast::Receiver<Arc<FlagChanged>>,
        subscription: SubscriptionGuard,
    ) -> Self {
        Self { receiver, _subscription: subscription }
    }

    /// Waits for the next change. Lagged events are skipped with a warning.
    ///
    /// Returns `None` only once the bridge has been torn down.
    pub async fn recv(&mut self) -> Option<Arc<FlagChanged>> {
        EventReceiverExt::recv_change(&mut self.receiver).await
    }

    /// Returns the next already-buffered change without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<FlagChanged>> {
        loop {
            match self.receiver.try_recv() {
                Ok(change) => return Some(change),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {},
                Err(_) => return None,
            }
        }
    }

    /// Another receiver on the same bridge, starting at the next change.
    #[must_use]
    pub fn resubscribe(&self) -> broadcast::Receiver<Arc<FlagChanged>> {
        self.receiver.resubscribe()
    }
}
