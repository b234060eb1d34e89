use crate::channel::{FlagChanged, FlagChannel};
use crate::error::ObserverError;
use flagkit_domain::FlagId;
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tracing::{trace, warn};

/// A safe default for bridged channel buffers.
const DEFAULT_CAPACITY: usize = 128;
const MIN_CAPACITY: usize = 1;

/// Callback invoked with `(flag id, new value)` after an effective change.
pub type Observer = dyn Fn(&FlagId, bool) + Send + Sync;

/// Registry-unique subscription identifier, assigned in subscription order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

struct Entry {
    id: SubscriberId,
    active: AtomicBool,
    callback: Box<Observer>,
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("active", &self.active.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    entries: RwLock<Vec<Arc<Entry>>>,
    next_id: AtomicU64,
}

impl RegistryInner {
    fn remove(&self, id: SubscriberId) -> bool {
        let mut entries = self.entries.write();
        let Some(pos) = entries.iter().position(|e| e.id == id) else {
            return false;
        };
        let entry = entries.remove(pos);
        entry.active.store(false, Ordering::Release);
        trace!(subscriber = id.0, "Observer removed");
        true
    }
}

/// Ordered set of flag-change observers.
///
/// Cloning is cheap and yields a handle to the same registry.
#[derive(Debug, Clone, Default)]
pub struct ObserverRegistry {
    inner: Arc<RegistryInner>,
}

impl ObserverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` and returns the handle that removes it again.
    ///
    /// Subscribing the same closure twice yields two independent subscriptions.
    /// Dropping the returned [`Subscription`] keeps the callback registered; use
    /// [`Subscription::guard`] for drop-to-unsubscribe.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&FlagId, bool) + Send + Sync + 'static,
    {
        let id = SubscriberId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = Arc::new(Entry { id, active: AtomicBool::new(true), callback: Box::new(callback) });
        self.inner.entries.write().push(entry);
        trace!(subscriber = id.0, "Observer registered");

        Subscription { id, registry: Arc::downgrade(&self.inner) }
    }

    /// Bridges notifications into a broadcast channel with the default capacity.
    ///
    /// # Errors
    /// Never fails with the default capacity; the signature matches
    /// [`ObserverRegistry::subscribe_channel_with_capacity`].
    pub fn subscribe_channel(&self) -> Result<FlagChannel, ObserverError> {
        self.subscribe_channel_with_capacity(DEFAULT_CAPACITY)
    }

    /// Bridges notifications into a broadcast channel holding up to `capacity` events.
    ///
    /// The observer is removed when the returned [`FlagChannel`] is dropped.
    ///
    /// # Errors
    /// Returns [`ObserverError::InvalidCapacity`] if `capacity` is zero.
    pub fn subscribe_channel_with_capacity(
        &self,
        capacity: usize,
    ) -> Result<FlagChannel, ObserverError> {
        if capacity < MIN_CAPACITY {
            return Err(ObserverError::InvalidCapacity {
                message: format!("capacity must be >= {MIN_CAPACITY}").into(),
                context: None,
            });
        }

        let (tx, rx) = broadcast::channel(capacity);
        let subscription = self.subscribe(move |id, enabled| {
            // No live receiver is not an error; the channel handle may be mid-drop.
            let _ = tx.send(Arc::new(FlagChanged { id: id.clone(), enabled }));
        });

        Ok(FlagChannel::new(rx, subscription.guard()))
    }

    /// Invokes every registered observer with `(id, enabled)`, in subscription order.
    ///
    /// The observer list is snapshotted first and no lock is held while callbacks run.
    /// A callback removed by an earlier callback in the same pass is skipped. A panicking
    /// callback is logged and the pass continues.
    ///
    /// Returns the number of callbacks that completed without panicking.
    pub fn notify(&self, id: &FlagId, enabled: bool) -> usize {
        let snapshot: Vec<Arc<Entry>> = self.inner.entries.read().clone();
        let mut delivered = 0;

        for entry in snapshot {
            if !entry.active.load(Ordering::Acquire) {
                continue;
            }

            match panic::catch_unwind(AssertUnwindSafe(|| (entry.callback)(id, enabled))) {
                Ok(()) => delivered += 1,
                Err(payload) => warn!(
                    flag = %id,
                    enabled,
                    subscriber = entry.id.0,
                    panic = panic_message(payload.as_ref()),
                    "Flag observer panicked; continuing with remaining observers"
                ),
            }
        }

        trace!(flag = %id, enabled, delivered, "Flag change delivered");
        delivered
    }

    /// Number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().is_empty()
    }

    /// Removes every observer.
    pub fn clear(&self) {
        let removed = std::mem::take(&mut *self.inner.entries.write());
        for entry in &removed {
            entry.active.store(false, Ordering::Release);
        }
        trace!(removed = removed.len(), "Observer registry cleared");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}

/// Handle for one registered observer.
///
/// Holds only a weak reference, so it never keeps the registry alive.
#[must_use = "dropping a Subscription leaves the observer registered; call `guard()` to tie it to a scope"]
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    registry: Weak<RegistryInner>,
}

impl Subscription {
    #[must_use]
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Whether the observer is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|inner| inner.entries.read().iter().any(|e| e.id == self.id))
    }

    /// Removes the observer. Returns `false` if it was already gone.
    #[allow(clippy::must_use_candidate)]
    pub fn unsubscribe(self) -> bool {
        self.registry.upgrade().is_some_and(|inner| inner.remove(self.id))
    }

    /// Converts into a guard that unsubscribes when dropped.
    pub const fn guard(self) -> SubscriptionGuard {
        SubscriptionGuard { subscription: self }
    }
}

/// Scope-bound [`Subscription`]: the observer is removed on drop.
#[must_use = "the observer is removed as soon as the guard is dropped"]
#[derive(Debug)]
pub struct SubscriptionGuard {
    subscription: Subscription,
}

impl SubscriptionGuard {
    #[must_use]
    pub const fn id(&self) -> SubscriberId {
        self.subscription.id
    }

    /// Detaches the guard, leaving the observer registered.
    pub fn release(mut self) -> Subscription {
        // The guard keeps a dangling handle, so its drop has nothing to remove.
        let registry = std::mem::take(&mut self.subscription.registry);
        Subscription { id: self.subscription.id, registry }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.subscription.registry.upgrade() {
            inner.remove(self.subscription.id);
        }
    }
}
