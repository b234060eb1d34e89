//! Reactive views over the flag store.
//!
//! A binding caches the values it cares about in a `tokio::sync::watch` channel and keeps
//! them current through a filtered subscription. Consumers either read the cache directly
//! or await `changed()` on a receiver from `watch()` as their re-render trigger. Dropping the
//! binding removes its subscription; receivers handed out earlier then report the channel
//! as closed.

use crate::manager::FlagManager;
use flagkit_domain::{FlagId, FlagMap};
use flagkit_observers::SubscriptionGuard;
use fxhash::FxHashSet;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug)]
struct Bound<T> {
    rx: watch::Receiver<T>,
    _subscription: SubscriptionGuard,
}

impl<T> Bound<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn new<R, A>(manager: &FlagManager, read: R, apply: A) -> Self
    where
        R: Fn(&FlagManager) -> T,
        A: Fn(&mut T, &FlagId, bool) -> bool + Send + Sync + 'static,
    {
        let (tx, rx) = watch::channel(read(manager));
        let tx = Arc::new(tx);

        let sink = Arc::clone(&tx);
        let subscription = manager
            .subscribe(move |id, enabled| {
                sink.send_if_modified(|value| apply(value, id, enabled));
            })
            .guard();

        // A change may have landed between the first read and the subscription.
        let fresh = read(manager);
        tx.send_if_modified(|value| {
            if *value == fresh {
                return false;
            }
            *value = fresh;
            true
        });

        Self { rx, _subscription: subscription }
    }

    fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    fn watch(&self) -> watch::Receiver<T> {
        self.rx.clone()
    }
}

fn assign(slot: &mut bool, enabled: bool) -> bool {
    if *slot == enabled {
        return false;
    }
    *slot = enabled;
    true
}

/// Cached value of one flag.
#[derive(Debug)]
pub struct FlagBinding {
    id: FlagId,
    bound: Bound<bool>,
}

impl FlagBinding {
    pub(crate) fn new(manager: &FlagManager, id: FlagId) -> Self {
        let key = id.clone();
        let bound = Bound::new(
            manager,
            |m| m.is_enabled(id.as_str()),
            move |value, changed, enabled| changed == &key && assign(value, enabled),
        );
        Self { id, bound }
    }

    #[must_use]
    pub const fn id(&self) -> &FlagId {
        &self.id
    }

    #[must_use]
    pub fn get(&self) -> bool {
        self.bound.current()
    }

    /// A receiver that wakes on every change of this flag.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.bound.watch()
    }
}

/// Cached values of a fixed list of flags.
#[derive(Debug)]
pub struct FlagSetBinding {
    ids: Vec<FlagId>,
    bound: Bound<FlagMap>,
}

impl FlagSetBinding {
    pub(crate) fn new(manager: &FlagManager, ids: Vec<FlagId>) -> Self {
        let filter: FxHashSet<FlagId> = ids.iter().cloned().collect();
        let read_ids = ids.clone();
        let bound = Bound::new(
            manager,
            move |m| read_ids.iter().map(|id| (id.clone(), m.is_enabled(id.as_str()))).collect(),
            move |values: &mut FlagMap, changed, enabled| {
                filter.contains(changed.as_str())
                    && values.get_mut(changed.as_str()).is_some_and(|slot| assign(slot, enabled))
            },
        );
        Self { ids, bound }
    }

    #[must_use]
    pub fn ids(&self) -> &[FlagId] {
        &self.ids
    }

    /// Cached value; `false` for ids outside the set.
    #[must_use]
    pub fn get(&self, id: &str) -> bool {
        self.bound.rx.borrow().get(id).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn values(&self) -> FlagMap {
        self.bound.current()
    }

    #[must_use]
    pub fn watch(&self) -> watch::Receiver<FlagMap> {
        self.bound.watch()
    }
}

/// A module flag together with its sub-features.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleState {
    pub enabled: bool,
    pub features: FlagMap,
}

impl ModuleState {
    /// The sub-feature's own value, regardless of the module.
    #[must_use]
    pub fn is_feature_enabled(&self, sub: &str) -> bool {
        self.features.get(sub).copied().unwrap_or(false)
    }

    /// Usable only when both the module and the sub-feature are on.
    #[must_use]
    pub fn is_active(&self, sub: &str) -> bool {
        self.enabled && self.is_feature_enabled(sub)
    }
}

/// Cached state of a module and every sub-feature below it in the catalog tree.
#[derive(Debug)]
pub struct ModuleBinding {
    module: FlagId,
    sub_features: Vec<FlagId>,
    bound: Bound<ModuleState>,
}

impl ModuleBinding {
    pub(crate) fn new(manager: &FlagManager, module: FlagId) -> Self {
        let sub_features: Vec<FlagId> =
            manager.catalog().descendants(module.as_str()).into_iter().cloned().collect();

        let read_module = module.clone();
        let read_subs = sub_features.clone();
        let key = module.clone();
        let bound = Bound::new(
            manager,
            move |m| ModuleState {
                enabled: m.is_enabled(read_module.as_str()),
                features: read_subs
                    .iter()
                    .map(|id| (id.clone(), m.is_enabled(id.as_str())))
                    .collect(),
            },
            move |state: &mut ModuleState, changed, enabled| {
                if changed == &key {
                    return assign(&mut state.enabled, enabled);
                }
                state.features.get_mut(changed.as_str()).is_some_and(|slot| assign(slot, enabled))
            },
        );

        Self { module, sub_features, bound }
    }

    #[must_use]
    pub const fn module(&self) -> &FlagId {
        &self.module
    }

    /// All descendants of the module, in catalog order.
    #[must_use]
    pub fn sub_features(&self) -> &[FlagId] {
        &self.sub_features
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.bound.rx.borrow().enabled
    }

    #[must_use]
    pub fn is_active(&self, sub: &str) -> bool {
        self.bound.rx.borrow().is_active(sub)
    }

    #[must_use]
    pub fn state(&self) -> ModuleState {
        self.bound.current()
    }

    #[must_use]
    pub fn watch(&self) -> watch::Receiver<ModuleState> {
        self.bound.watch()
    }
}
