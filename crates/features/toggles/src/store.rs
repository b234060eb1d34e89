//! The flag store: in-memory state reconciled with storage at startup.
//!
//! The catalog decides which flags exist. Persisted values override catalog defaults for
//! known ids; unknown persisted ids are dropped, and a document missing any known id is
//! rewritten right away so storage catches up with the catalog.
//!
//! Storage trouble never reaches the caller. After the first failed load or save the store
//! keeps working in memory and stops touching storage for the rest of its life.

use flagkit_domain::{FlagCatalog, FlagId, FlagMap};
use flagkit_observers::ObserverRegistry;
use flagkit_storage::{FlagStorage, PersistedFlags, StorageError};
use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

/// Current flag values, change notification and persistence in one place.
pub struct FlagStore {
    catalog: Arc<FlagCatalog>,
    state: RwLock<FxHashMap<FlagId, bool>>,
    observers: ObserverRegistry,
    storage: Arc<dyn FlagStorage>,
    persistent: AtomicBool,
    /// Serializes snapshot-and-save so the last write always carries the newest state.
    persist_lock: Mutex<()>,
}

impl fmt::Debug for FlagStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagStore")
            .field("flags", &self.catalog.len())
            .field("observers", &self.observers.len())
            .field("storage", &self.storage)
            .field("persistent", &self.is_persistent())
            .finish_non_exhaustive()
    }
}

impl FlagStore {
    /// Builds the store and reconciles it with `storage`.
    pub fn open(catalog: impl Into<Arc<FlagCatalog>>, storage: Arc<dyn FlagStorage>) -> Self {
        let catalog = catalog.into();
        let defaults = catalog.defaults();

        let (persisted, persistent) = match storage.load() {
            Ok(Some(persisted)) => (persisted, true),
            Ok(None) => {
                debug!("No persisted flags; starting from catalog defaults");
                (PersistedFlags::default(), true)
            },
            Err(err) => {
                report_load_failure(&err);
                (PersistedFlags::default(), false)
            },
        };

        let (merged, needs_write) = reconcile(&defaults, &persisted);

        let store = Self {
            catalog,
            state: RwLock::new(merged.into_iter().collect()),
            observers: ObserverRegistry::new(),
            storage,
            persistent: AtomicBool::new(persistent),
            persist_lock: Mutex::new(()),
        };

        if persistent && needs_write {
            debug!("Persisted flags are missing catalog entries; rewriting storage");
            store.persist();
        }

        info!(flags = store.catalog.len(), persistent = store.is_persistent(), "Flag store ready");
        store
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<FlagCatalog> {
        &self.catalog
    }

    #[must_use]
    pub const fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    /// Whether changes still reach storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.persistent.load(Ordering::Acquire)
    }

    /// Current value; `false` for ids the catalog does not know.
    #[must_use]
    pub fn get(&self, id: &str) -> bool {
        self.state.read().get(id).copied().unwrap_or(false)
    }

    /// Sets one flag. Returns whether the value changed.
    ///
    /// An unchanged value is a no-op: no notification, no write. Unknown ids are ignored.
    pub fn set(&self, id: impl Into<FlagId>, enabled: bool) -> bool {
        let id = id.into();
        match self.apply(&id, |_| enabled) {
            Some(true) => {
                self.observers.notify(&id, enabled);
                self.persist();
                true
            },
            _ => false,
        }
    }

    /// Flips one flag and returns the new value (`false` for unknown ids).
    pub fn toggle(&self, id: impl Into<FlagId>) -> bool {
        let id = id.into();
        let mut enabled = false;
        if self
            .apply(&id, |current| {
                enabled = !current;
                enabled
            })
            .is_some()
        {
            self.observers.notify(&id, enabled);
            self.persist();
        }
        enabled
    }

    /// Applies a batch: one notification per changed key in input order, one write.
    ///
    /// Returns the number of flags that changed.
    pub fn set_many<I, K>(&self, updates: I) -> usize
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<FlagId>,
    {
        let mut changed = Vec::new();
        {
            let mut state = self.state.write();
            for (id, enabled) in updates {
                let id = id.into();
                match state.get_mut(id.as_str()) {
                    Some(slot) if *slot != enabled => {
                        *slot = enabled;
                        changed.push((id, enabled));
                    },
                    Some(_) => {},
                    None => warn_unknown(&id),
                }
            }
        }

        self.publish(&changed);
        changed.len()
    }

    /// Puts every catalog flag back to its default.
    ///
    /// Returns the number of flags that changed.
    pub fn reset_to_defaults(&self) -> usize {
        let mut changed = Vec::new();
        {
            let mut state = self.state.write();
            for descriptor in self.catalog.flatten() {
                let slot = state.entry(descriptor.id.clone()).or_insert(descriptor.default_enabled);
                if *slot != descriptor.default_enabled {
                    *slot = descriptor.default_enabled;
                    changed.push((descriptor.id.clone(), descriptor.default_enabled));
                }
            }
        }

        debug!(changed = changed.len(), "Flags reset to defaults");
        self.publish(&changed);
        changed.len()
    }

    /// Every flag with its current value, ordered by id.
    #[must_use]
    pub fn snapshot(&self) -> FlagMap {
        self.state.read().iter().map(|(id, enabled)| (id.clone(), *enabled)).collect()
    }

    /// Runs `next` against the current value under the write lock.
    ///
    /// `None` for unknown ids, otherwise whether the value changed.
    fn apply(&self, id: &FlagId, next: impl FnOnce(bool) -> bool) -> Option<bool> {
        let mut state = self.state.write();
        let Some(slot) = state.get_mut(id.as_str()) else {
            drop(state);
            warn_unknown(id);
            return None;
        };

        let enabled = next(*slot);
        if *slot == enabled {
            return Some(false);
        }
        *slot = enabled;
        drop(state);

        debug!(flag = %id, enabled, "Flag changed");
        Some(true)
    }

    fn publish(&self, changed: &[(FlagId, bool)]) {
        if changed.is_empty() {
            return;
        }
        for (id, enabled) in changed {
            debug!(flag = %id, enabled = *enabled, "Flag changed");
            self.observers.notify(id, *enabled);
        }
        self.persist();
    }

    /// Writes the state as it is now, not as it was when the change happened.
    fn persist(&self) {
        if !self.is_persistent() {
            return;
        }

        let _guard = self.persist_lock.lock();
        if !self.is_persistent() {
            return;
        }

        let snapshot = self.snapshot();
        if let Err(err) = self.storage.save(&snapshot) {
            self.persistent.store(false, Ordering::Release);
            error!(error = %err, "Failed to save flags; continuing in memory-only mode");
        }
    }
}

fn reconcile(defaults: &FlagMap, persisted: &PersistedFlags) -> (FlagMap, bool) {
    let mut merged = defaults.clone();

    for (id, enabled) in &persisted.values {
        match merged.get_mut(id.as_str()) {
            Some(slot) => *slot = *enabled,
            None => debug!(flag = %id, "Dropping persisted flag unknown to the catalog"),
        }
    }

    for id in &persisted.invalid {
        warn!(flag = %id, "Persisted flag value is not a boolean; using catalog default");
    }

    let needs_write = defaults.keys().any(|id| !persisted.values.contains_key(id.as_str()));
    (merged, needs_write)
}

fn report_load_failure(err: &StorageError) {
    if err.is_corrupt() {
        error!(
            error = %err,
            "Persisted flags are unreadable; using defaults in memory-only mode and leaving the document untouched"
        );
    } else {
        error!(error = %err, "Failed to load flags; using defaults in memory-only mode");
    }
}

fn warn_unknown(id: &FlagId) {
    warn!(flag = %id, "Ignoring write to a flag the catalog does not define");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults(pairs: &[(&'static str, bool)]) -> FlagMap {
        pairs.iter().map(|(id, v)| (FlagId::from(*id), *v)).collect()
    }

    #[test]
    fn reconcile_prefers_persisted_known_values() {
        let persisted = PersistedFlags::from(defaults(&[("A", false), ("GONE", true)]));
        let (merged, needs_write) = reconcile(&defaults(&[("A", true)]), &persisted);
        assert_eq!(merged, defaults(&[("A", false)]));
        assert!(!needs_write);
    }

    #[test]
    fn reconcile_fills_missing_and_invalid_entries() {
        let persisted = PersistedFlags {
            values: defaults(&[("A", false)]),
            invalid: vec![FlagId::from("B")],
        };
        let (merged, needs_write) =
            reconcile(&defaults(&[("A", true), ("B", true), ("C", false)]), &persisted);
        assert_eq!(merged, defaults(&[("A", false), ("B", true), ("C", false)]));
        assert!(needs_write);
    }

    #[test]
    fn reconcile_of_nothing_is_the_defaults() {
        let all = defaults(&[("A", true), ("B", false)]);
        let (merged, needs_write) = reconcile(&all, &PersistedFlags::default());
        assert_eq!(merged, all);
        assert!(needs_write);
    }
}
