use crate::FlagStorage;
use crate::codec::{self, PersistedFlags};
use crate::error::StorageError;
use flagkit_domain::{FlagId, FlagMap};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Process-local storage holding the raw document text.
///
/// Used for `storage.backend = "memory"` and as a test double: the stored text can be
/// seeded or inspected directly, and loads or saves can be made to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: Mutex<Option<String>>,
    saves: AtomicUsize,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `raw` as the stored text, valid JSON or not.
    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self { document: Mutex::new(Some(raw.into())), ..Self::default() }
    }

    /// Starts with the given flags already persisted.
    #[must_use]
    pub fn with_flags<I, K>(flags: I) -> Self
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<FlagId>,
    {
        let map: FlagMap = flags.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let raw = codec::encode(&map)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .unwrap_or_else(|| "{}".to_owned());
        Self::with_raw(raw)
    }

    /// The stored text, if anything was ever stored.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.document.lock().clone()
    }

    /// The stored document decoded, if present and well-formed.
    #[must_use]
    pub fn flags(&self) -> Option<FlagMap> {
        let raw = self.document.lock().clone()?;
        codec::decode(raw.as_bytes()).ok().map(|p| p.values)
    }

    /// Number of successful saves so far.
    #[must_use]
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl FlagStorage for MemoryStorage {
    fn load(&self) -> Result<Option<PersistedFlags>, StorageError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                message: "memory storage refused to load".into(),
                context: None,
            });
        }

        self.document.lock().as_deref().map(|raw| codec::decode(raw.as_bytes())).transpose()
    }

    fn save(&self, flags: &FlagMap) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                message: "memory storage refused to save".into(),
                context: None,
            });
        }

        let bytes = codec::encode(flags)?;
        let raw = String::from_utf8(bytes).map_err(|e| StorageError::from(e.to_string()))?;
        *self.document.lock() = Some(raw);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_storage_loads_nothing() {
        assert_eq!(MemoryStorage::new().load().unwrap(), None);
    }

    #[test]
    fn saves_are_counted_and_readable() {
        let storage = MemoryStorage::new();
        storage.save(&FlagMap::from([(FlagId::from("A"), true)])).unwrap();
        assert_eq!(storage.saves(), 1);
        assert_eq!(storage.raw().as_deref(), Some(r#"{"A":true}"#));
        assert_eq!(storage.load().unwrap().and_then(|p| p.get("A")), Some(true));
    }

    #[test]
    fn injected_failures_surface_as_unavailable() {
        let storage = MemoryStorage::with_flags([("A", false)]);
        storage.fail_loads(true);
        storage.fail_saves(true);
        assert!(matches!(storage.load(), Err(StorageError::Unavailable { .. })));
        assert!(matches!(storage.save(&FlagMap::new()), Err(StorageError::Unavailable { .. })));
        assert_eq!(storage.saves(), 0);

        storage.fail_loads(false);
        assert_eq!(storage.flags(), Some(FlagMap::from([(FlagId::from("A"), false)])));
    }

    #[test]
    fn garbage_is_reported_as_corrupt() {
        let storage = MemoryStorage::with_raw("definitely not json");
        assert!(storage.load().unwrap_err().is_corrupt());
        assert_eq!(storage.flags(), None);
    }
}
