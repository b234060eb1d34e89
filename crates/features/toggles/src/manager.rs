use crate::bindings::{FlagBinding, FlagSetBinding, ModuleBinding};
use crate::draft::FlagDraft;
use crate::store::FlagStore;
use flagkit_domain::{AccessContext, FlagCatalog, FlagDescriptor, FlagId, FlagMap};
use flagkit_observers::{FlagChannel, ObserverError, Subscription};
use flagkit_storage::FlagStorage;
use std::ops::Deref;
use std::sync::Arc;

/// The application-facing handle to the flag engine.
///
/// Built once at startup and passed to whoever needs it; cloning is cheap and every clone
/// sees the same state. All calls are synchronous.
///
/// # Example
///
/// ```rust
/// use flagkit_domain::{FlagCatalog, FlagDescriptor};
/// use flagkit_storage::MemoryStorage;
/// use flagkit_toggles::FlagManager;
/// use std::sync::Arc;
///
/// let catalog = FlagCatalog::new(vec![FlagDescriptor::new("REPORTS_MODULE", "Reports")]);
/// let flags = FlagManager::open(catalog, Arc::new(MemoryStorage::new()));
///
/// assert!(!flags.is_enabled("REPORTS_MODULE"));
/// flags.enable("REPORTS_MODULE");
/// assert!(flags.is_enabled("REPORTS_MODULE"));
/// ```
#[derive(Debug, Clone)]
pub struct FlagManager {
    inner: Arc<FlagStore>,
}

impl Deref for FlagManager {
    type Target = FlagStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<FlagStore> for FlagManager {
    fn from(store: FlagStore) -> Self {
        Self { inner: Arc::new(store) }
    }
}

impl FlagManager {
    /// Opens the store over `storage` and wraps it.
    pub fn open(catalog: impl Into<Arc<FlagCatalog>>, storage: Arc<dyn FlagStorage>) -> Self {
        FlagStore::open(catalog, storage).into()
    }

    #[must_use]
    pub fn is_enabled(&self, id: &str) -> bool {
        self.inner.get(id)
    }

    /// Returns whether the flag changed.
    pub fn enable(&self, id: impl Into<FlagId>) -> bool {
        self.inner.set(id, true)
    }

    /// Returns whether the flag changed.
    pub fn disable(&self, id: impl Into<FlagId>) -> bool {
        self.inner.set(id, false)
    }

    /// Returns the number of flags that changed.
    pub fn update_many<I, K>(&self, updates: I) -> usize
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<FlagId>,
    {
        self.inner.set_many(updates)
    }

    /// Returns the number of flags that changed.
    pub fn reset(&self) -> usize {
        self.inner.reset_to_defaults()
    }

    #[must_use]
    pub fn get_all(&self) -> FlagMap {
        self.inner.snapshot()
    }

    /// Registers a change callback. See [`flagkit_observers::ObserverRegistry::subscribe`].
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&FlagId, bool) + Send + Sync + 'static,
    {
        self.inner.observers().subscribe(callback)
    }

    /// Async stream of changes, alive as long as the returned channel.
    ///
    /// # Errors
    /// Never fails with the default capacity.
    pub fn subscribe_channel(&self) -> Result<FlagChannel, ObserverError> {
        self.inner.observers().subscribe_channel()
    }

    #[must_use]
    pub fn descriptor(&self, id: &str) -> Option<&FlagDescriptor> {
        self.inner.catalog().descriptor(id)
    }

    /// Enabled, and the caller satisfies the flag's auth and permission requirements.
    #[must_use]
    pub fn is_usable(&self, id: &str, access: &AccessContext) -> bool {
        self.is_enabled(id) && self.descriptor(id).is_some_and(|d| d.permits(access))
    }

    /// Binding for one flag.
    pub fn bind(&self, id: impl Into<FlagId>) -> FlagBinding {
        FlagBinding::new(self, id.into())
    }

    /// Binding for a fixed set of flags.
    pub fn bind_set<I, K>(&self, ids: I) -> FlagSetBinding
    where
        I: IntoIterator<Item = K>,
        K: Into<FlagId>,
    {
        FlagSetBinding::new(self, ids.into_iter().map(Into::into).collect())
    }

    /// Binding for a module and every sub-feature below it in the catalog.
    pub fn bind_module(&self, module: impl Into<FlagId>) -> ModuleBinding {
        ModuleBinding::new(self, module.into())
    }

    /// Starts an administrative edit session over the current values.
    #[must_use]
    pub fn draft(&self) -> FlagDraft {
        FlagDraft::new(self.clone())
    }
}
