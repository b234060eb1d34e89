use crate::error::{StorageError, StorageErrorExt};
use crate::file::{JsonFileStorage, JsonFileStorageInner};
use crate::key::StorageKey;
use crate::maintenance;
use flagkit_domain::config::DEFAULT_STORAGE_KEY;
use private::Sealed;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tracing::info;

#[derive(Debug, Clone)]
struct FileConfig {
    key: String,
    create: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self { key: DEFAULT_STORAGE_KEY.to_owned(), create: true }
    }
}

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct JsonFileStorageBuilder<S: Sealed = NoRoot> {
    state: S,
    config: FileConfig,
}

#[allow(private_bounds)]
impl<S: Sealed> JsonFileStorageBuilder<S> {
    #[must_use = "Sets the key the flag document is stored under"]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.config.key = key.into();
        self
    }

    #[must_use = "Sets whether the data directory should be created if it does not exist"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.config.create = enable;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> JsonFileStorageBuilder<N> {
        JsonFileStorageBuilder { state, config: self.config }
    }
}

impl JsonFileStorageBuilder<NoRoot> {
    #[must_use = "Creates a new file storage builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the directory the flag document lives in"]
    pub fn root(self, path: impl Into<PathBuf>) -> JsonFileStorageBuilder<WithRoot> {
        self.transition(WithRoot(path.into()))
    }
}

impl JsonFileStorageBuilder<WithRoot> {
    /// Validates the configuration and prepares the data directory.
    ///
    /// 1. **Validation**: the key must be non-empty ASCII alphanumerics, `_` or `-`.
    /// 2. **Bootstrapping**: creates the directory if `create(true)` was set.
    /// 3. **Canonicalization**: resolves the directory to an absolute physical path.
    /// 4. **Self-Healing**: removes stale temp files left by interrupted writes.
    ///
    /// Nothing is read here; a missing document is reported by the first `load`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] for a bad key, and [`StorageError::Io`] if the
    /// directory does not exist (with `create(false)`) or cannot be created or resolved.
    pub fn open(self) -> Result<JsonFileStorage, StorageError> {
        let key = StorageKey::try_from(self.config.key)?;
        let root = &self.state.0;

        if self.config.create {
            fs::create_dir_all(root)
                .context(format!("Failed to bootstrap data directory: {}", root.display()))?;
        }

        let canonical = fs::canonicalize(root)
            .context(format!("Failed to resolve data directory: {}", root.display()))?;

        let path = canonical.join(format!("{key}.json"));
        info!(path = %path.display(), "Opened flag file storage");

        maintenance::purge_tmp(&canonical, key.as_str());

        Ok(JsonFileStorage {
            inner: Arc::new(JsonFileStorageInner {
                root: canonical,
                key,
                path,
                tmp_counter: AtomicU64::new(1),
            }),
        })
    }
}
