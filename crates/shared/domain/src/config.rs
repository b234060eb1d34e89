use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Default storage key, matching the key the web shell used in local storage.
pub const DEFAULT_STORAGE_KEY: &str = "featureFlags";

/// Top-level configuration for an application embedding the flag engine.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlagkitConfigInner {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct FlagkitConfig {
    #[serde(flatten, default)]
    inner: Arc<FlagkitConfigInner>,
}

impl Deref for FlagkitConfig {
    type Target = FlagkitConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for FlagkitConfig {
    fn deref_mut(&mut self) -> &mut FlagkitConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Where flag state is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// A JSON document under `data_dir`.
    #[default]
    File,
    /// Process memory only; nothing survives a restart.
    Memory,
}

/// Persistence settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
    pub key: String,
    /// Defer writes to a background task instead of writing inline.
    pub write_behind: bool,
}

/// Logging settings consumed by the logger crate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub dir: Option<PathBuf>,
}

// --- Default ---

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            data_dir: PathBuf::from("."),
            key: DEFAULT_STORAGE_KEY.to_owned(),
            write_behind: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), json: false, dir: None }
    }
}
