//! Persistence for flag state.
//!
//! Everything goes through the [`FlagStorage`] port: `load` returns what was stored under the
//! configured key, `save` replaces it. The stored document is one JSON object mapping flag ids
//! to booleans, e.g. `{"DASHBOARD":true,"REPORTS_MODULE":false}`, with no version field.
//!
//! # Backends
//!
//! - **[`JsonFileStorage`]**: `<data_dir>/<key>.json`, written with an atomic swap (unique temp
//!   file + `fsync` + `rename`). Stale temp files are removed when the storage is opened.
//! - **[`MemoryStorage`]**: process-local text, with failure injection for tests.
//! - **[`WriteBehind`]**: wraps another backend and writes on a tokio task, latest snapshot
//!   wins.
//!
//! # Examples
//!
//! ```rust
//! use flagkit_domain::config::{StorageBackend, StorageConfig};
//! use flagkit_storage::{connect, StorageError};
//!
//! # fn main() -> Result<(), StorageError> {
//! # let tmp = tempfile::tempdir().unwrap();
//! let config = StorageConfig { data_dir: tmp.path().into(), ..StorageConfig::default() };
//! let storage = connect(&config)?;
//! assert!(storage.load()?.is_none());
//!
//! let memory = connect(&StorageConfig { backend: StorageBackend::Memory, ..config })?;
//! assert!(memory.load()?.is_none());
//! # Ok(())
//! # }
//! ```

mod builder;
pub mod codec;
mod error;
mod file;
mod key;
mod maintenance;
mod memory;
mod write_behind;

pub use builder::JsonFileStorageBuilder;
pub use codec::PersistedFlags;
pub use error::{StorageError, StorageErrorExt};
pub use file::JsonFileStorage;
pub use key::StorageKey;
pub use memory::MemoryStorage;
pub use write_behind::WriteBehind;

use flagkit_domain::FlagMap;
use flagkit_domain::config::{StorageBackend, StorageConfig};
use std::fmt;
use std::sync::Arc;

/// Where flag state is kept between runs.
///
/// Implementations are synchronous; callers that must not block wrap them in [`WriteBehind`].
pub trait FlagStorage: Send + Sync + fmt::Debug {
    /// Reads the stored document. `Ok(None)` means nothing has been stored yet.
    ///
    /// # Errors
    /// Backend failures, or a stored document that is not a JSON object
    /// (see [`StorageError::is_corrupt`]).
    fn load(&self) -> Result<Option<PersistedFlags>, StorageError>;

    /// Replaces the stored document with `flags`.
    ///
    /// # Errors
    /// Backend failures.
    fn save(&self, flags: &FlagMap) -> Result<(), StorageError>;
}

/// Opens the backend described by `config`.
///
/// With `write_behind` set, the backend is wrapped in a [`WriteBehind`], which requires a
/// running tokio runtime.
///
/// # Errors
/// Returns [`StorageError::InvalidKey`] or [`StorageError::Io`] if the file backend cannot be
/// opened, and [`StorageError::Unavailable`] if write-behind is requested outside a runtime.
pub fn connect(config: &StorageConfig) -> Result<Arc<dyn FlagStorage>, StorageError> {
    let backend: Arc<dyn FlagStorage> = match config.backend {
        StorageBackend::File => Arc::new(
            JsonFileStorage::builder().root(&config.data_dir).key(config.key.as_str()).open()?,
        ),
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
    };

    if config.write_behind {
        return Ok(Arc::new(WriteBehind::spawn(backend)?));
    }
    Ok(backend)
}
