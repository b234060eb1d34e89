//! Facade crate for the flag engine.
//! Re-exports the domain, kernel, storage, observer and toggle crates and wires them together
//! at startup. Keep this crate thin: it composes other crates, it does not implement flag
//! semantics.
//!
//! ## Usage
//! ```rust
//! use flagkit::domain::config::{FlagkitConfig, StorageBackend};
//! use flagkit::kernel::catalog::BuiltinFlag;
//!
//! let mut config = FlagkitConfig::default();
//! config.storage.backend = StorageBackend::Memory;
//!
//! let flags = flagkit::bootstrap(&config).unwrap();
//! assert!(!flags.is_enabled(BuiltinFlag::ReportsModule.as_ref()));
//! ```

mod error;

pub use error::{FlagkitError, FlagkitErrorExt};
pub use flagkit_domain as domain;
pub use flagkit_kernel as kernel;
#[cfg(feature = "logger")]
pub use flagkit_logger as logger;
pub use flagkit_observers as observers;
pub use flagkit_storage as storage;
pub use flagkit_toggles as toggles;

pub use flagkit_domain::{AccessContext, FlagCatalog, FlagDescriptor, FlagId, FlagMap, Permissions};
pub use flagkit_toggles::FlagManager;

use flagkit_domain::config::FlagkitConfig;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Opens the built-in catalog over the storage described by `config`.
///
/// # Errors
/// Returns [`FlagkitError::Storage`] if the backend cannot be opened. Problems with the stored
/// document itself are not errors; the manager falls back to memory-only mode.
pub fn bootstrap(config: &FlagkitConfig) -> Result<FlagManager, FlagkitError> {
    bootstrap_with(flagkit_kernel::catalog::builtin(), config)
}

/// Like [`bootstrap`], with an application-supplied catalog.
///
/// # Errors
/// Returns [`FlagkitError::Storage`] if the backend cannot be opened.
pub fn bootstrap_with(
    catalog: impl Into<Arc<FlagCatalog>>,
    config: &FlagkitConfig,
) -> Result<FlagManager, FlagkitError> {
    let storage = flagkit_storage::connect(&config.storage)
        .context(format!("backend {:?}", config.storage.backend))?;

    let flags = FlagManager::open(catalog, storage);
    info!(
        backend = ?config.storage.backend,
        persistent = flags.is_persistent(),
        "Flag engine bootstrapped"
    );
    Ok(flags)
}

/// Loads the layered config (optional file plus `FLAGKIT__` environment overrides).
///
/// # Errors
/// Returns [`FlagkitError::Config`] if the file exists but cannot be parsed.
pub fn load_config(path: Option<&Path>) -> Result<FlagkitConfig, FlagkitError> {
    Ok(flagkit_kernel::config::load_config(path)?)
}

/// Installs the global tracing subscriber described by `config.logging`.
///
/// Keep the returned guard alive for as long as file output should be flushed.
///
/// # Errors
/// Returns [`FlagkitError::Logger`] for a malformed filter or if a subscriber is already set.
#[cfg(feature = "logger")]
pub fn init_logging(name: &str, config: &FlagkitConfig) -> Result<flagkit_logger::Logger, FlagkitError> {
    Ok(flagkit_logger::Logger::from_config(name, &config.logging)?)
}
