//! Kernel utilities shared across slices.
//! Keep this crate lightweight: it owns the compiled-in flag catalog and config loading,
//! nothing that holds runtime state.
//!
//! ## Built-in catalog
//! ```rust
//! use flagkit_kernel::catalog::{self, BuiltinFlag};
//!
//! let catalog = catalog::builtin();
//! assert_eq!(catalog.default_of(BuiltinFlag::ReportsModule.as_ref()), Some(false));
//! ```
//!
//! ## Config loading (non-wasm)
//! ```rust
//! use flagkit_kernel::config::{ConfigError, load_config};
//! use flagkit_kernel::domain::config::{FlagkitConfig, StorageBackend};
//!
//! # fn main() -> Result<(), ConfigError> {
//! // A missing file is fine: every field has a default.
//! let cfg: FlagkitConfig = load_config(Some("flagkit"))?;
//! assert_eq!(cfg.storage.backend, StorageBackend::File);
//! # Ok(())
//! # }
//! ```
pub mod catalog;
#[cfg(not(target_arch = "wasm32"))]
pub mod config;

pub use flagkit_domain as domain;
