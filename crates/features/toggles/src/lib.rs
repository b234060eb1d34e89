//! # Toggles
//!
//! The feature-flag engine: a store of boolean flags described by a [`FlagCatalog`],
//! persisted through a [`FlagStorage`](flagkit_storage::FlagStorage), with synchronous change
//! notification and reactive bindings for UI code.
//!
//! ## Architecture
//!
//! 1.  **Store ([`FlagStore`]):** current values, reconciled with storage once at startup.
//!     Every effective change notifies observers, then persists the current state.
//! 2.  **Manager ([`FlagManager`]):** the cloneable handle applications pass around.
//! 3.  **Bindings ([`FlagBinding`], [`FlagSetBinding`], [`ModuleBinding`]):** cached values
//!     kept current by a filtered subscription, exposed through `tokio::sync::watch`.
//! 4.  **Draft ([`FlagDraft`]):** staged administrative edits committed as one batch.
//!
//! Unknown ids read as disabled and writes to them are ignored with a warning. Storage
//! failures switch the store to memory-only mode and are never returned to callers.
//!
//! [`FlagCatalog`]: flagkit_domain::FlagCatalog

mod bindings;
mod draft;
mod error;
mod manager;
mod store;

pub use crate::bindings::{FlagBinding, FlagSetBinding, ModuleBinding, ModuleState};
pub use crate::draft::{DraftEntry, FlagDraft};
pub use crate::error::{ToggleError, ToggleErrorExt};
pub use crate::manager::FlagManager;
pub use crate::store::FlagStore;
