//! # Domain Models
//!
//! Flag identifiers, descriptors, permissions and the catalog tree with its traversal helpers.
//! Construction validates the tree (unique, non-blank ids) and permission names parse against a
//! closed vocabulary. Keep it lean: no I/O, no locks, no runtime state.

pub mod catalog;
pub mod config;
mod error;
pub mod flag;
pub mod permissions;

pub use catalog::{CatalogEntry, FlagCatalog, FlagDescriptor, group_in_order};
pub use error::{CatalogError, CatalogErrorExt, PermissionError, PermissionErrorExt};
pub use flag::{FlagId, FlagMap};
pub use permissions::{AccessContext, Permissions};
