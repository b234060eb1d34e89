use crate::flag::FlagId;
use std::borrow::Cow;

/// Catalog construction failures. These are definition bugs, not runtime conditions.
#[flagkit_derive::flagkit_error]
#[derive(Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Flag id `{id}` is declared more than once{}", format_context(.context))]
    DuplicateId { id: FlagId, context: Option<Cow<'static, str>> },

    #[error("Flag id cannot be empty{}", format_context(.context))]
    EmptyId { context: Option<Cow<'static, str>> },
}

pub use permission::{PermissionError, PermissionErrorExt};

// Separate module: each `flagkit_error` expansion emits its own `format_context` helper.
mod permission {
    use std::borrow::Cow;

    /// A permission name outside the known vocabulary. Such names never parse to the empty set.
    #[flagkit_derive::flagkit_error]
    #[derive(Clone, PartialEq, Eq)]
    pub enum PermissionError {
        #[error("Unknown permission `{name}`{}", format_context(.context))]
        Unknown { name: Cow<'static, str>, context: Option<Cow<'static, str>> },
    }
}
