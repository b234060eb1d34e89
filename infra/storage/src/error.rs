use std::borrow::Cow;

/// A specialized [`StorageError`] enum of this crate.
#[flagkit_derive::flagkit_error]
pub enum StorageError {
    #[error("Invalid storage key{}: {message}", format_context(.context))]
    InvalidKey { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Hardware I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Malformed flag document{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Unexpected flag document shape{}: {message}", format_context(.context))]
    Corrupt { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Storage unavailable{}: {message}", format_context(.context))]
    Unavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal storage error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl StorageError {
    /// The stored document exists but cannot be read as a flag map.
    ///
    /// Callers treat this as "nothing persisted" rather than as a broken backend.
    #[must_use]
    pub const fn is_corrupt(&self) -> bool {
        matches!(self, Self::Json { .. } | Self::Corrupt { .. })
    }
}
