use flagkit_kernel::config::ConfigError;
use flagkit_storage::StorageError;
use std::borrow::Cow;

#[flagkit_derive::flagkit_error]
pub enum FlagkitError {
    #[error("Configuration failed{}: {source}", format_context(.context))]
    Config { source: ConfigError, context: Option<Cow<'static, str>> },

    #[error("Storage could not be opened{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    #[cfg(feature = "logger")]
    #[error("Logger initialization failed{}: {source}", format_context(.context))]
    Logger { source: flagkit_logger::LoggerError, context: Option<Cow<'static, str>> },
}
