use std::borrow::Cow;

/// Errors that can occur while wiring observers.
#[flagkit_derive::flagkit_error]
pub enum ObserverError {
    /// Capacity must be greater than zero for bounded channels.
    #[error("Invalid capacity{}: {message}", format_context(.context))]
    InvalidCapacity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
