use std::borrow::Cow;

/// Errors raised by the administrative surface. The store itself never fails.
#[flagkit_derive::flagkit_error]
pub enum ToggleError {
    /// The id is not part of the catalog.
    #[error("Unknown flag{}: {message}", format_context(.context))]
    UnknownFlag { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal toggle error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
