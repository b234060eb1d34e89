#![allow(unreachable_pub)]

//! # Macros
//!
//! Procedural macros for the flagkit infrastructure crates.
//!
//! Only one macro lives here today: [`macro@flagkit_error`], which turns a plain enum into
//! the error shape every infrastructure crate shares (message/source + optional context).

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for crate-level error enums.
///
/// # Injected Behaviors
///
/// * **Derives**: adds `Debug` and `thiserror::Error` unless already derived.
/// * **Context**: generates a `<Name>Ext` trait with `.context(...)` for
///   `Result<T, Name>` and for `Result<T, Source>` of every variant that wraps a source.
/// * **Conversions**: `From<Source>` for each source-carrying variant, and
///   `From<&'static str>` / `From<String>` when an `Internal` variant exists.
/// * **Formatting**: a private `format_context` helper for the `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. Only enums are accepted.
/// 2. Every variant uses named fields.
/// 3. A `context` field, when present, must be `Option<Cow<'static, str>>`.
/// 4. Variants with a source (`source` field, `#[source]` or `#[from]`) must also carry `context`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[flagkit_derive::flagkit_error]
/// pub enum StorageError {
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read() -> Result<Vec<u8>, StorageError> {
///     std::fs::read("flags.json").context("Reading persisted flags")
/// }
/// ```
#[proc_macro_attribute]
pub fn flagkit_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).unwrap_or_else(syn::Error::into_compile_error).into()
}
