use serde::{Deserialize, Serialize};
use std::borrow::{Borrow, Cow};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a single flag, e.g. `USERS_MODULE`.
///
/// The catalog decides which identifiers exist; a `FlagId` itself is just an opaque,
/// cheaply clonable string. Built-in identifiers are `&'static str` and never allocate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagId(Cow<'static, str>);

/// Flag values keyed by id, ordered for stable output and serialization.
pub type FlagMap = BTreeMap<FlagId, bool>;

impl FlagId {
    #[must_use]
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for FlagId {
    fn from(id: &'static str) -> Self {
        Self::from_static(id)
    }
}

impl From<String> for FlagId {
    fn from(id: String) -> Self {
        Self(Cow::Owned(id))
    }
}

impl From<&Self> for FlagId {
    fn from(id: &Self) -> Self {
        id.clone()
    }
}

impl AsRef<str> for FlagId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for FlagId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for FlagId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for FlagId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for FlagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
