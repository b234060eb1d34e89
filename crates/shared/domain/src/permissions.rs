use crate::error::PermissionError;
use bitflags::bitflags;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const ADMIN: &str = "admin";
pub const USER_MANAGER: &str = "user-manager";
pub const SECURITY_ADMIN: &str = "security-admin";
pub const REPORTS_VIEWER: &str = "reports-viewer";
pub const FINANCE_MANAGER: &str = "finance-manager";

bitflags! {
    /// Permissions a caller must hold (any of them) to use a feature.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Permissions: u32 {
        const ADMIN = 1 << 0;
        const USER_MANAGER = 1 << 1;
        const SECURITY_ADMIN = 1 << 2;
        const REPORTS_VIEWER = 1 << 3;
        const FINANCE_MANAGER = 1 << 4;

        const ALL = Self::ADMIN.bits()
            | Self::USER_MANAGER.bits()
            | Self::SECURITY_ADMIN.bits()
            | Self::REPORTS_VIEWER.bits()
            | Self::FINANCE_MANAGER.bits();
    }
}

const NAMES: [(&str, Permissions); 5] = [
    (ADMIN, Permissions::ADMIN),
    (USER_MANAGER, Permissions::USER_MANAGER),
    (SECURITY_ADMIN, Permissions::SECURITY_ADMIN),
    (REPORTS_VIEWER, Permissions::REPORTS_VIEWER),
    (FINANCE_MANAGER, Permissions::FINANCE_MANAGER),
];

impl Permissions {
    /// Permission names contained in this set, in declaration order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        NAMES.into_iter().filter(move |(_, p)| self.contains(*p)).map(|(name, _)| name)
    }

    /// Parses a list of names into one set.
    ///
    /// # Errors
    /// Returns [`PermissionError::Unknown`] for the first name outside the vocabulary.
    pub fn parse_all<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self, PermissionError> {
        names.into_iter().try_fold(Self::empty(), |acc, name| Ok(acc | name.parse::<Self>()?))
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromStr for Permissions {
    type Err = PermissionError;

    /// Parses one permission name; `all` and `*` mean every permission.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "all" | "*" => Ok(Self::ALL),
            other => NAMES.iter().find(|(known, _)| *known == other).map(|(_, p)| *p).ok_or_else(
                || PermissionError::Unknown { name: other.to_owned().into(), context: None },
            ),
        }
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for name in self.names() {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.bits().count_ones() as usize))?;
        for name in self.names() {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NamesVisitor;

        impl<'de> Visitor<'de> for NamesVisitor {
            type Value = Permissions;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of permission names")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut set = Permissions::empty();
                while let Some(name) = seq.next_element::<String>()? {
                    set |= name.parse::<Permissions>().map_err(de::Error::custom)?;
                }
                Ok(set)
            }
        }

        deserializer.deserialize_seq(NamesVisitor)
    }
}

/// Who is asking to use a feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessContext {
    pub authenticated: bool,
    pub permissions: Permissions,
}

impl AccessContext {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { authenticated: false, permissions: Permissions::empty() }
    }

    #[must_use]
    pub const fn authenticated(permissions: Permissions) -> Self {
        Self { authenticated: true, permissions }
    }
}
