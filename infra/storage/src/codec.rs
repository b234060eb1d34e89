//! The persisted document: one JSON object mapping flag ids to booleans.

use crate::error::{StorageError, StorageErrorExt};
use flagkit_domain::{FlagId, FlagMap};
use serde_json::Value;

/// What a backend found under its key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedFlags {
    /// Entries whose value is a JSON boolean.
    pub values: FlagMap,
    /// Entries present with a non-boolean value. They count as missing.
    pub invalid: Vec<FlagId>,
}

impl PersistedFlags {
    #[must_use]
    pub fn get(&self, id: &str) -> Option<bool> {
        self.values.get(id).copied()
    }
}

impl From<FlagMap> for PersistedFlags {
    fn from(values: FlagMap) -> Self {
        Self { values, invalid: Vec::new() }
    }
}

/// Serializes the flag map as a compact JSON object.
///
/// # Errors
/// Returns [`StorageError::Json`] if serialization fails.
pub fn encode(flags: &FlagMap) -> Result<Vec<u8>, StorageError> {
    serde_json::to_vec(flags).context("Failed to encode flag document")
}

/// Parses a flag document leniently.
///
/// The top level must be a JSON object. Non-boolean members are reported in
/// [`PersistedFlags::invalid`] instead of failing the whole document.
///
/// # Errors
/// Returns [`StorageError::Json`] for malformed JSON and [`StorageError::Corrupt`] when the
/// top level is not an object.
pub fn decode(bytes: &[u8]) -> Result<PersistedFlags, StorageError> {
    let Value::Object(members) =
        serde_json::from_slice::<Value>(bytes).context("Failed to parse flag document")?
    else {
        return Err(StorageError::Corrupt {
            message: "top-level value is not an object".into(),
            context: None,
        });
    };

    let mut persisted = PersistedFlags::default();
    for (key, value) in members {
        match value {
            Value::Bool(enabled) => {
                persisted.values.insert(FlagId::new(key), enabled);
            },
            _ => persisted.invalid.push(FlagId::new(key)),
        }
    }

    Ok(persisted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_boolean_members_are_reported() {
        let decoded = decode(br#"{"A": true, "B": "yes", "C": false, "D": null}"#).unwrap();
        assert_eq!(decoded.get("A"), Some(true));
        assert_eq!(decoded.get("C"), Some(false));
        assert_eq!(decoded.invalid, [FlagId::from("B"), FlagId::from("D")]);
    }

    #[test]
    fn non_object_documents_are_corrupt() {
        for doc in [&b"[true]"[..], b"null", b"42"] {
            let err = decode(doc).unwrap_err();
            assert!(matches!(err, StorageError::Corrupt { .. }), "{err}");
            assert!(err.is_corrupt());
        }
    }

    #[test]
    fn malformed_json_is_corrupt() {
        let err = decode(b"{not json").unwrap_err();
        assert!(matches!(err, StorageError::Json { .. }));
        assert!(err.is_corrupt());
    }

    #[test]
    fn encoding_is_a_flat_object() {
        let flags = FlagMap::from([(FlagId::from("B"), false), (FlagId::from("A"), true)]);
        assert_eq!(encode(&flags).unwrap(), br#"{"A":true,"B":false}"#);
    }
}
