use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error(
    "Invalid id {value:?}: ids must be a single URL path segment (no '/', '\\\\', '?', '#', NUL, '.' or '..')"
)]
pub struct IdError {
    value: String,
}

/// Identifier of a password or password list on the vault.
///
/// Ids are interpolated into request paths (`passwords/{id}`), so they must be
/// safe single path segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VaultId(String);

impl VaultId {
    /// Create an id, validating that it is a safe path segment.
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if Self::is_path_safe(&value) {
            Ok(Self(value))
        } else {
            Err(IdError { value })
        }
    }

    /// Read an id out of a JSON record field.
    ///
    /// The vault returns `PasswordID` as a number, but strings are accepted too.
    pub fn from_json(value: &Value) -> Result<Self, IdError> {
        match value {
            Value::String(s) => Self::new(s.clone()),
            Value::Number(n) => Self::new(n.to_string()),
            other => Err(IdError {
                value: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the string is safe to use as a single path segment.
    pub fn is_path_safe(value: &str) -> bool {
        if value.is_empty() || value == "." || value == ".." {
            return false;
        }
        !value
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '?' | '#' | '\0'))
    }
}

impl fmt::Display for VaultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for VaultId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
