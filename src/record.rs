//! Password records as returned by the vault.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::id::{IdError, VaultId};

/// Record fields exposed as facts, in the vault's spelling.
pub const FIELDS: &[&str] = &[
    "PasswordID",
    // Not one of the entry's own fields, but every record carries it and
    // callers need it to address follow-up writes; 24 facts in total.
    "PasswordListID",
    "Password",
    "UserName",
    "Title",
    "HostName",
    "Domain",
    "Description",
    "Notes",
    "URL",
    "AccountType",
    "AccountTypeID",
    "GenericField1",
    "GenericField2",
    "GenericField3",
    "GenericField4",
    "GenericField5",
    "GenericField6",
    "GenericField7",
    "GenericField8",
    "GenericField9",
    "GenericField10",
    "GenericFieldInfo",
    "ExpiryDate",
];

/// One password entry. Field values are kept exactly as the vault sent them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The record's `PasswordID`.
    pub fn password_id(&self) -> Result<VaultId, IdError> {
        VaultId::from_json(self.get("PasswordID").unwrap_or(&Value::Null))
    }

    /// True if `field` holds `value`.
    ///
    /// Numbers match their decimal rendering; missing fields never match.
    pub fn field_matches(&self, field: &str, value: &str) -> bool {
        match self.get(field) {
            Some(Value::String(s)) => s == value,
            Some(Value::Number(n)) => n.to_string() == value,
            _ => false,
        }
    }

    /// True if `field` is a string equal to `value`.
    pub fn field_equals(&self, field: &str, value: &str) -> bool {
        matches!(self.get(field), Some(Value::String(s)) if s == value)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
