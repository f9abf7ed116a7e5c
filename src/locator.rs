//! Identification of the password a module invocation operates on.

use crate::error::{Error, Result};
use crate::id::VaultId;

/// How to find a password on the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Direct lookup by password id.
    ById(VaultId),
    /// The single password in the list whose `field` equals `value`.
    ByMatchField { field: String, value: String },
}

/// A locator together with the password list it is scoped to.
///
/// The list id is mandatory for match-field lookups (the list is what gets
/// searched) and optional for id lookups, where it is only forwarded as
/// `PasswordListID` on updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordTarget {
    pub list_id: Option<VaultId>,
    pub locator: Locator,
}

impl PasswordTarget {
    /// Build a target from optional module parameters.
    ///
    /// A password id takes priority; otherwise both the match field and the
    /// value to match must be present.
    pub fn from_parts(
        list_id: Option<&str>,
        password_id: Option<&str>,
        match_field: Option<&str>,
        match_value: Option<&str>,
    ) -> Result<Self> {
        let list_id = list_id.map(VaultId::new).transpose()?;

        let locator = match (password_id, match_field, match_value) {
            (Some(id), _, _) => Locator::ById(VaultId::new(id)?),
            (None, Some(field), Some(value)) => {
                if list_id.is_none() {
                    return Err(Error::Construction);
                }
                Locator::ByMatchField {
                    field: field.to_string(),
                    value: value.to_string(),
                }
            }
            _ => return Err(Error::Construction),
        };

        Ok(Self { list_id, locator })
    }

    pub fn by_id(list_id: Option<VaultId>, password_id: VaultId) -> Self {
        Self {
            list_id,
            locator: Locator::ById(password_id),
        }
    }

    pub fn by_match_field(
        list_id: VaultId,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            list_id: Some(list_id),
            locator: Locator::ByMatchField {
                field: field.into(),
                value: value.into(),
            },
        }
    }
}
