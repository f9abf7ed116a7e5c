//! Idempotent create-or-update of a password entry.
//!
//! Running [`ensure_present`] twice with the same password, title and user
//! name writes at most once: the second run finds them already in place.
//! Other fields cannot be read back for comparison, so supplying one always
//! writes.

use tracing::{info, warn};

use crate::client::{Method, Params, VaultClient};
use crate::error::{Error, Result};
use crate::locator::{Locator, PasswordTarget};
use crate::record::Record;
use crate::resolver::Resolver;

/// Desired fields compared against the current record, as
/// `(desired field, record field)` pairs.
///
/// These are the only fields whose current value is checked. Any other
/// desired field cannot be checked and always forces a write.
pub const COMPARED_FIELDS: &[(&str, &str)] = &[
    ("password", "Password"),
    ("Title", "Title"),
    ("UserName", "UserName"),
];

/// Parameters that identify the record being written.
pub const IDENTIFYING_PARAMS: &[&str] = &["PasswordID", "PasswordListID"];

/// Field values the caller wants the password entry to have.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredFields(Params);

impl DesiredFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        self.with_field("Title", title)
    }

    pub fn with_username(self, username: impl Into<String>) -> Self {
        self.with_field("UserName", username)
    }

    pub fn with_password(self, password: impl Into<String>) -> Self {
        self.with_field("password", password)
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn as_params(&self) -> &Params {
        &self.0
    }
}

/// What [`ensure_present`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Unchanged,
    Updated,
    Created,
}

impl UpdateOutcome {
    pub fn changed(self) -> bool {
        !matches!(self, UpdateOutcome::Unchanged)
    }
}

/// Overlay `overrides` onto `base`; on a key collision the override wins.
///
/// Callers pass identifying parameters as `base`, so a desired field named
/// like one of them replaces it. That is logged because it redirects the
/// write to another record.
pub fn overlay(base: &Params, overrides: &Params) -> Params {
    let mut merged = base.clone();
    for (key, value) in overrides {
        if let Some(previous) = merged.insert(key.clone(), value.clone()) {
            if IDENTIFYING_PARAMS.contains(&key.as_str()) && previous != *value {
                warn!(
                    param = key.as_str(),
                    "desired field overrides identifying parameter"
                );
            }
        }
    }
    merged
}

/// True if every desired field is a compared field that already holds its value.
///
/// A desired field outside [`COMPARED_FIELDS`] makes the record stale.
pub fn is_up_to_date(current: &Record, desired: &DesiredFields) -> bool {
    desired.as_params().iter().all(|(name, value)| {
        COMPARED_FIELDS
            .iter()
            .find(|(desired_name, _)| desired_name == name)
            .is_some_and(|(_, record_name)| current.field_equals(record_name, value))
    })
}

/// Make sure the targeted password exists with the desired fields.
///
/// - existing and up to date: nothing is written,
/// - existing but stale, or addressed by id: `PUT passwords`,
/// - missing and addressed by match field: `POST passwords`, which needs a `Title`.
pub async fn ensure_present(
    client: &VaultClient,
    target: &PasswordTarget,
    desired: &DesiredFields,
) -> Result<UpdateOutcome> {
    let current = Resolver::new(client).lookup(target).await?;

    if let Some(record) = &current {
        if is_up_to_date(record, desired) {
            info!("password is up to date");
            return Ok(UpdateOutcome::Unchanged);
        }
    }

    let mut ids = Params::new();
    if let Some(list_id) = &target.list_id {
        ids.insert("PasswordListID".to_string(), list_id.to_string());
    }

    match (&target.locator, current) {
        (Locator::ById(id), _) => {
            ids.insert("PasswordID".to_string(), id.to_string());
            put(client, &ids, desired).await
        }
        (Locator::ByMatchField { .. }, Some(record)) => {
            ids.insert("PasswordID".to_string(), record.password_id()?.to_string());
            put(client, &ids, desired).await
        }
        (Locator::ByMatchField { field, value }, None) => {
            if !desired.contains("Title") {
                return Err(Error::MissingRequiredField("Title"));
            }
            ids.insert(field.clone(), value.clone());

            let params = overlay(&ids, desired.as_params());
            client
                .request("passwords", Method::Post, Some(&params))
                .await?;
            info!(field = field.as_str(), "created password");
            Ok(UpdateOutcome::Created)
        }
    }
}

async fn put(client: &VaultClient, ids: &Params, desired: &DesiredFields) -> Result<UpdateOutcome> {
    let params = overlay(ids, desired.as_params());
    client
        .request("passwords", Method::Put, Some(&params))
        .await?;
    info!(password_id = ids.get("PasswordID").map(String::as_str), "updated password");
    Ok(UpdateOutcome::Updated)
}
