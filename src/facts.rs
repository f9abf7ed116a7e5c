//! Projection of a password record onto flat, prefixed fact names.

use serde_json::{Map, Value};

use crate::client::VaultClient;
use crate::error::Result;
use crate::locator::PasswordTarget;
use crate::record::{Record, FIELDS};
use crate::resolver::Resolver;

/// Map every field of [`FIELDS`] to `{prefix}_{lowercased field}`.
///
/// Values are copied verbatim; fields the record lacks become `null`.
pub fn gather_facts(prefix: &str, record: &Record) -> Map<String, Value> {
    FIELDS
        .iter()
        .map(|field| {
            let key = format!("{prefix}_{}", field.to_lowercase());
            let value = record.get(field).cloned().unwrap_or(Value::Null);
            (key, value)
        })
        .collect()
}

/// Resolve `target` and gather its facts.
pub async fn fetch_facts(
    client: &VaultClient,
    target: &PasswordTarget,
    prefix: &str,
) -> Result<Map<String, Value>> {
    let record = Resolver::new(client).resolve(target).await?;
    Ok(gather_facts(prefix, &record))
}
