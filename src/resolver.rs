//! Turning a [`PasswordTarget`] into exactly one vault record.
//!
//! Match-field lookups are two steps: the list endpoint is queried with
//! passwords excluded and filtered client side, then the single match is
//! fetched again by id to get the full record including the password.

use serde_json::Value;
use tracing::debug;

use crate::client::{Method, VaultClient};
use crate::error::{Error, Result};
use crate::id::VaultId;
use crate::locator::{Locator, PasswordTarget};
use crate::record::Record;

pub struct Resolver<'a> {
    client: &'a VaultClient,
}

impl<'a> Resolver<'a> {
    pub fn new(client: &'a VaultClient) -> Self {
        Self { client }
    }

    /// Fetch the single record identified by `target`.
    ///
    /// Fails with [`Error::NotFound`] when nothing matches and
    /// [`Error::AmbiguousMatch`] when more than one record does.
    pub async fn resolve(&self, target: &PasswordTarget) -> Result<Record> {
        self.lookup(target).await?.ok_or(Error::NotFound)
    }

    /// Like [`Resolver::resolve`], but a missing record is `Ok(None)`.
    ///
    /// Ambiguity is still an error. For match-field targets only the list
    /// step may come back empty; the follow-up fetch by id must find the record.
    pub async fn lookup(&self, target: &PasswordTarget) -> Result<Option<Record>> {
        match &target.locator {
            Locator::ById(id) => at_most_one(self.fetch_by_id(id).await?),
            Locator::ByMatchField { field, value } => {
                let list_id = target.list_id.as_ref().ok_or(Error::Construction)?;
                let Some(summary) = at_most_one(self.list_matches(list_id, field, value).await?)?
                else {
                    return Ok(None);
                };
                let id = summary.password_id()?;
                debug!(%id, field = field.as_str(), "match field resolved to password id");

                let record = at_most_one(self.fetch_by_id(&id).await?)?.ok_or(Error::NotFound)?;
                Ok(Some(record))
            }
        }
    }

    /// Whether exactly one record matches. More than one is still an error.
    pub async fn has_password(&self, target: &PasswordTarget) -> Result<bool> {
        let records = match &target.locator {
            Locator::ById(id) => self.fetch_by_id(id).await?,
            Locator::ByMatchField { field, value } => {
                let list_id = target.list_id.as_ref().ok_or(Error::Construction)?;
                self.list_matches(list_id, field, value).await?
            }
        };
        Ok(at_most_one(records)?.is_some())
    }

    async fn fetch_by_id(&self, id: &VaultId) -> Result<Vec<Record>> {
        let body = self
            .client
            .request(&format!("passwords/{id}"), Method::Get, None)
            .await?;
        decode_records(body)
    }

    /// Records of a list whose `field` equals `value`, without password values.
    async fn list_matches(&self, list_id: &VaultId, field: &str, value: &str) -> Result<Vec<Record>> {
        let body = self
            .client
            .request(
                &format!("passwords/{list_id}?QueryAll&ExcludePassword=true"),
                Method::Get,
                None,
            )
            .await?;
        let records = decode_records(body)?;
        let total = records.len();

        let matches: Vec<Record> = records
            .into_iter()
            .filter(|record| record.field_matches(field, value))
            .collect();
        debug!(%list_id, field, total, matched = matches.len(), "filtered password list");
        Ok(matches)
    }
}

fn decode_records(body: Value) -> Result<Vec<Record>> {
    serde_json::from_value(body).map_err(Error::Decode)
}

fn at_most_one(mut records: Vec<Record>) -> Result<Option<Record>> {
    match records.len() {
        0 => Ok(None),
        1 => Ok(records.pop()),
        _ => Err(Error::AmbiguousMatch),
    }
}
