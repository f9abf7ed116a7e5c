//! Create, update and read Passwordstate password entries.
//!
//! The crate backs two automation modules:
//!
//! - [`update::ensure_present`] creates or updates a password idempotently,
//! - [`facts::fetch_facts`] exposes a password's fields as prefixed facts.

pub mod client;
pub mod config;
pub mod credentials;
pub mod duration;
pub mod error;
pub mod facts;
pub mod id;
pub mod locator;
pub mod ntlm;
pub mod record;
pub mod report;
pub mod resolver;
pub mod update;

pub use client::{Method, Params, VaultClient};
pub use credentials::Credentials;
pub use error::{Error, Result};
pub use locator::{Locator, PasswordTarget};
pub use record::Record;
pub use resolver::Resolver;
pub use update::{DesiredFields, UpdateOutcome};
