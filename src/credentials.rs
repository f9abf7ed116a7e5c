//! Credentials used to authenticate against the vault.
//!
//! The vault exposes two API surfaces that differ only in how callers
//! authenticate:
//!
//! - `/api/` expects an `APIKey` header,
//! - `/winapi/` expects Windows (NTLM) authentication.

use secrecy::SecretString;

use crate::error::{Error, Result};

#[derive(Debug)]
pub enum Credentials {
    /// Password list API key sent in the `APIKey` header.
    ApiKey(SecretString),
    /// Windows account used for NTLM authentication.
    ///
    /// The username may carry a domain as `DOMAIN\user`.
    Windows {
        username: String,
        password: SecretString,
    },
}

impl Credentials {
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(SecretString::from(key.into()))
    }

    pub fn windows(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Windows {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Build credentials from loosely bound parameters.
    ///
    /// Exactly one of `api_key` and `username` must be set, and a username
    /// must come with a password.
    pub fn from_parts(
        api_key: Option<SecretString>,
        username: Option<String>,
        password: Option<SecretString>,
    ) -> Result<Self> {
        match (api_key, username, password) {
            (Some(_), Some(_), _) => Err(Error::InvalidCredentials(
                "parameters are mutually exclusive: api_key|api_username".to_string(),
            )),
            (Some(key), None, None) => Ok(Self::ApiKey(key)),
            (Some(_), None, Some(_)) => Err(Error::InvalidCredentials(
                "parameters are required together: api_username, api_password".to_string(),
            )),
            (None, Some(username), Some(password)) => Ok(Self::Windows { username, password }),
            (None, Some(_), None) | (None, None, Some(_)) => Err(Error::InvalidCredentials(
                "parameters are required together: api_username, api_password".to_string(),
            )),
            (None, None, None) => Err(Error::InvalidCredentials(
                "one of the following is required: api_key, api_username".to_string(),
            )),
        }
    }

    /// Base path segment of the API surface matching this credential kind.
    pub fn base_path(&self) -> &'static str {
        match self {
            Self::ApiKey(_) => "api",
            Self::Windows { .. } => "winapi",
        }
    }
}

/// Split a `DOMAIN\user` login into its domain and user parts.
///
/// Logins without a backslash have an empty domain.
pub(crate) fn split_domain(login: &str) -> (&str, &str) {
    match login.split_once('\\') {
        Some((domain, user)) => (domain, user),
        None => ("", login),
    }
}
