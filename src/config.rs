//! Connection configuration.
//!
//! Settings come from an optional `passwordstate.toml` and are overridden by
//! command-line parameters:
//!
//! ```toml
//! url = "https://passwordstate.example.com"
//! api_key = "abc123xyz"
//! timeout = "30s"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;

use crate::client::{ClientOptions, VaultClient};
use crate::credentials::Credentials;
use crate::duration::deserialize_duration_opt;

const CONFIG_FILE_NAME: &str = "passwordstate.toml";

#[derive(Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base URL of the vault, without the `/api/` or `/winapi/` suffix.
    pub url: Option<String>,

    pub api_key: Option<String>,

    /// Windows login, optionally `DOMAIN\user`.
    pub api_username: Option<String>,

    pub api_password: Option<String>,

    /// Per-request timeout. Defaults to 30 seconds.
    #[serde(default, deserialize_with = "deserialize_duration_opt")]
    pub timeout: Option<Duration>,

    pub user_agent: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("api_key", &redact(&self.api_key))
            .field("api_username", &self.api_username)
            .field("api_password", &redact(&self.api_password))
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load config from a file, or return an empty config if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Layer `overrides` on top of this config; values set in `overrides` win.
    ///
    /// Credentials are replaced as a group so that, for example, an API key
    /// given on the command line is not combined with a username from the file.
    pub fn with_overrides(self, overrides: Config) -> Self {
        let override_credentials = overrides.api_key.is_some()
            || overrides.api_username.is_some()
            || overrides.api_password.is_some();

        let (api_key, api_username, api_password) = if override_credentials {
            (overrides.api_key, overrides.api_username, overrides.api_password)
        } else {
            (self.api_key, self.api_username, self.api_password)
        };

        Self {
            url: overrides.url.or(self.url),
            api_key,
            api_username,
            api_password,
            timeout: overrides.timeout.or(self.timeout),
            user_agent: overrides.user_agent.or(self.user_agent),
        }
    }

    /// Validate and convert the credential parameters.
    pub fn credentials(&self) -> Result<Credentials> {
        let credentials = Credentials::from_parts(
            self.api_key.clone().map(SecretString::from),
            self.api_username.clone(),
            self.api_password.clone().map(SecretString::from),
        )?;
        Ok(credentials)
    }

    pub fn client_options(&self) -> ClientOptions {
        let mut options = ClientOptions::default();
        if let Some(timeout) = self.timeout {
            options.timeout = timeout;
        }
        if let Some(user_agent) = &self.user_agent {
            options.user_agent = user_agent.clone();
        }
        options
    }

    /// Build a vault client from this config.
    pub fn connect(&self) -> Result<VaultClient> {
        let url = self
            .url
            .as_deref()
            .context("missing required argument: url")?;
        let client = VaultClient::with_options(url, self.credentials()?, self.client_options())?;
        Ok(client)
    }
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./passwordstate.toml` if it exists in current directory
/// 2. `~/.config/passwordstate/passwordstate.toml` (XDG config directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from(CONFIG_FILE_NAME);
    if local_config.exists() {
        return local_config;
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("passwordstate").join(CONFIG_FILE_NAME);
    }

    local_config
}
