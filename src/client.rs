//! JSON-over-HTTP client for the Passwordstate REST API.
//!
//! Every call is a single request/response pair:
//!
//! - API-key credentials hit `{url}/api/{path}` with an `APIKey` header,
//! - Windows credentials hit `{url}/winapi/{path}` through an NTLM handshake.
//!
//! Parameters always travel in the query string, including for PUT and POST.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::ntlm;

/// Request parameters, sent as query parameters.
pub type Params = BTreeMap<String, String>;

/// Highest status code the vault uses for a successful response.
///
/// Anything above it is an API error, including redirects.
const MAX_SUCCESS_STATUS: u16 = 204;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP verbs used against the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Post,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
        };
        f.write_str(name)
    }
}

/// Transport tuning for [`VaultClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("passwordstate/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Authenticated client bound to one vault instance.
#[derive(Debug)]
pub struct VaultClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl VaultClient {
    /// Create a client with default transport options.
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Result<Self> {
        Self::with_options(base_url, credentials, ClientOptions::default())
    }

    pub fn with_options(
        base_url: impl Into<String>,
        credentials: Credentials,
        options: ClientOptions,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(options.user_agent)
            .timeout(options.timeout)
            .build()
            .map_err(Error::Transport)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Full URL for an API path, including the credential-specific base path.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            self.credentials.base_path(),
            path.trim_start_matches('/')
        )
    }

    /// Send a request and decode the JSON response body.
    pub async fn request(
        &self,
        path: &str,
        method: Method,
        params: Option<&Params>,
    ) -> Result<Value> {
        let url = self.endpoint(path);
        debug!(%method, path, "sending vault request");

        let response = match &self.credentials {
            Credentials::ApiKey(key) => self
                .build(method, &url, params)
                .header("APIKey", key.expose_secret())
                .send()
                .await
                .map_err(Error::Transport)?,
            Credentials::Windows { username, password } => {
                self.send_ntlm(method, &url, params, username, password)
                    .await?
            }
        };

        let status = response.status().as_u16();
        let body = response.text().await.map_err(Error::Transport)?;
        debug!(status, bytes = body.len(), "vault responded");

        if status > MAX_SUCCESS_STATUS {
            return Err(Error::Api { status, body });
        }

        serde_json::from_str(&body).map_err(Error::Decode)
    }

    fn build(&self, method: Method, url: &str, params: Option<&Params>) -> RequestBuilder {
        let req = self
            .http
            .request(method.into(), url)
            .header("Accept", "application/json");
        match params {
            Some(params) if !params.is_empty() => req.query(params),
            _ => req,
        }
    }

    async fn send_ntlm(
        &self,
        method: Method,
        url: &str,
        params: Option<&Params>,
        username: &str,
        password: &SecretString,
    ) -> Result<Response> {
        let response = self
            .build(method, url, params)
            .header(AUTHORIZATION, ntlm::negotiate_header()?)
            .send()
            .await
            .map_err(Error::Transport)?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        // A 401 without an NTLM challenge is a plain rejection.
        let Some(challenge) = ntlm::challenge_token(response.headers()) else {
            return Ok(response);
        };
        // Drain the body so the connection carrying the handshake is reused.
        response.bytes().await.map_err(Error::Transport)?;

        let authorization = ntlm::authenticate_header(&challenge, username, password)?;
        self.build(method, url, params)
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(Error::Transport)
    }
}
