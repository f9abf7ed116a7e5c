//! Error taxonomy for vault lookups and updates.
//!
//! Every variant is terminal: nothing in the crate retries or recovers from
//! these locally. The binary turns them into a failed module result.

use crate::id::IdError;

/// Convenience alias used throughout the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A locator was built with neither a password id nor a match field/value pair.
    #[error("Either the password id or the match field id and value must be configured")]
    Construction,

    /// Credential parameters violate the api key / username exclusivity rules.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error(transparent)]
    InvalidId(#[from] IdError),

    /// The HTTP request could not be sent or the response could not be read.
    #[error("Failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The vault answered with a status code above 204.
    #[error("Failed: {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body was not the JSON shape we expected.
    #[error("Failed: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Password not found")]
    NotFound,

    #[error("Multiple matching passwords found")]
    AmbiguousMatch,

    #[error("{0} is required when creating passwords")]
    MissingRequiredField(&'static str),

    /// NTLM handshake messages could not be encoded or decoded.
    #[error("NTLM authentication failed: {0}")]
    Ntlm(String),
}
