//! NTLMv2 handshake for the `/winapi/` surface.
//!
//! The exchange is two round trips on the same request:
//!
//! 1. send the request with `Authorization: NTLM <negotiate>`,
//! 2. the server answers `401` with `WWW-Authenticate: NTLM <challenge>`,
//! 3. repeat the request with `Authorization: NTLM <authenticate>`.

use base64::prelude::*;
use reqwest::header::{HeaderMap, WWW_AUTHENTICATE};
use secrecy::{ExposeSecret, SecretString};

use crate::credentials::split_domain;
use crate::error::{Error, Result};

const WORKSTATION: &str = "PASSWORDSTATE";

/// `Authorization` header value opening the handshake.
pub fn negotiate_header() -> Result<String> {
    let flags = ntlmclient::Flags::NEGOTIATE_UNICODE
        | ntlmclient::Flags::REQUEST_TARGET
        | ntlmclient::Flags::NEGOTIATE_NTLM
        | ntlmclient::Flags::NEGOTIATE_WORKSTATION_SUPPLIED;
    let message = ntlmclient::Message::Negotiate(ntlmclient::NegotiateMessage {
        flags,
        supplied_domain: String::new(),
        supplied_workstation: WORKSTATION.to_owned(),
        os_version: Default::default(),
    });
    let bytes = message
        .to_bytes()
        .map_err(|e| Error::Ntlm(format!("failed to encode negotiate message: {e:?}")))?;

    Ok(format!("NTLM {}", BASE64_STANDARD.encode(bytes)))
}

/// Extract the base64 challenge from a `WWW-Authenticate: NTLM <token>` header.
pub fn challenge_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(parse_challenge)
        .map(str::to_owned)
}

fn parse_challenge(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("NTLM") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// `Authorization` header value answering a server challenge.
pub fn authenticate_header(
    challenge_b64: &str,
    login: &str,
    password: &SecretString,
) -> Result<String> {
    let challenge_bytes = BASE64_STANDARD
        .decode(challenge_b64)
        .map_err(|e| Error::Ntlm(format!("challenge is not valid base64: {e}")))?;
    let challenge = ntlmclient::Message::try_from(challenge_bytes.as_slice())
        .map_err(|e| Error::Ntlm(format!("failed to decode challenge message: {e:?}")))?;
    let challenge = match challenge {
        ntlmclient::Message::Challenge(c) => c,
        other => {
            return Err(Error::Ntlm(format!(
                "expected a challenge message, got {other:?}"
            )))
        }
    };

    let target_info: Vec<u8> = challenge
        .target_information
        .iter()
        .flat_map(|entry| entry.to_bytes())
        .collect();

    let (domain, username) = split_domain(login);
    let creds = ntlmclient::Credentials {
        username: username.to_owned(),
        password: password.expose_secret().to_owned(),
        domain: domain.to_owned(),
    };
    let response = ntlmclient::respond_challenge_ntlm_v2(
        challenge.challenge,
        &target_info,
        ntlmclient::get_ntlm_time(),
        &creds,
    );

    let flags = ntlmclient::Flags::NEGOTIATE_UNICODE | ntlmclient::Flags::NEGOTIATE_NTLM;
    let message = response.to_message(&creds, WORKSTATION, flags);
    let bytes = message
        .to_bytes()
        .map_err(|e| Error::Ntlm(format!("failed to encode authenticate message: {e:?}")))?;

    Ok(format!("NTLM {}", BASE64_STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_negotiate_header_is_ntlm_message() {
        let header = negotiate_header().unwrap();
        let token = header.strip_prefix("NTLM ").unwrap();
        let bytes = BASE64_STANDARD.decode(token).unwrap();
        assert!(bytes.starts_with(b"NTLMSSP\0"));
    }

    #[test]
    fn test_parse_challenge() {
        assert_eq!(parse_challenge("NTLM TlRMTVNTUAACAAAA"), Some("TlRMTVNTUAACAAAA"));
        assert_eq!(parse_challenge("ntlm abc"), Some("abc"));
        assert_eq!(parse_challenge("NTLM"), None);
        assert_eq!(parse_challenge("Negotiate abc"), None);
    }

    #[test]
    fn test_challenge_token_skips_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.append(WWW_AUTHENTICATE, HeaderValue::from_static("Negotiate"));
        headers.append(WWW_AUTHENTICATE, HeaderValue::from_static("NTLM abc"));
        assert_eq!(challenge_token(&headers), Some("abc".to_string()));
    }

    #[test]
    fn test_authenticate_rejects_garbage_challenge() {
        let password = SecretString::from("pw".to_string());
        let err = authenticate_header("not base64!", "user", &password).unwrap_err();
        assert!(matches!(err, Error::Ntlm(_)));
    }
}
