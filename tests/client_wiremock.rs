mod support;

use anyhow::Result;
use base64::prelude::*;
use passwordstate::{Credentials, Error, Method, Params, VaultClient};
use serde_json::json;
use support::{api_key_client, json_response, windows_client, API_KEY};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

#[tokio::test]
async fn api_key_requests_use_api_path_and_header() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/passwords/999"))
        .and(header("APIKey", API_KEY))
        .respond_with(json_response(json!([{"PasswordID": 999}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_key_client(&server);
    let body = client.request("passwords/999", Method::Get, None).await?;
    assert_eq!(body, json!([{"PasswordID": 999}]));

    Ok(())
}

#[tokio::test]
async fn params_are_sent_as_query_for_writes() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/passwords"))
        .and(query_param("PasswordID", "999"))
        .and(query_param("Title", "new title"))
        .respond_with(json_response(json!([{"PasswordID": 999}])))
        .expect(1)
        .mount(&server)
        .await;

    let params = Params::from([
        ("PasswordID".to_string(), "999".to_string()),
        ("Title".to_string(), "new title".to_string()),
    ]);
    let client = api_key_client(&server);
    client
        .request("passwords", Method::Put, Some(&params))
        .await?;

    Ok(())
}

#[tokio::test]
async fn status_above_204_is_api_error() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/passwords/1"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!([{"errors": [{"message": "Invalid API key"}]}])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/passwords/2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = api_key_client(&server);

    let err = client
        .request("passwords/1", Method::Get, None)
        .await
        .unwrap_err();
    match err {
        Error::Api { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("Invalid API key"));
        }
        other => panic!("expected api error, got {other:?}"),
    }

    let err = client
        .request("passwords/2", Method::Get, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api { status: 500, .. }));

    Ok(())
}

#[tokio::test]
async fn invalid_json_is_decode_error() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/passwords/999"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = api_key_client(&server);
    let err = client
        .request("passwords/999", Method::Get, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));

    Ok(())
}

#[tokio::test]
async fn empty_no_content_body_is_decode_error() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/passwords"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = api_key_client(&server);
    let err = client
        .request("passwords", Method::Put, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));

    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_transport_error() -> Result<()> {
    let client = VaultClient::new("http://127.0.0.1:1", Credentials::api_key(API_KEY))?;
    let err = client
        .request("passwords/999", Method::Get, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.to_string().starts_with("Failed: "));

    Ok(())
}

fn has_ntlm_authorization(request: &Request) -> bool {
    request
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("NTLM "))
}

#[tokio::test]
async fn windows_credentials_use_winapi_path_with_ntlm() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/winapi/passwords/999"))
        .and(has_ntlm_authorization)
        .respond_with(json_response(json!([{"PasswordID": 999}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = windows_client(&server);
    let body = client.request("passwords/999", Method::Get, None).await?;
    assert_eq!(body, json!([{"PasswordID": 999}]));

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.iter().all(|r| r.headers.get("APIKey").is_none()));

    Ok(())
}

fn utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

fn security_buffer(len: usize, offset: u32) -> Vec<u8> {
    let len = len as u16;
    [&len.to_le_bytes()[..], &len.to_le_bytes(), &offset.to_le_bytes()].concat()
}

/// A type 2 message for target `Server` in domain `Domain`.
fn ntlm_challenge() -> Vec<u8> {
    let target_name = utf16le("Server");
    let mut target_info = Vec::new();
    for (kind, value) in [(2u16, "Domain"), (1u16, "Server")] {
        let value = utf16le(value);
        target_info.extend_from_slice(&kind.to_le_bytes());
        target_info.extend_from_slice(&(value.len() as u16).to_le_bytes());
        target_info.extend_from_slice(&value);
    }
    target_info.extend_from_slice(&[0, 0, 0, 0]);

    // NEGOTIATE_UNICODE | NEGOTIATE_NTLM | NEGOTIATE_TARGET_INFO
    let flags: u32 = 0x0080_0201;
    let header_len = 56u32;

    let mut message = b"NTLMSSP\0".to_vec();
    message.extend_from_slice(&2u32.to_le_bytes());
    message.extend_from_slice(&security_buffer(target_name.len(), header_len));
    message.extend_from_slice(&flags.to_le_bytes());
    message.extend_from_slice(&[0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef]);
    message.extend_from_slice(&[0; 8]);
    message.extend_from_slice(&security_buffer(
        target_info.len(),
        header_len + target_name.len() as u32,
    ));
    message.extend_from_slice(&[0; 8]);
    message.extend_from_slice(&target_name);
    message.extend_from_slice(&target_info);
    message
}

fn ntlm_message_type(request: &Request) -> Option<u32> {
    let value = request.headers.get("authorization")?.to_str().ok()?;
    let token = BASE64_STANDARD.decode(value.strip_prefix("NTLM ")?).ok()?;
    let kind = token.get(8..12)?;
    Some(u32::from_le_bytes(kind.try_into().ok()?))
}

#[tokio::test]
async fn ntlm_challenge_is_answered_with_authenticate_message() -> Result<()> {
    let server = MockServer::start().await;
    let challenge = BASE64_STANDARD.encode(ntlm_challenge());

    Mock::given(method("GET"))
        .and(path("/winapi/passwords/999"))
        .and(|request: &Request| ntlm_message_type(request) == Some(1))
        .respond_with(
            ResponseTemplate::new(401)
                .insert_header("WWW-Authenticate", format!("NTLM {challenge}").as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/winapi/passwords/999"))
        .and(|request: &Request| ntlm_message_type(request) == Some(3))
        .respond_with(json_response(json!([{"PasswordID": 999}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = windows_client(&server);
    let body = client.request("passwords/999", Method::Get, None).await?;
    assert_eq!(body, json!([{"PasswordID": 999}]));

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 2);
    let negotiate = requests[0].headers.get("authorization").map(|v| v.len());
    let authenticate = requests[1].headers.get("authorization").map(|v| v.len());
    assert!(authenticate > negotiate);

    Ok(())
}

#[tokio::test]
async fn ntlm_rejection_without_challenge_is_api_error() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/winapi/passwords/999"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .expect(1)
        .mount(&server)
        .await;

    let client = windows_client(&server);
    let err = client
        .request("passwords/999", Method::Get, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api { status: 401, .. }));

    Ok(())
}
