#![allow(dead_code)]

use passwordstate::{Credentials, VaultClient};
use serde_json::{json, Value};
use wiremock::{MockServer, ResponseTemplate};

pub const API_KEY: &str = "abc123xyz";
pub const LIST_ID: &str = "123";

pub fn api_key_client(server: &MockServer) -> VaultClient {
    VaultClient::new(server.uri(), Credentials::api_key(API_KEY)).expect("client builds")
}

pub fn windows_client(server: &MockServer) -> VaultClient {
    VaultClient::new(server.uri(), Credentials::windows("CORP\\svc", "hunter2"))
        .expect("client builds")
}

pub fn json_response(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// Full record as returned by `GET passwords/{id}`.
pub fn stored_password() -> Value {
    json!({
        "PasswordID": 999,
        "PasswordListID": 123,
        "Password": "foo",
        "Title": "bar",
        "UserName": "foobar",
        "GenericField1": "123"
    })
}

/// List entry as returned with `ExcludePassword=true`.
pub fn list_entry(password_id: u64, generic_field1: &str) -> Value {
    json!({
        "PasswordID": password_id,
        "Title": format!("entry {password_id}"),
        "UserName": "foobar",
        "GenericField1": generic_field1
    })
}
