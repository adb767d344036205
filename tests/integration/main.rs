//! Integration tests using WireMock
//!
//! These tests drive the client through the reqwest transport against a mock
//! FDM endpoint, covering token handling, recovery and the operation surface.

mod authentication;
mod recovery;
mod services;

use ftd_integration::{ftd_config, FtdClient, FtdConfigBuilder};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

pub const PREFIX: &str = "/api/fdm/latest";

/// Start a mock device.
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Configuration pointing at the mock device.
pub fn config_for(server: &MockServer) -> FtdConfigBuilder {
    let address = server.address();
    ftd_config()
        .scheme("http")
        .host(address.ip().to_string())
        .port(address.port())
        .username("admin")
        .password("Admin123")
        .timeout(Duration::from_secs(5))
        .recovery_backoff(Duration::from_millis(50))
}

/// Absolute mock path of an API path.
pub fn api(path_suffix: &str) -> String {
    format!("{}{}", PREFIX, path_suffix)
}

/// Token response for a password grant.
pub fn token_response(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": token,
        "expires_in": 1800,
        "token_type": "Bearer",
        "refresh_token": format!("refresh-{}", token),
        "refresh_expires_in": 2400
    }))
}

/// Mock matching a password grant.
pub fn password_grant() -> MockBuilder {
    Mock::given(method("POST"))
        .and(path(api("/fdm/token")))
        .and(body_partial_json(json!({"grant_type": "password"})))
}

/// FDM structured error body.
pub fn fdm_error(status: u16, code: &str, description: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "error": {
            "severity": "ERROR",
            "key": "Validation",
            "messages": [{"description": description, "code": code, "location": ""}]
        }
    }))
}

/// Connect a client whose first token is `token`.
pub async fn connected_client(server: &MockServer, token: &str) -> FtdClient {
    password_grant()
        .respond_with(token_response(token))
        .up_to_n_times(1)
        .mount(server)
        .await;

    let config = config_for(server).build().expect("valid config");
    FtdClient::connect(config).await.expect("login succeeds")
}

pub fn items(values: Vec<Value>) -> Value {
    json!({"items": values, "paging": {"prev": [], "next": [], "limit": 9999, "offset": 0, "count": 1, "pages": 0}})
}
