//! Integration tests for token handling

use super::*;
use ftd_integration::{FtdError, TokenError, TokenOutcome};
use pretty_assertions::assert_eq;
use tokio_test::assert_ok;
use wiremock::matchers::header;

#[tokio::test]
async fn test_connect_installs_bearer_token() {
    let server = setup_mock_server().await;
    let client = connected_client(&server, "token-1").await;

    let token = client.token().await.expect("token stored");
    assert_eq!(token.access_token(), "token-1");
    assert_eq!(token.grant.refresh_token.as_deref(), Some("refresh-token-1"));

    Mock::given(method("GET"))
        .and(path(api("/object/networks")))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let networks: Vec<Value> = assert_ok!(
        client
            .objects(ftd_integration::ObjectKind::Network)
            .list(&Default::default())
            .await
    );
    assert!(networks.is_empty());
}

#[tokio::test]
async fn test_connect_with_bad_credentials() {
    let server = setup_mock_server().await;
    password_grant()
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status_code": 400,
            "message": "Invalid credentials"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server).password("wrong").build().unwrap();
    let error = match FtdClient::connect(config).await {
        Ok(_) => panic!("login with bad credentials must fail"),
        Err(error) => error,
    };
    assert!(matches!(
        error,
        FtdError::Token(TokenError::Rejected { status: 400, .. })
    ));
}

#[tokio::test]
async fn test_logout_revokes_current_token() {
    let server = setup_mock_server().await;
    let client = connected_client(&server, "token-1").await;

    Mock::given(method("POST"))
        .and(path(api("/fdm/token")))
        .and(body_partial_json(json!({
            "grant_type": "revoke_token",
            "access_token": "token-1",
            "token_to_revoke": "token-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client.logout().await.unwrap();
    assert!(matches!(outcome, TokenOutcome::Accepted));
    assert_eq!(client.token().await.unwrap().access_token(), "token-1");
}

#[tokio::test]
async fn test_logout_rejection_is_returned() {
    let server = setup_mock_server().await;
    let client = connected_client(&server, "token-1").await;

    Mock::given(method("POST"))
        .and(path(api("/fdm/token")))
        .and(body_partial_json(json!({"grant_type": "revoke_token"})))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    match client.logout().await.unwrap() {
        TokenOutcome::Rejected(response) => assert_eq!(response.status, 400),
        TokenOutcome::Accepted => panic!("expected a rejected revocation"),
    }
}

#[tokio::test]
async fn test_api_version_without_login() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/versions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"supportedVersions": ["v6", "latest"]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = FtdClient::new(config_for(&server).build().unwrap()).unwrap();

    assert_eq!(client.api_version().await.unwrap().as_deref(), Some("v6"));
}
