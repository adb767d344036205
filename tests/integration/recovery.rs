//! Integration tests for the recovering invoker

use super::*;
use ftd_integration::{ErrorKind, ListParams, ObjectKind};
use pretty_assertions::assert_eq;
use std::time::Instant;
use wiremock::matchers::header;

#[tokio::test]
async fn test_expired_token_is_replaced_and_call_retried() {
    let server = setup_mock_server().await;
    let client = connected_client(&server, "token-1").await;
    password_grant()
        .respond_with(token_response("token-2"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(api("/object/networks")))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api("/object/networks")))
        .and(header("authorization", "Bearer token-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(vec![
            json!({"name": "obj-1.1.1.1", "value": "1.1.1.1", "type": "networkobject"}),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let networks: Vec<Value> = client
        .objects(ObjectKind::Network)
        .list(&ListParams::default())
        .await
        .unwrap();

    assert_eq!(networks.len(), 1);
    assert_eq!(networks[0]["name"], "obj-1.1.1.1");
    assert_eq!(client.token().await.unwrap().access_token(), "token-2");
}

#[tokio::test]
async fn test_unprovisioned_device_is_bypassed() {
    let server = setup_mock_server().await;
    let client = connected_client(&server, "token-1").await;

    Mock::given(method("GET"))
        .and(path(api("/object/tcpports")))
        .respond_with(ResponseTemplate::new(403))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api("/easysetup/easysetupstatus")))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api("/license/smartagentconnections")))
        .and(body_partial_json(json!({"connectionType": "EVALUATION"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api("/easysetup/easysetupstatus")))
        .and(body_partial_json(json!({"taskComplete": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api("/object/tcpports")))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let ports: Vec<Value> = client
        .objects(ObjectKind::TcpPort)
        .list(&ListParams::default())
        .await
        .unwrap();

    assert!(ports.is_empty());
}

#[tokio::test]
async fn test_forbidden_on_provisioned_device_is_fatal() {
    let server = setup_mock_server().await;
    let client = connected_client(&server, "token-1").await;

    Mock::given(method("GET"))
        .and(path(api("/object/secrets")))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api("/easysetup/easysetupstatus")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"taskComplete": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api("/license/smartagentconnections")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let error = client
        .objects(ObjectKind::Secret)
        .list::<Value>(&ListParams::default())
        .await
        .unwrap_err();

    assert_eq!(error.kind(), Some(ErrorKind::Forbidden));
    assert_eq!(error.operation(), Some("get_secrets"));
    assert_eq!(error.status(), Some(403));
}

#[tokio::test]
async fn test_duplicate_create_is_silent() {
    let server = setup_mock_server().await;
    let client = connected_client(&server, "token-1").await;

    Mock::given(method("POST"))
        .and(path(api("/object/networks")))
        .respond_with(fdm_error(
            422,
            "duplicateName",
            "The name 'obj-1.1.1.1' already exists.",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let created: Option<Value> = client
        .objects(ObjectKind::Network)
        .create(&json!({"name": "obj-1.1.1.1", "subType": "HOST", "value": "1.1.1.1", "type": "networkobject"}))
        .await
        .unwrap();

    assert_eq!(created, None);
}

#[tokio::test]
async fn test_locked_database_waits_and_retries() {
    let server = setup_mock_server().await;
    let client = connected_client(&server, "token-1").await;

    Mock::given(method("GET"))
        .and(path(api("/object/urls")))
        .respond_with(ResponseTemplate::new(423))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api("/object/urls")))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let start = Instant::now();
    let urls: Vec<Value> = client
        .objects(ObjectKind::Url)
        .list(&ListParams::default())
        .await
        .unwrap();

    assert!(urls.is_empty());
    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[tokio::test]
async fn test_second_failure_is_terminal() {
    let server = setup_mock_server().await;
    let client = connected_client(&server, "token-1").await;
    password_grant()
        .respond_with(token_response("token-2"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(api("/object/networks/abc")))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(api("/object/networks/abc")))
        .and(header("authorization", "Bearer token-2"))
        .respond_with(ResponseTemplate::new(423))
        .expect(1)
        .mount(&server)
        .await;

    let error = client
        .objects(ObjectKind::Network)
        .edit::<_, Value>("abc", &json!({"name": "renamed"}))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), Some(ErrorKind::Locked));
    assert_eq!(error.operation(), Some("edit_network_object"));
}

#[tokio::test]
async fn test_validation_error_carries_operation() {
    let server = setup_mock_server().await;
    let client = connected_client(&server, "token-1").await;

    Mock::given(method("POST"))
        .and(path(api("/object/udpports")))
        .respond_with(fdm_error(422, "invalidPort", "Port must be between 1 and 65535."))
        .expect(1)
        .mount(&server)
        .await;

    let error = client
        .objects(ObjectKind::UdpPort)
        .create::<_, Value>(&json!({"name": "bad", "port": "70000", "type": "udpportobject"}))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), Some(ErrorKind::UnprocessableOther));
    assert_eq!(error.operation(), Some("create_udp_port_object"));
    assert!(error.to_string().contains("Port must be between 1 and 65535."));
}
