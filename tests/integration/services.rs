//! Integration tests for device-level operations

use super::*;
use ftd_integration::{ListParams, ObjectKind};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_string_contains, header, header_regex, query_param};

#[tokio::test]
async fn test_run_cli_command() {
    let server = setup_mock_server().await;
    let client = connected_client(&server, "token-1").await;

    Mock::given(method("POST"))
        .and(path(api("/action/command")))
        .and(body_partial_json(json!({"commandInput": "show running-config", "type": "Command"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "commandInput": "show running-config",
            "commandOutput": ": Saved\nNGFW Version 6.7.0",
            "type": "Command"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = client
        .system()
        .run_cli_command("show running-config")
        .await
        .unwrap();

    assert_eq!(output.as_deref(), Some(": Saved\nNGFW Version 6.7.0"));
}

#[tokio::test]
async fn test_system_information() {
    let server = setup_mock_server().await;
    let client = connected_client(&server, "token-1").await;

    Mock::given(method("GET"))
        .and(path(api("/operational/systeminfo/default")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "softwareVersion": "6.7.0-65",
            "platformModel": "Cisco Firepower Threat Defense for VMware",
            "serialNumber": "9A1B2C3D4E5",
            "type": "SystemInformation"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let info = client.system().system_information().await.unwrap().unwrap();

    assert_eq!(info.software_version.as_deref(), Some("6.7.0-65"));
    assert_eq!(info.serial_number.as_deref(), Some("9A1B2C3D4E5"));
}

#[tokio::test]
async fn test_deploy_after_scheduling_conflict() {
    let server = setup_mock_server().await;
    let client = connected_client(&server, "token-1").await;

    Mock::given(method("POST"))
        .and(path(api("/operational/deploy")))
        .respond_with(fdm_error(422, "", "Failed to schedule deployment job"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api("/operational/deploy")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "d4e5f6",
            "state": "QUEUED",
            "queuedTime": 1600000000,
            "type": "deploymentstatus"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let job = client.system().deploy().await.unwrap().unwrap();

    assert_eq!(job.id.as_deref(), Some("d4e5f6"));
    assert_eq!(job.state.as_deref(), Some("QUEUED"));
}

#[tokio::test]
async fn test_find_by_name_filters() {
    let server = setup_mock_server().await;
    let client = connected_client(&server, "token-1").await;

    Mock::given(method("GET"))
        .and(path(api("/object/networkgroups")))
        .and(query_param("filter", "name:servers"))
        .and(query_param("limit", "9999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(vec![
            json!({"id": "g1", "name": "servers", "type": "networkobjectgroup"}),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let group: Option<Value> = client
        .objects(ObjectKind::NetworkGroup)
        .find_by_name("servers")
        .await
        .unwrap();

    assert_eq!(group.unwrap()["id"], "g1");

    let none: Vec<Value> = client
        .objects(ObjectKind::NetworkGroup)
        .list(&ListParams::default().filter("name:"))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_raw_post() {
    let server = setup_mock_server().await;
    let client = connected_client(&server, "token-1").await;

    Mock::given(method("POST"))
        .and(path(api("/action/backup")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"jobName": "backup"})))
        .expect(1)
        .mount(&server)
        .await;

    let payload = client
        .post("/action/backup", Some(&json!({"type": "scheduledbackup"})))
        .await
        .unwrap();

    assert_eq!(payload, json!({"jobName": "backup"}));
}

#[tokio::test]
async fn test_upload_file_as_multipart() {
    let server = setup_mock_server().await;
    let client = connected_client(&server, "token-1").await;

    Mock::given(method("POST"))
        .and(path(api("/action/uploadupgrade")))
        .and(header("authorization", "Bearer token-1"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains(
            r#"name="fileToUpload"; filename="upgrade.sh""#,
        ))
        .and(body_string_contains("upgrade package"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fileName": "upgrade.sh",
            "type": "fileuploadstatus"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("upgrade.sh");
    std::fs::write(&file, "upgrade package").unwrap();

    let payload = client
        .upload_file("/action/uploadupgrade", &file)
        .await
        .unwrap();

    assert_eq!(payload["fileName"], "upgrade.sh");
}
