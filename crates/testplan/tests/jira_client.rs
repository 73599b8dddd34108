//! Jira REST client against a mock server.

use serde_json::json;
use testplan::config::JiraConfig;
use testplan::{Attachment, Error, JiraClient};
use wiremock::matchers::{basic_auth, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> JiraClient {
    JiraClient::new(&JiraConfig {
        base_url: server.uri(),
        user: "qa@acme.com".to_string(),
        token: "api-token".to_string(),
        subtask_type: "Subtask".to_string(),
    })
    .unwrap()
}

fn attachment(server: &MockServer, id: &str, filename: &str) -> Attachment {
    Attachment {
        id: id.to_string(),
        filename: filename.to_string(),
        content: format!("{}/rest/api/3/attachment/content/{id}", server.uri()),
        size: 0,
        mime_type: None,
    }
}

#[tokio::test]
async fn test_fetch_attachments() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/QA-1"))
        .and(query_param("fields", "attachment"))
        .and(basic_auth("qa@acme.com", "api-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "10000",
            "key": "QA-1",
            "fields": {
                "attachment": [
                    {
                        "id": "1",
                        "filename": "HU_login.docx",
                        "content": "https://acme.atlassian.net/rest/api/3/attachment/content/1",
                        "size": 4096
                    },
                    {
                        "id": "2",
                        "filename": "diagrama.png",
                        "content": "https://acme.atlassian.net/rest/api/3/attachment/content/2"
                    }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let attachments = client(&server).fetch_attachments("QA-1").await.unwrap();
    let names: Vec<_> = attachments.iter().map(|a| a.filename.as_str()).collect();
    assert_eq!(names, vec!["HU_login.docx", "diagrama.png"]);
    assert_eq!(attachments[0].size, 4096);
}

#[tokio::test]
async fn test_fetch_attachments_without_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/QA-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"key": "QA-1", "fields": {}})))
        .mount(&server)
        .await;

    let attachments = client(&server).fetch_attachments("QA-1").await.unwrap();
    assert!(attachments.is_empty());
}

#[tokio::test]
async fn test_fetch_attachments_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/QA-404"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string("Issue does not exist or you do not have permission"),
        )
        .mount(&server)
        .await;

    let err = client(&server).fetch_attachments("QA-404").await.unwrap_err();
    match err {
        Error::Jira { status, body } => {
            assert_eq!(status.as_u16(), 404);
            assert!(body.contains("does not exist"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_download_follows_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/attachment/content/7"))
        .respond_with(
            ResponseTemplate::new(303)
                .insert_header("Location", format!("{}/media/7", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/7"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"Como usuario quiero pagar".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("descargas");
    let saved = client(&server)
        .download_attachment(&attachment(&server, "7", "HU_pagos.txt"), &target)
        .await
        .unwrap();

    assert_eq!(saved, target.join("HU_pagos.txt"));
    assert_eq!(
        std::fs::read_to_string(&saved).unwrap(),
        "Como usuario quiero pagar"
    );
}

#[tokio::test]
async fn test_download_keeps_only_file_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/attachment/content/8"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let saved = client(&server)
        .download_attachment(&attachment(&server, "8", "../../HU_fuera.txt"), dir.path())
        .await
        .unwrap();

    assert_eq!(saved, dir.path().join("HU_fuera.txt"));
    assert!(saved.is_file());
}

#[tokio::test]
async fn test_create_subtask() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/api/3/issue"))
        .and(body_partial_json(json!({
            "fields": {
                "project": {"key": "QA"},
                "parent": {"key": "QA-1"},
                "summary": "Estrategia de Pruebas",
                "issuetype": {"name": "Subtask"}
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "10021",
            "key": "QA-21",
            "self": "https://acme.atlassian.net/rest/api/3/issue/10021"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client(&server)
        .create_subtask("QA-1", "Estrategia de Pruebas")
        .await
        .unwrap();
    assert_eq!(created.key, "QA-21");
    assert_eq!(created.id, "10021");
}

#[tokio::test]
async fn test_create_subtask_requires_created_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/api/3/issue"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": {"issuetype": "The issue type selected is invalid."}
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .create_subtask("QA-1", "Ejecucion de pruebas")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Jira { status, .. } if status.as_u16() == 400));
}

#[tokio::test]
async fn test_upload_attachment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/api/3/issue/QA-21/attachments"))
        .and(header("X-Atlassian-Token", "no-check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "501",
            "filename": "Test Plan - HU_login.txt",
            "content": "https://acme.atlassian.net/rest/api/3/attachment/content/501",
            "size": 12
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Test Plan - HU_login.txt");
    std::fs::write(&file, "TEST PLAN").unwrap();

    let uploaded = client(&server)
        .upload_attachment("QA-21", &file)
        .await
        .unwrap();
    assert_eq!(uploaded.len(), 1);
    assert_eq!(uploaded[0].filename, "Test Plan - HU_login.txt");

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"Test Plan - HU_login.txt\""));
    assert!(body.contains("TEST PLAN"));
}

#[tokio::test]
async fn test_upload_missing_file() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let err = client(&server)
        .upload_attachment("QA-21", &dir.path().join("nope.txt"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}
