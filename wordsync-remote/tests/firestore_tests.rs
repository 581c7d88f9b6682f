use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wordsync_core::{
    Atomicity, BatchApplier, NoopObserver, Record, RemoteStore, SyncError, WriteOp,
};
use wordsync_remote::{FirestoreConfig, FirestoreStore, StaticToken};

const DOCS: &str = "/v1/projects/demo/databases/(default)/documents";

fn rec(value: Value) -> Record {
    value.as_object().unwrap().clone()
}

fn mock_config(server: &MockServer) -> FirestoreConfig {
    FirestoreConfig {
        project_id: "demo".to_string(),
        base_url: server.uri(),
        ..Default::default()
    }
}

fn store(server: &MockServer) -> FirestoreStore {
    FirestoreStore::new(mock_config(server), Arc::new(StaticToken::new("token"))).unwrap()
}

async fn commit_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().ends_with(":commit"))
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

// ── Config ──────────────────────────────────────────────────────

#[test]
fn firestore_config_default() {
    let cfg = FirestoreConfig::default();
    assert_eq!(cfg.database_id, "(default)");
    assert_eq!(cfg.base_url, "https://firestore.googleapis.com");
    assert_eq!(cfg.page_size, 300);
    assert!(cfg.project_id.is_empty());
}

#[test]
fn firestore_requires_project_id() {
    let result = FirestoreStore::new(FirestoreConfig::default(), Arc::new(StaticToken::new("t")));
    assert!(matches!(result, Err(SyncError::Config(_))));
}

#[test]
fn firestore_store_capabilities() {
    let store = FirestoreStore::new(
        FirestoreConfig {
            project_id: "demo".to_string(),
            ..Default::default()
        },
        Arc::new(StaticToken::new("t")),
    )
    .unwrap();
    assert_eq!(store.provider_name(), "Firestore");
    assert_eq!(store.atomicity(), Atomicity::AllOrNothing);
    assert_eq!(store.group_limit(), 500);
}

// ── list_all ────────────────────────────────────────────────────

#[tokio::test]
async fn list_all_follows_pages_and_decodes_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/words.basic")))
        .and(query_param("pageToken", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{
                "name": "projects/demo/databases/(default)/documents/words.basic/id2",
                "fields": {"name": {"stringValue": "dog"}}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/words.basic")))
        .and(header("authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{
                "name": "projects/demo/databases/(default)/documents/words.basic/id1",
                "fields": {
                    "name": {"stringValue": "cat"},
                    "level": {"integerValue": "2"},
                    "forms": {"arrayValue": {"values": [{"stringValue": "cats"}]}}
                }
            }],
            "nextPageToken": "page2"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let records = store(&server).list_all("words.basic").await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "id1");
    assert_eq!(records[0].fields, rec(json!({"name": "cat", "level": 2, "forms": ["cats"]})));
    assert_eq!(records[1].id, "id2");
    assert_eq!(records[1].fields["name"], "dog");
}

#[tokio::test]
async fn list_all_empty_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/basic")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let records = store(&server).list_all("basic").await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn list_all_unauthorized_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
        .mount(&server)
        .await;

    let err = store(&server).list_all("basic").await.unwrap_err();
    assert!(matches!(err, SyncError::Auth(_)));
}

#[tokio::test]
async fn list_all_server_error_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = store(&server).list_all("basic").await.unwrap_err();
    assert!(matches!(err, SyncError::Network(_)));
}

#[tokio::test]
async fn empty_token_fails_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let store = FirestoreStore::new(mock_config(&server), Arc::new(StaticToken::new(""))).unwrap();
    let err = store.list_all("basic").await.unwrap_err();
    assert!(matches!(err, SyncError::Auth(_)));
}

// ── apply_group ─────────────────────────────────────────────────

#[tokio::test]
async fn apply_group_sends_one_commit_with_all_writes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:commit")))
        .and(header("authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"writeResults": []})))
        .expect(1)
        .mount(&server)
        .await;

    let ops = vec![
        WriteOp::Create {
            data: rec(json!({"name": "eel"})),
        },
        WriteOp::Update {
            id: "id1".to_string(),
            data: rec(json!({"name": "cat", "tr": "x"})),
        },
        WriteOp::Delete {
            id: "id9".to_string(),
        },
    ];
    store(&server).apply_group("words.basic", &ops).await.unwrap();

    let bodies = commit_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    let writes = bodies[0]["writes"].as_array().unwrap();
    assert_eq!(writes.len(), 3);

    let create_name = writes[0]["update"]["name"].as_str().unwrap();
    let prefix = "projects/demo/databases/(default)/documents/words.basic/";
    assert!(create_name.starts_with(prefix));
    assert_eq!(create_name.len(), prefix.len() + 20);
    assert_eq!(writes[0]["currentDocument"]["exists"], false);
    assert_eq!(writes[0]["update"]["fields"]["name"]["stringValue"], "eel");

    assert_eq!(writes[1]["update"]["name"], format!("{prefix}id1"));
    assert_eq!(writes[1]["currentDocument"]["exists"], true);
    assert_eq!(writes[1]["update"]["fields"]["tr"]["stringValue"], "x");

    assert_eq!(writes[2]["delete"], format!("{prefix}id9"));
}

#[tokio::test]
async fn apply_group_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:commit")))
        .respond_with(ResponseTemplate::new(400).set_body_string("FAILED_PRECONDITION"))
        .mount(&server)
        .await;

    let ops = vec![WriteOp::Delete {
        id: "id1".to_string(),
    }];
    let err = store(&server).apply_group("basic", &ops).await.unwrap_err();
    match err {
        SyncError::Network(msg) => assert!(msg.contains("FAILED_PRECONDITION")),
        other => panic!("expected network error, got {other:?}"),
    }
}

#[tokio::test]
async fn apply_group_rejects_oversize_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let ops: Vec<WriteOp> = (0..501)
        .map(|i| WriteOp::Delete { id: i.to_string() })
        .collect();
    let err = store(&server).apply_group("basic", &ops).await.unwrap_err();
    assert!(matches!(err, SyncError::OversizeBatch { size: 501, limit: 500 }));
}

#[tokio::test]
async fn applier_commits_1200_ops_in_three_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:commit")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"writeResults": []})))
        .expect(3)
        .mount(&server)
        .await;

    let ops: Vec<WriteOp> = (0..1200)
        .map(|i| WriteOp::Create {
            data: rec(json!({"name": format!("w{i}")})),
        })
        .collect();
    let store = store(&server);
    let report = BatchApplier::default()
        .apply(&store, "basic", &ops, &NoopObserver)
        .await
        .unwrap();
    assert!(report.is_success());

    let sizes: Vec<usize> = commit_bodies(&server)
        .await
        .iter()
        .map(|b| b["writes"].as_array().unwrap().len())
        .collect();
    assert_eq!(sizes, vec![500, 500, 200]);
}
