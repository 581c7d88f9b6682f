//! Firestore store over the REST API.
//!
//! Listing pages through `documents/{collection}`. Each write group is one
//! `documents:commit` request, which Firestore applies atomically.

pub mod value;

use crate::credentials::CredentialProvider;
use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use wordsync_core::{
    Atomicity, RemoteRecord, RemoteStore, SyncError, SyncResult, WriteOp, MAX_GROUP_SIZE,
};

/// Length of a Firestore auto-generated document id.
const AUTO_ID_LEN: usize = 20;

/// Firestore connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FirestoreConfig {
    /// Google Cloud project id.
    pub project_id: String,
    /// Database id within the project.
    pub database_id: String,
    /// Base URL of the Firestore REST API.
    pub base_url: String,
    /// Documents requested per listing page.
    pub page_size: usize,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            database_id: "(default)".to_string(),
            base_url: "https://firestore.googleapis.com".to_string(),
            page_size: 300,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

/// A Firestore collection reached over REST.
pub struct FirestoreStore {
    config: FirestoreConfig,
    client: Client,
    credentials: Arc<dyn CredentialProvider>,
}

impl FirestoreStore {
    /// Creates a store; fails if the project id is missing.
    pub fn new(config: FirestoreConfig, credentials: Arc<dyn CredentialProvider>) -> SyncResult<Self> {
        if config.project_id.is_empty() {
            return Err(SyncError::Config("Firestore project id is required".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SyncError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            credentials,
        })
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    /// Resource name of the database's document root.
    fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.config.project_id, self.config.database_id
        )
    }

    fn documents_url(&self) -> String {
        format!("{}/v1/{}", self.config.base_url, self.documents_root())
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_root(), collection, id)
    }

    /// Builds the `writes` array for one commit.
    fn build_writes(&self, collection: &str, ops: &[WriteOp]) -> Vec<Value> {
        ops.iter()
            .map(|op| match op {
                WriteOp::Create { data } => json!({
                    "update": {
                        "name": self.document_name(collection, &auto_id()),
                        "fields": value::to_fields(data),
                    },
                    "currentDocument": { "exists": false },
                }),
                WriteOp::Update { id, data } => json!({
                    "update": {
                        "name": self.document_name(collection, id),
                        "fields": value::to_fields(data),
                    },
                    "currentDocument": { "exists": true },
                }),
                WriteOp::Delete { id } => json!({
                    "delete": self.document_name(collection, id),
                }),
            })
            .collect()
    }
}

/// Generates a document id the way the Firestore client SDKs do.
fn auto_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(AUTO_ID_LEN)
        .map(char::from)
        .collect()
}

/// Maps a non-success response to an error.
async fn check(response: Response, context: &str) -> SyncResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(SyncError::Auth(format!("{context}: {status} {body}")))
        }
        _ => Err(SyncError::Network(format!("{context}: {status} {body}"))),
    }
}

#[async_trait]
impl RemoteStore for FirestoreStore {
    fn provider_name(&self) -> &'static str {
        "Firestore"
    }

    fn atomicity(&self) -> Atomicity {
        Atomicity::AllOrNothing
    }

    fn group_limit(&self) -> usize {
        MAX_GROUP_SIZE
    }

    async fn list_all(&self, collection: &str) -> SyncResult<Vec<RemoteRecord>> {
        let access_token = self.credentials.access_token().await?;
        let url = format!("{}/{}", self.documents_url(), collection);
        let page_size = self.config.page_size.to_string();

        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .bearer_auth(&access_token)
                .query(&[("pageSize", page_size.as_str())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| SyncError::Network(format!("document list failed: {e}")))?;
            let page: ListDocumentsResponse = check(response, "document list failed")
                .await?
                .json()
                .await
                .map_err(|e| SyncError::Network(format!("failed to parse document list: {e}")))?;

            debug!("Fetched {} documents from {}", page.documents.len(), collection);
            for doc in page.documents {
                let id = doc.name.rsplit('/').next().unwrap_or_default().to_string();
                records.push(RemoteRecord::new(id, value::from_fields(&doc.fields)));
            }

            page_token = page.next_page_token.filter(|t| !t.is_empty());
            if page_token.is_none() {
                break;
            }
        }

        Ok(records)
    }

    async fn apply_group(&self, collection: &str, ops: &[WriteOp]) -> SyncResult<()> {
        if ops.len() > MAX_GROUP_SIZE {
            return Err(SyncError::OversizeBatch {
                size: ops.len(),
                limit: MAX_GROUP_SIZE,
            });
        }
        if ops.is_empty() {
            return Ok(());
        }

        let writes = self.build_writes(collection, ops);
        let access_token = self.credentials.access_token().await?;

        let response = self
            .client
            .post(format!("{}:commit", self.documents_url()))
            .bearer_auth(&access_token)
            .json(&json!({ "writes": writes }))
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("commit failed: {e}")))?;
        check(response, "commit failed").await?;

        info!("Committed {} writes to {}", ops.len(), collection);
        Ok(())
    }
}
