//! MongoDB store over the Atlas Data API.
//!
//! The Data API has no bundled write primitive, so a group is applied in
//! three phases: `insertMany`, `deleteMany`, then one `replaceOne` per
//! update. A failed phase leaves the earlier phases applied.
//!
//! Record ids are the compact JSON text of the `_id` value exactly as `find`
//! returned it (`7`, `"cat"`, `{"$oid":"65a1…"}`), and filters send that value
//! back unchanged. A delete or replace that matches fewer documents than
//! requested fails the group.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, info};
use wordsync_core::{
    Atomicity, Record, RemoteRecord, RemoteStore, SyncError, SyncResult, WriteOp, MAX_GROUP_SIZE,
};

/// Default collection for the Mongo backend.
pub const DEFAULT_MONGO_COLLECTION: &str = "basic";

/// Default database for the Mongo backend.
pub const DEFAULT_MONGO_DATABASE: &str = "words";

/// Data API connection settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    /// Data API endpoint, e.g. `https://data.mongodb-api.com/app/<app-id>/endpoint/data/v1`.
    pub base_url: String,
    /// Data API key.
    pub api_key: String,
    /// Linked cluster name.
    pub data_source: String,
    /// Database name.
    pub database: String,
    /// Documents requested per `find` page.
    pub page_size: usize,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            data_source: "Cluster0".to_string(),
            database: DEFAULT_MONGO_DATABASE.to_string(),
            page_size: 1000,
        }
    }
}

impl std::fmt::Debug for MongoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("data_source", &self.data_source)
            .field("database", &self.database)
            .field("page_size", &self.page_size)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct FindResponse {
    #[serde(default)]
    documents: Vec<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct InsertManyResponse {
    #[serde(rename = "insertedIds", default)]
    inserted_ids: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    #[serde(rename = "deletedCount", default)]
    deleted_count: u64,
}

#[derive(Debug, Deserialize)]
struct ReplaceResponse {
    #[serde(rename = "matchedCount", default)]
    matched_count: u64,
}

/// A MongoDB collection reached through the Data API.
pub struct MongoDataApiStore {
    config: MongoConfig,
    client: Client,
}

impl MongoDataApiStore {
    /// Creates a store; fails if the endpoint or key is missing.
    pub fn new(config: MongoConfig) -> SyncResult<Self> {
        if config.base_url.is_empty() {
            return Err(SyncError::Config("Mongo Data API URL is required".to_string()));
        }
        if config.api_key.is_empty() {
            return Err(SyncError::Config("Mongo Data API key is required".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SyncError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &MongoConfig {
        &self.config
    }

    /// Calls one Data API action with the common namespace fields merged in.
    async fn action<T: DeserializeOwned>(
        &self,
        action: &str,
        collection: &str,
        body: Value,
    ) -> SyncResult<T> {
        let mut payload = json!({
            "dataSource": self.config.data_source,
            "database": self.config.database,
            "collection": collection,
        });
        if let (Some(target), Value::Object(extra)) = (payload.as_object_mut(), body) {
            target.extend(extra);
        }

        let response = self
            .client
            .post(format!("{}/action/{}", self.config.base_url.trim_end_matches('/'), action))
            .header("api-key", &self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("{action} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    SyncError::Auth(format!("{action} failed: {status} {error}"))
                }
                _ => SyncError::Network(format!("{action} failed: {status} {error}")),
            });
        }

        response
            .json()
            .await
            .map_err(|e| SyncError::Network(format!("failed to parse {action} response: {e}")))
    }
}

/// Record id for a raw `_id` value.
fn document_id(value: &Value) -> String {
    value.to_string()
}

/// Recovers the raw `_id` value from a record id. Ids that are not JSON text
/// (never produced by `list_all`) are sent as plain strings.
fn id_filter_value(id: &str) -> Value {
    serde_json::from_str(id).unwrap_or_else(|_| Value::String(id.to_string()))
}

#[async_trait]
impl RemoteStore for MongoDataApiStore {
    fn provider_name(&self) -> &'static str {
        "MongoDB Data API"
    }

    fn atomicity(&self) -> Atomicity {
        Atomicity::BestEffortPerPhase
    }

    fn group_limit(&self) -> usize {
        MAX_GROUP_SIZE
    }

    async fn list_all(&self, collection: &str) -> SyncResult<Vec<RemoteRecord>> {
        let page_size = self.config.page_size.max(1);
        let mut records = Vec::new();

        loop {
            let page: FindResponse = self
                .action(
                    "find",
                    collection,
                    json!({
                        "filter": {},
                        "sort": { "_id": 1 },
                        "skip": records.len(),
                        "limit": page_size,
                    }),
                )
                .await?;

            let fetched = page.documents.len();
            debug!("Fetched {} documents from {}", fetched, collection);
            for mut fields in page.documents {
                let id = fields
                    .remove("_id")
                    .map(|v| document_id(&v))
                    .unwrap_or_default();
                records.push(RemoteRecord::new(id, fields));
            }

            if fetched < page_size {
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

        let mut inserts: Vec<&Record> = Vec::new();
        let mut deletes: Vec<Value> = Vec::new();
        let mut updates: Vec<(&str, &Record)> = Vec::new();
        for op in ops {
            match op {
                WriteOp::Create { data } => inserts.push(data),
                WriteOp::Update { id, data } => updates.push((id.as_str(), data)),
                WriteOp::Delete { id } => deletes.push(id_filter_value(id)),
            }
        }

        if !inserts.is_empty() {
            let result: InsertManyResponse = self
                .action("insertMany", collection, json!({ "documents": inserts }))
                .await?;
            info!("Inserted {} documents into {}", result.inserted_ids.len(), collection);
        }

        if !deletes.is_empty() {
            let result: DeleteResponse = self
                .action(
                    "deleteMany",
                    collection,
                    json!({ "filter": { "_id": { "$in": deletes } } }),
                )
                .await?;
            info!("Deleted {} documents from {}", result.deleted_count, collection);
            if result.deleted_count < deletes.len() as u64 {
                return Err(SyncError::Conflict(format!(
                    "deleteMany removed {} of {} documents",
                    result.deleted_count,
                    deletes.len()
                )));
            }
        }

        for (id, data) in updates {
            let result: ReplaceResponse = self
                .action(
                    "replaceOne",
                    collection,
                    json!({ "filter": { "_id": id_filter_value(id) }, "replacement": data }),
                )
                .await?;
            if result.matched_count == 0 {
                return Err(SyncError::Conflict(format!(
                    "replaceOne matched no document with _id {id}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_keep_their_json_encoding() {
        assert_eq!(document_id(&json!(7)), "7");
        assert_eq!(document_id(&json!("cat")), "\"cat\"");
        assert_eq!(
            document_id(&json!({"$oid": "65a1f0c2e4b0a1b2c3d4e5f6"})),
            r#"{"$oid":"65a1f0c2e4b0a1b2c3d4e5f6"}"#
        );
    }

    #[test]
    fn filter_values_round_trip() {
        for raw in [
            json!(7),
            json!("65a1f0c2e4b0a1b2c3d4e5f6"),
            json!({"$oid": "65a1f0c2e4b0a1b2c3d4e5f6"}),
        ] {
            assert_eq!(id_filter_value(&document_id(&raw)), raw);
        }
        assert_eq!(id_filter_value("not json"), json!("not json"));
    }
}
