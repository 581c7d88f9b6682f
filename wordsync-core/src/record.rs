//! Record types shared by the loader, the reconciler and the stores.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A local document: an untyped mapping of field name to JSON value.
pub type Record = Map<String, Value>;

/// A document as stored remotely: provider-assigned id plus its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    /// Identifier owned by the remote store.
    pub id: String,
    /// Document fields, without the identifier.
    pub fields: Record,
}

impl RemoteRecord {
    /// Creates a remote record.
    pub fn new(id: impl Into<String>, fields: Record) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Returns the value of `key_field`, if present.
    pub fn key(&self, key_field: &str) -> Option<&Value> {
        self.fields.get(key_field)
    }
}

/// Builds a [`Record`] from a JSON value, returning `None` for non-objects.
pub fn record_from_value(value: Value) -> Option<Record> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
