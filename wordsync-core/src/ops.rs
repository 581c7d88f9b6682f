//! Write operations submitted to a remote store.

use crate::record::Record;
use serde::{Deserialize, Serialize};

/// A single write against the target collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WriteOp {
    /// Insert a new document; the store assigns its id.
    Create { data: Record },
    /// Replace the fields of an existing document.
    Update { id: String, data: Record },
    /// Remove a document.
    Delete { id: String },
}
