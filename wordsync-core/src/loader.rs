//! Local input loading.
//!
//! The input file must hold a JSON array of objects. Shape errors are raised
//! here so a run aborts before any remote call is made.

use crate::error::{SyncError, SyncResult};
use crate::record::{record_from_value, Record};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Reads `path` and parses it as an array of records.
pub fn load_records(path: impl AsRef<Path>) -> SyncResult<Vec<Record>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SyncError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let records = parse_records(&content)?;
    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parses a JSON document whose root must be an array of objects.
pub fn parse_records(content: &str) -> SyncResult<Vec<Record>> {
    let root: Value = serde_json::from_str(content)?;
    let Value::Array(items) = root else {
        return Err(SyncError::Format(
            "root element must be an array".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            record_from_value(item).ok_or_else(|| {
                SyncError::Format(format!("element {index} is not an object"))
            })
        })
        .collect()
}

/// Checks that every record carries `key_field`.
pub fn ensure_key_field(records: &[Record], key_field: &str) -> SyncResult<()> {
    match records.iter().position(|r| !r.contains_key(key_field)) {
        Some(index) => Err(SyncError::Format(format!(
            "element {index} has no \"{key_field}\" field"
        ))),
        None => Ok(()),
    }
}

/// Loads `path` and checks every record for `key_field`. Touches nothing
/// but the local file.
pub fn load_input(path: impl AsRef<Path>, key_field: &str) -> SyncResult<Vec<Record>> {
    let records = load_records(path)?;
    ensure_key_field(&records, key_field)?;
    Ok(records)
}
