//! Run configuration.

use crate::diff::{ReconcileOptions, UpdatePolicy, DEFAULT_KEY_FIELD};
use crate::error::{SyncError, SyncResult};
use crate::store::MAX_GROUP_SIZE;

/// Default target collection.
pub const DEFAULT_COLLECTION: &str = "words.basic";

/// Configuration for one sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Target collection name.
    pub collection: String,
    /// Field used to match local and remote records.
    pub key_field: String,
    /// When matched records are rewritten.
    pub update_policy: UpdatePolicy,
    /// Maximum operations per group (capped by the store's own limit).
    pub group_limit: usize,
    /// Compute and report the diff without writing.
    pub dry_run: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            key_field: DEFAULT_KEY_FIELD.to_string(),
            update_policy: UpdatePolicy::default(),
            group_limit: MAX_GROUP_SIZE,
            dry_run: false,
        }
    }
}

impl SyncConfig {
    /// Checks the values a run depends on.
    pub fn validate(&self) -> SyncResult<()> {
        if self.collection.trim().is_empty() {
            return Err(SyncError::Config("collection name is empty".to_string()));
        }
        if self.key_field.is_empty() {
            return Err(SyncError::Config("key field is empty".to_string()));
        }
        if self.group_limit == 0 || self.group_limit > MAX_GROUP_SIZE {
            return Err(SyncError::Config(format!(
                "group limit must be between 1 and {MAX_GROUP_SIZE}, got {}",
                self.group_limit
            )));
        }
        Ok(())
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            key_field: self.key_field.clone(),
            update_policy: self.update_policy,
        }
    }
}
