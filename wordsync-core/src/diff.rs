//! Reconciliation of local records against a remote collection.
//!
//! Remote records are visited in order. Each one consumes the first
//! unconsumed local record with the same key value, if any:
//!
//! - matched and different (or [`UpdatePolicy::Always`]) → update
//! - matched and structurally equal → unchanged
//! - unmatched → delete
//!
//! Local records left in the pool afterwards are created.

use crate::ops::WriteOp;
use crate::record::{Record, RemoteRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};

/// Default field used to match local and remote records.
pub const DEFAULT_KEY_FIELD: &str = "name";

/// When a matched pair produces an update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Update only when the local record differs from the remote fields.
    #[default]
    WhenChanged,
    /// Update every matched record, even when nothing changed.
    Always,
}

/// Options for [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOptions {
    /// Field used to match local and remote records.
    pub key_field: String,
    /// Update policy for matched pairs.
    pub update_policy: UpdatePolicy,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            key_field: DEFAULT_KEY_FIELD.to_string(),
            update_policy: UpdatePolicy::default(),
        }
    }
}

/// An update of an existing remote document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEntry {
    pub id: String,
    pub data: Record,
}

/// Output of [`reconcile`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Local records with no remote counterpart, in local order.
    pub to_create: Vec<Record>,
    /// Matched remote documents to overwrite, in remote order.
    pub to_update: Vec<UpdateEntry>,
    /// Remote ids with no local counterpart, in remote order.
    pub to_delete: Vec<String>,
    /// Matched remote ids whose fields already equal the local record.
    pub unchanged: Vec<String>,
}

/// Per-kind sizes of a [`DiffResult`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffCounts {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub unchanged: usize,
}

impl DiffResult {
    /// Returns true when nothing needs to be written.
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    /// Number of write operations the diff expands to.
    pub fn op_count(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_delete.len()
    }

    pub fn counts(&self) -> DiffCounts {
        DiffCounts {
            create: self.to_create.len(),
            update: self.to_update.len(),
            delete: self.to_delete.len(),
            unchanged: self.unchanged.len(),
        }
    }

    /// Flattens the diff into write operations: creates, then updates, then deletes.
    pub fn into_ops(self) -> Vec<WriteOp> {
        let mut ops = Vec::with_capacity(self.op_count());
        ops.extend(self.to_create.into_iter().map(|data| WriteOp::Create { data }));
        ops.extend(
            self.to_update
                .into_iter()
                .map(|UpdateEntry { id, data }| WriteOp::Update { id, data }),
        );
        ops.extend(self.to_delete.into_iter().map(|id| WriteOp::Delete { id }));
        ops
    }
}

/// Local records not yet matched to a remote record.
///
/// Indices are grouped by canonical key value so each lookup is O(1); within
/// a key, indices stay in ascending order so the lowest index is taken first.
struct RemainingPool {
    by_key: HashMap<String, VecDeque<usize>>,
    consumed: Vec<bool>,
}

impl RemainingPool {
    fn build(local: &[Record], key_field: &str) -> Self {
        let mut by_key: HashMap<String, VecDeque<usize>> = HashMap::new();
        for (index, record) in local.iter().enumerate() {
            if let Some(key) = record.get(key_field) {
                by_key.entry(canonical_key(key)).or_default().push_back(index);
            }
        }
        Self {
            by_key,
            consumed: vec![false; local.len()],
        }
    }

    /// Consumes and returns the lowest unconsumed index whose key equals `key`.
    fn take(&mut self, key: &Value) -> Option<usize> {
        let queue = self.by_key.get_mut(&canonical_key(key))?;
        let index = queue.pop_front()?;
        debug_assert!(!self.consumed[index]);
        self.consumed[index] = true;
        Some(index)
    }

    /// Indices never consumed, in ascending order.
    fn remaining(&self) -> impl Iterator<Item = usize> + '_ {
        self.consumed
            .iter()
            .enumerate()
            .filter_map(|(index, consumed)| (!consumed).then_some(index))
    }
}

/// Strict key identity: two values match only if they are the same JSON value.
fn canonical_key(value: &Value) -> String {
    value.to_string()
}

/// Computes the create/update/delete sets that bring `remote` in line with `local`.
pub fn reconcile(
    local: Vec<Record>,
    remote: &[RemoteRecord],
    options: &ReconcileOptions,
) -> DiffResult {
    let key_field = options.key_field.as_str();
    let mut pool = RemainingPool::build(&local, key_field);
    let mut slots: Vec<Option<Record>> = local.into_iter().map(Some).collect();
    let mut diff = DiffResult::default();

    for remote_record in remote {
        let matched = remote_record
            .key(key_field)
            .and_then(|key| pool.take(key))
            .and_then(|index| slots[index].take());

        match matched {
            Some(data) => {
                let changed = data != remote_record.fields;
                if changed || options.update_policy == UpdatePolicy::Always {
                    diff.to_update.push(UpdateEntry {
                        id: remote_record.id.clone(),
                        data,
                    });
                } else {
                    diff.unchanged.push(remote_record.id.clone());
                }
            }
            None => diff.to_delete.push(remote_record.id.clone()),
        }
    }

    let remaining: Vec<usize> = pool.remaining().collect();
    diff.to_create = remaining
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect();

    diff
}
