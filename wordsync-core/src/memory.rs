//! In-process [`RemoteStore`], atomic per group.
//!
//! Used for dry runs and tests. Ids are minted sequentially and sort in
//! insertion order, so listings are deterministic.

use crate::error::{SyncError, SyncResult};
use crate::ops::WriteOp;
use crate::record::{Record, RemoteRecord};
use crate::store::{Atomicity, RemoteStore, MAX_GROUP_SIZE};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

type Collection = BTreeMap<String, Record>;

/// An in-memory document store.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    next_id: AtomicUsize,
    group_limit: usize,
    /// 1-based `apply_group` call numbers that fail without writing.
    failing_calls: HashSet<usize>,
    list_calls: AtomicUsize,
    apply_calls: AtomicUsize,
    /// Sizes of committed groups, in commit order.
    committed: RwLock<Vec<usize>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            next_id: AtomicUsize::new(1),
            group_limit: MAX_GROUP_SIZE,
            failing_calls: HashSet::new(),
            list_calls: AtomicUsize::new(0),
            apply_calls: AtomicUsize::new(0),
            committed: RwLock::new(Vec::new()),
        }
    }

    /// Creates a store whose `collection` holds `records`.
    pub fn seeded(collection: &str, records: Vec<RemoteRecord>) -> Self {
        let docs: Collection = records.into_iter().map(|r| (r.id, r.fields)).collect();
        let mut collections = HashMap::new();
        collections.insert(collection.to_string(), docs);
        Self {
            collections: RwLock::new(collections),
            ..Self::new()
        }
    }

    /// Sets the per-group operation limit.
    pub fn with_group_limit(mut self, limit: usize) -> Self {
        self.group_limit = limit;
        self
    }

    /// Makes the `call`-th `apply_group` call (1-based) fail.
    pub fn with_failing_call(mut self, call: usize) -> Self {
        self.failing_calls.insert(call);
        self
    }

    /// Number of `list_all` calls made so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `apply_group` calls made so far, failed ones included.
    pub fn apply_calls(&self) -> usize {
        self.apply_calls.load(Ordering::SeqCst)
    }

    /// Sizes of successfully committed groups, in order.
    pub async fn committed_groups(&self) -> Vec<usize> {
        self.committed.read().await.clone()
    }

    /// Snapshot of `collection`, ordered by id.
    pub async fn documents(&self, collection: &str) -> Vec<RemoteRecord> {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| RemoteRecord::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn mint_id(&self) -> String {
        format!("mem-{:06}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn provider_name(&self) -> &'static str {
        "Memory"
    }

    fn atomicity(&self) -> Atomicity {
        Atomicity::AllOrNothing
    }

    fn group_limit(&self) -> usize {
        self.group_limit
    }

    async fn list_all(&self, collection: &str) -> SyncResult<Vec<RemoteRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.documents(collection).await)
    }

    async fn apply_group(&self, collection: &str, ops: &[WriteOp]) -> SyncResult<()> {
        let call = self.apply_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if ops.len() > self.group_limit {
            return Err(SyncError::OversizeBatch {
                size: ops.len(),
                limit: self.group_limit,
            });
        }
        if self.failing_calls.contains(&call) {
            return Err(SyncError::Network(format!("injected failure on call {call}")));
        }

        let mut collections = self.collections.write().await;
        let mut staged = collections.get(collection).cloned().unwrap_or_default();

        for op in ops {
            match op {
                WriteOp::Create { data } => {
                    staged.insert(self.mint_id(), data.clone());
                }
                WriteOp::Update { id, data } => {
                    let doc = staged
                        .get_mut(id)
                        .ok_or_else(|| SyncError::Conflict(format!("no document to update: {id}")))?;
                    *doc = data.clone();
                }
                WriteOp::Delete { id } => {
                    staged.remove(id);
                }
            }
        }

        collections.insert(collection.to_string(), staged);
        self.committed.write().await.push(ops.len());
        debug!("Memory store committed {} ops to {}", ops.len(), collection);
        Ok(())
    }
}
