//! Sequential group application.
//!
//! Operations are split into groups of at most the effective limit and each
//! group is awaited before the next one starts. A failed group is recorded and
//! the remaining groups are still attempted.

use crate::error::{SyncError, SyncResult};
use crate::observer::SyncObserver;
use crate::ops::WriteOp;
use crate::store::{RemoteStore, MAX_GROUP_SIZE};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupOutcome {
    /// 1-based group index.
    pub index: usize,
    /// Number of operations in the group.
    pub size: usize,
    /// Failure message, if the group did not commit.
    pub error: Option<String>,
}

impl GroupOutcome {
    pub fn is_committed(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of a full apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub groups: Vec<GroupOutcome>,
}

impl ApplyReport {
    /// Returns true if every group committed.
    pub fn is_success(&self) -> bool {
        self.groups.iter().all(GroupOutcome::is_committed)
    }

    /// Number of operations in committed groups.
    pub fn committed_ops(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| g.is_committed())
            .map(|g| g.size)
            .sum()
    }

    /// Indices of failed groups.
    pub fn failed_groups(&self) -> Vec<usize> {
        self.groups
            .iter()
            .filter(|g| !g.is_committed())
            .map(|g| g.index)
            .collect()
    }
}

/// Splits `ops` into consecutive groups of at most `limit` operations.
pub fn plan_groups(ops: &[WriteOp], limit: usize) -> Vec<&[WriteOp]> {
    ops.chunks(limit.max(1)).collect()
}

/// Applies write operations to a store in bounded, sequential groups.
#[derive(Debug, Clone)]
pub struct BatchApplier {
    group_limit: usize,
}

impl Default for BatchApplier {
    fn default() -> Self {
        Self::new(MAX_GROUP_SIZE)
    }
}

impl BatchApplier {
    /// Creates an applier that never sends more than `group_limit` operations per group.
    pub fn new(group_limit: usize) -> Self {
        Self { group_limit }
    }

    /// The group size used against `store`: the smaller of the two limits.
    pub fn effective_limit(&self, store: &dyn RemoteStore) -> usize {
        self.group_limit.min(store.group_limit())
    }

    /// Applies `ops` to `collection`, one group at a time.
    ///
    /// Only a zero group limit is an error; group failures are reported in the
    /// returned [`ApplyReport`].
    pub async fn apply(
        &self,
        store: &dyn RemoteStore,
        collection: &str,
        ops: &[WriteOp],
        observer: &dyn SyncObserver,
    ) -> SyncResult<ApplyReport> {
        let limit = self.effective_limit(store);
        if limit == 0 {
            return Err(SyncError::Config("group limit must be at least 1".to_string()));
        }

        let groups = plan_groups(ops, limit);
        info!(
            "Applying {} ops to {} in {} groups ({}, {})",
            ops.len(),
            collection,
            groups.len(),
            store.provider_name(),
            store.atomicity()
        );
        observer.sync_started(groups.len());

        let mut report = ApplyReport::default();
        for (offset, group) in groups.into_iter().enumerate() {
            let index = offset + 1;
            observer.group_started(index, group.len());

            let result = if group.len() > store.group_limit() {
                Err(SyncError::OversizeBatch {
                    size: group.len(),
                    limit: store.group_limit(),
                })
            } else {
                store.apply_group(collection, group).await
            };

            match result {
                Ok(()) => {
                    debug!("Group {} committed: {} ops", index, group.len());
                    observer.group_committed(index, group.len());
                    report.groups.push(GroupOutcome {
                        index,
                        size: group.len(),
                        error: None,
                    });
                }
                Err(e) => {
                    let error = match e {
                        e @ SyncError::OversizeBatch { .. } => e,
                        other => SyncError::BatchCommit {
                            group: index,
                            reason: other.to_string(),
                        },
                    };
                    warn!("{}", error);
                    observer.group_failed(index, &error);
                    report.groups.push(GroupOutcome {
                        index,
                        size: group.len(),
                        error: Some(error.to_string()),
                    });
                }
            }
        }

        observer.sync_finished(&report);
        Ok(report)
    }
}
