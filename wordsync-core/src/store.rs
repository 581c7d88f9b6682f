//! Remote store abstraction.
//!
//! Every backend exposes the same two capabilities: read a whole collection
//! and apply one bounded group of writes. The reconciler and the applier never
//! see provider-specific batch APIs.

use crate::error::SyncResult;
use crate::ops::WriteOp;
use crate::record::RemoteRecord;
use async_trait::async_trait;
use std::fmt;

/// Hard per-call operation limit shared by the supported providers.
pub const MAX_GROUP_SIZE: usize = 500;

/// What a store guarantees when a group fails part way through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Atomicity {
    /// The whole group is committed or none of it is.
    AllOrNothing,
    /// The group is applied in phases; a failed phase leaves earlier phases applied.
    BestEffortPerPhase,
}

impl fmt::Display for Atomicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atomicity::AllOrNothing => write!(f, "all-or-nothing per group"),
            Atomicity::BestEffortPerPhase => write!(f, "best-effort per phase"),
        }
    }
}

/// A remote document collection that can be listed and written in groups.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Returns the name of the provider.
    fn provider_name(&self) -> &'static str;

    /// Returns the atomicity guarantee of [`RemoteStore::apply_group`].
    fn atomicity(&self) -> Atomicity;

    /// Maximum number of operations accepted by one [`RemoteStore::apply_group`] call.
    fn group_limit(&self) -> usize {
        MAX_GROUP_SIZE
    }

    /// Fetches every document of `collection`.
    async fn list_all(&self, collection: &str) -> SyncResult<Vec<RemoteRecord>>;

    /// Applies one group of writes to `collection`.
    async fn apply_group(&self, collection: &str, ops: &[WriteOp]) -> SyncResult<()>;
}
