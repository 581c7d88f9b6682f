//! Reconciliation engine for wordsync.
//!
//! Brings a remote document collection in line with a local JSON file:
//!
//! 1. **Load**: read the file as an array of records
//! 2. **Fetch**: list every document of the target collection
//! 3. **Reconcile**: match records on a key field and compute
//!    create/update/delete sets
//! 4. **Apply**: submit the writes in sequential groups bounded by the
//!    store's per-call limit
//!
//! Stores plug in through [`RemoteStore`]; this crate ships only the
//! in-memory [`MemoryStore`].
//!
//! # Example
//!
//! ```
//! use wordsync_core::{reconcile, ReconcileOptions};
//! use serde_json::json;
//!
//! let local = vec![json!({"name": "cat"}).as_object().unwrap().clone()];
//! let diff = reconcile(local, &[], &ReconcileOptions::default());
//! assert_eq!(diff.to_create.len(), 1);
//! ```

pub mod applier;
mod config;
pub mod diff;
mod engine;
mod error;
pub mod loader;
pub mod memory;
mod observer;
mod ops;
mod record;
pub mod store;

pub use applier::{plan_groups, ApplyReport, BatchApplier, GroupOutcome};
pub use config::{SyncConfig, DEFAULT_COLLECTION};
pub use diff::{
    reconcile, DiffCounts, DiffResult, ReconcileOptions, UpdateEntry, UpdatePolicy,
    DEFAULT_KEY_FIELD,
};
pub use engine::{SyncEngine, SyncPlan, SyncReport};
pub use error::{SyncError, SyncResult};
pub use loader::{ensure_key_field, load_input, load_records, parse_records};
pub use memory::MemoryStore;
pub use observer::{NoopObserver, SyncObserver};
pub use ops::WriteOp;
pub use record::{record_from_value, Record, RemoteRecord};
pub use store::{Atomicity, RemoteStore, MAX_GROUP_SIZE};
