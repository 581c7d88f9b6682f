//! Progress callbacks for a sync run.

use crate::applier::ApplyReport;
use crate::diff::DiffCounts;
use crate::error::SyncError;
use std::path::Path;

/// Receives progress notifications from the engine and the applier.
///
/// All methods default to no-ops.
pub trait SyncObserver: Send + Sync {
    /// The input file was read.
    fn loaded(&self, _path: &Path, _count: usize) {}

    /// The remote collection was fetched.
    fn fetched(&self, _collection: &str, _count: usize) {}

    /// The diff was computed.
    fn planned(&self, _counts: &DiffCounts) {}

    /// Group application is about to start.
    fn sync_started(&self, _groups: usize) {}

    fn group_started(&self, _group: usize, _size: usize) {}

    fn group_committed(&self, _group: usize, _size: usize) {}

    fn group_failed(&self, _group: usize, _error: &SyncError) {}

    /// Every group has been attempted.
    fn sync_finished(&self, _report: &ApplyReport) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {}
