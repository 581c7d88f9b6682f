//! Console progress reporting for a sync run.

use crate::console::Logger;
use std::path::Path;
use wordsync_core::{ApplyReport, DiffCounts, SyncError, SyncObserver};

/// Prints engine progress through the console [`Logger`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver {
    logger: Logger,
}

impl ConsoleObserver {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl SyncObserver for ConsoleObserver {
    fn loaded(&self, path: &Path, count: usize) {
        self.logger
            .log(format!("File \"{}\" has {count} docs", path.display()));
    }

    fn fetched(&self, collection: &str, count: usize) {
        self.logger
            .log(format!("Found {count} docs in \"{collection}\" collection"));
    }

    fn planned(&self, counts: &DiffCounts) {
        self.logger.warn(format!("| {} docs will be created", counts.create));
        self.logger.warn(format!("| {} docs will be updated", counts.update));
        self.logger.warn(format!("| {} docs will be deleted", counts.delete));
        if counts.unchanged > 0 {
            self.logger.log(format!("| {} docs are unchanged", counts.unchanged));
        }
    }

    fn sync_started(&self, groups: usize) {
        self.logger.log(format!("Group sync started: {groups} groups"));
    }

    fn group_started(&self, group: usize, size: usize) {
        self.logger
            .success(format!("| Group {group} sync started: {size} items"));
    }

    fn group_committed(&self, group: usize, _size: usize) {
        self.logger.success(format!("| Group {group} sync finished"));
    }

    fn group_failed(&self, group: usize, error: &SyncError) {
        self.logger.error(format!("| Group {group} sync failed: {error}"));
    }

    fn sync_finished(&self, report: &ApplyReport) {
        let failed = report.failed_groups();
        if failed.is_empty() {
            self.logger.log("Group sync finished");
        } else {
            self.logger.error(format!(
                "Group sync finished with {} failed groups: {:?}",
                failed.len(),
                failed
            ));
        }
    }
}
