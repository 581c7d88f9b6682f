//! Sync engine: load, fetch, reconcile, apply.
//!
//! A run is strictly sequential. Input problems surface before the remote
//! collection is read, so a bad file never causes a write.

use crate::applier::{ApplyReport, BatchApplier};
use crate::config::SyncConfig;
use crate::diff::{reconcile, DiffCounts, DiffResult};
use crate::error::SyncResult;
use crate::loader::load_input;
use crate::observer::{NoopObserver, SyncObserver};
use crate::record::Record;
use crate::store::RemoteStore;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// A computed but not yet applied diff.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub local_count: usize,
    pub remote_count: usize,
    pub diff: DiffResult,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub local_count: usize,
    pub remote_count: usize,
    pub counts: DiffCounts,
    /// `None` for dry runs.
    pub apply: Option<ApplyReport>,
}

impl SyncReport {
    /// Returns true unless a group failed.
    pub fn is_success(&self) -> bool {
        self.apply.as_ref().is_none_or(ApplyReport::is_success)
    }
}

/// Drives one reconciliation of a local file against a remote collection.
pub struct SyncEngine {
    store: Arc<dyn RemoteStore>,
    config: SyncConfig,
    observer: Arc<dyn SyncObserver>,
}

impl SyncEngine {
    /// Creates an engine with a no-op observer.
    pub fn new(store: Arc<dyn RemoteStore>, config: SyncConfig) -> Self {
        Self {
            store,
            config,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Sets the progress observer.
    pub fn with_observer(mut self, observer: Arc<dyn SyncObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Loads `path`, fetches the collection and computes the diff.
    pub async fn plan(&self, path: &Path) -> SyncResult<SyncPlan> {
        self.config.validate()?;
        let local = load_input(path, &self.config.key_field)?;
        self.plan_records(path, local).await
    }

    /// Computes the diff for records already read from `source`, as returned
    /// by [`load_input`].
    pub async fn plan_records(&self, source: &Path, local: Vec<Record>) -> SyncResult<SyncPlan> {
        self.config.validate()?;
        self.observer.loaded(source, local.len());

        let collection = self.config.collection.as_str();
        debug!("Fetching {} from {}", collection, self.store.provider_name());
        let remote = self.store.list_all(collection).await?;
        self.observer.fetched(collection, remote.len());

        let local_count = local.len();
        let remote_count = remote.len();
        let diff = reconcile(local, &remote, &self.config.reconcile_options());
        self.observer.planned(&diff.counts());

        Ok(SyncPlan {
            local_count,
            remote_count,
            diff,
        })
    }

    /// Runs the full pipeline. Dry runs stop after planning.
    pub async fn run(&self, path: &Path) -> SyncResult<SyncReport> {
        let plan = self.plan(path).await?;
        self.execute(plan).await
    }

    /// Runs the pipeline for records already read from `source`.
    pub async fn run_records(&self, source: &Path, local: Vec<Record>) -> SyncResult<SyncReport> {
        let plan = self.plan_records(source, local).await?;
        self.execute(plan).await
    }

    async fn execute(&self, plan: SyncPlan) -> SyncResult<SyncReport> {
        let counts = plan.diff.counts();

        let apply = if self.config.dry_run {
            info!("Dry run: {} ops not applied", plan.diff.op_count());
            None
        } else {
            let ops = plan.diff.into_ops();
            let applier = BatchApplier::new(self.config.group_limit);
            let report = applier
                .apply(
                    self.store.as_ref(),
                    &self.config.collection,
                    &ops,
                    self.observer.as_ref(),
                )
                .await?;
            Some(report)
        };

        Ok(SyncReport {
            local_count: plan.local_count,
            remote_count: plan.remote_count,
            counts,
            apply,
        })
    }
}
