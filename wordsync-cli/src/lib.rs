//! wordsync command-line front end.
//!
//! Turns [`Cli`] arguments into a [`SyncConfig`] and a remote store, then
//! drives a [`SyncEngine`] run with console progress output.

mod args;
pub mod console;
mod progress;

pub use args::{Cli, PolicyArg, Provider};
pub use console::Logger;
pub use progress::ConsoleObserver;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use wordsync_core::{
    load_input, RemoteStore, SyncConfig, SyncEngine, SyncError, SyncReport, UpdatePolicy,
};
use wordsync_remote::{
    CredentialProvider, FirestoreConfig, FirestoreStore, MongoConfig, MongoDataApiStore,
    ServiceAccountCredentials, StaticToken,
};

/// Run configuration as read from a `--config` file. An absent `collection`
/// falls back to the provider's default collection; every other absent field
/// takes its [`SyncConfig::default`] value.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    collection: Option<String>,
    key_field: Option<String>,
    update_policy: Option<UpdatePolicy>,
    group_limit: Option<usize>,
    dry_run: Option<bool>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SyncError::NotFound(path.to_path_buf()).into());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))
    }
}

/// Builds the run configuration: command line, then `--config` file, then
/// provider defaults.
pub fn resolve_config(cli: &Cli) -> Result<SyncConfig> {
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let defaults = SyncConfig::default();

    let config = SyncConfig {
        collection: cli
            .collection
            .clone()
            .or(file.collection)
            .unwrap_or_else(|| cli.provider.default_collection().to_string()),
        key_field: cli
            .key_field
            .clone()
            .or(file.key_field)
            .unwrap_or(defaults.key_field),
        update_policy: cli
            .update_policy
            .map(UpdatePolicy::from)
            .or(file.update_policy)
            .unwrap_or(defaults.update_policy),
        group_limit: cli
            .group_size
            .or(file.group_limit)
            .unwrap_or(defaults.group_limit),
        dry_run: cli.dry_run || file.dry_run.unwrap_or(false),
    };
    config.validate()?;
    Ok(config)
}

/// Database name for the selected provider.
pub fn resolve_database(cli: &Cli) -> String {
    cli.database
        .clone()
        .unwrap_or_else(|| cli.provider.default_database().to_string())
}

/// Builds the store for `cli.provider`. Firestore credentials are exchanged
/// here so a bad key stops the run before the collection is read.
pub async fn build_store(cli: &Cli, logger: &Logger) -> Result<Arc<dyn RemoteStore>> {
    let database = resolve_database(cli);
    match cli.provider {
        Provider::Firestore => {
            let mut key_project = None;
            let credentials: Arc<dyn CredentialProvider> = match &cli.access_token {
                Some(token) => Arc::new(StaticToken::new(token.clone())),
                None => {
                    let creds = ServiceAccountCredentials::from_file(&cli.credentials)
                        .with_context(|| {
                            format!("failed to load service account {}", cli.credentials.display())
                        })?;
                    key_project = creds.project_id().map(str::to_string);
                    Arc::new(creds)
                }
            };

            let Some(project_id) = cli.project.clone().or(key_project) else {
                bail!("no project id: pass --project or use a key file with project_id");
            };

            credentials
                .access_token()
                .await
                .context("authentication failed")?;
            logger.success(format!(
                "Authenticated with {} for project \"{project_id}\"",
                credentials.kind()
            ));

            let config = FirestoreConfig {
                project_id,
                database_id: database,
                base_url: cli.firestore_url.clone(),
                ..Default::default()
            };
            Ok(Arc::new(FirestoreStore::new(config, credentials)?))
        }
        Provider::Mongo => {
            let config = MongoConfig {
                base_url: cli.mongo_url.clone().unwrap_or_default(),
                api_key: cli.mongo_api_key.clone().unwrap_or_default(),
                data_source: cli.data_source.clone(),
                database,
                ..Default::default()
            };
            Ok(Arc::new(MongoDataApiStore::new(config)?))
        }
    }
}

/// Runs one sync as described by `cli`.
///
/// The input file is read and checked before the store is built, so a bad
/// file never reaches the network. Returns the report even when some groups
/// failed; the caller decides the exit status with [`SyncReport::is_success`].
pub async fn run(cli: &Cli, logger: Logger) -> Result<SyncReport> {
    let config = resolve_config(cli)?;
    if cli.collection.is_none() {
        logger.log(format!("Using \"{}\" collection", config.collection));
    }
    debug!("Resolved config: {:?}", config);

    let local = load_input(&cli.file, &config.key_field)?;
    let store = build_store(cli, &logger).await?;
    logger.log(format!(
        "Syncing \"{}\" into {} collection \"{}\"",
        cli.file.display(),
        store.provider_name(),
        config.collection
    ));

    let engine =
        SyncEngine::new(store, config).with_observer(Arc::new(ConsoleObserver::new(logger)));
    let report = engine.run_records(&cli.file, local).await?;

    match &report.apply {
        None => logger.warn("Dry run: no changes written"),
        Some(apply) if apply.is_success() => logger.success(format!(
            "Sync finished: {} writes committed",
            apply.committed_ops()
        )),
        Some(apply) => logger.error(format!(
            "Sync incomplete: {} writes committed, groups {:?} failed",
            apply.committed_ops(),
            apply.failed_groups()
        )),
    }
    Ok(report)
}
