//! Command-line arguments.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use wordsync_core::UpdatePolicy;

/// Remote backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    /// Google Cloud Firestore
    Firestore,
    /// MongoDB Atlas Data API
    Mongo,
}

impl Provider {
    pub fn default_collection(self) -> &'static str {
        match self {
            Provider::Firestore => wordsync_core::DEFAULT_COLLECTION,
            Provider::Mongo => wordsync_remote::DEFAULT_MONGO_COLLECTION,
        }
    }

    pub fn default_database(self) -> &'static str {
        match self {
            Provider::Firestore => "(default)",
            Provider::Mongo => wordsync_remote::DEFAULT_MONGO_DATABASE,
        }
    }
}

/// When matched documents are rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Only when the local record differs
    Changed,
    /// Every matched document
    Always,
}

impl From<PolicyArg> for UpdatePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Changed => UpdatePolicy::WhenChanged,
            PolicyArg::Always => UpdatePolicy::Always,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "wordsync")]
#[command(about = "Sync a local JSON word list into a remote collection")]
#[command(version)]
pub struct Cli {
    /// JSON file holding an array of word documents
    pub file: PathBuf,

    /// Target collection
    pub collection: Option<String>,

    /// Target database
    pub database: Option<String>,

    /// Field used to match local and remote documents
    pub key_field: Option<String>,

    /// Remote backend
    #[arg(long, value_enum, default_value = "firestore")]
    pub provider: Provider,

    /// Service-account key file (Firestore)
    #[arg(
        long,
        env = "GOOGLE_APPLICATION_CREDENTIALS",
        default_value = "service-account-key.json"
    )]
    pub credentials: PathBuf,

    /// Pre-issued OAuth access token; skips the key file (Firestore)
    #[arg(long, env = "WORDSYNC_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Google Cloud project id; defaults to the key file's project (Firestore)
    #[arg(long)]
    pub project: Option<String>,

    /// Firestore REST endpoint
    #[arg(long, default_value = "https://firestore.googleapis.com")]
    pub firestore_url: String,

    /// Data API base URL (Mongo)
    #[arg(long, env = "WORDSYNC_MONGO_URL")]
    pub mongo_url: Option<String>,

    /// Data API key (Mongo)
    #[arg(long, env = "WORDSYNC_MONGO_API_KEY", hide_env_values = true)]
    pub mongo_api_key: Option<String>,

    /// Atlas cluster name (Mongo)
    #[arg(long, default_value = "Cluster0")]
    pub data_source: String,

    /// When matched documents are rewritten
    #[arg(long, value_enum)]
    pub update_policy: Option<PolicyArg>,

    /// Maximum writes per group (1-500)
    #[arg(long)]
    pub group_size: Option<usize>,

    /// Report the changes without writing them
    #[arg(long)]
    pub dry_run: bool,

    /// JSON run configuration; command-line values take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
