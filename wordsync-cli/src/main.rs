//! wordsync: bring a remote word collection in line with a local JSON file.
//!
//! Usage:
//!   wordsync words.json [COLLECTION] [DATABASE] [KEY_FIELD]
//!   wordsync words.json basic words --provider mongo --mongo-url URL

use clap::Parser;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use wordsync_cli::{run, Cli, Logger};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let logger = Logger::from_env();
    match run(&cli, logger).await {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            logger.error(format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
