//! `timekeeper` command-line entry point.
//!
//! Resolves configuration, installs logging on stderr, opens the selected
//! store, and runs one command against it.

mod cli;
mod commands;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use commands::App;
use std::sync::Arc;
use timekeeper::config::{DEFAULT_LOG_FILTER, StorageBackend, TrackerConfig};
use timekeeper::tracking::adapters::{
    journal::JournalStore, memory::InMemoryStore, postgres::PostgresStore,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = TrackerConfig::from_env(cli.overrides())?;
    init_logging(&config.log_filter);
    debug!(storage = ?config.storage, "configuration resolved");

    let mut out = std::io::stdout();
    match config.storage {
        StorageBackend::Memory => {
            App::new(Arc::new(InMemoryStore::new()))
                .run(cli.command, &mut out)
                .await
        }
        StorageBackend::Journal { dir } => {
            let store = JournalStore::open(&dir)
                .with_context(|| format!("failed to open journal in {dir}"))?;
            App::new(Arc::new(store)).run(cli.command, &mut out).await
        }
        StorageBackend::Postgres { url } => {
            let store = PostgresStore::connect(&url).await?;
            App::new(Arc::new(store)).run(cli.command, &mut out).await
        }
    }
}

fn init_logging(filter: &str) {
    let env_filter =
        EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
