//! tks-sync - Troubleshooting knowledge sync tool
//!
//! Reconciles the local troubleshooting article corpus with the entry
//! database and the GitHub Discussions mirror. Safe to re-run at any time:
//! content checksums make every step idempotent, so retries after partial
//! failures never duplicate a row or a discussion.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tks_sync::config::{CliSettings, SyncConfig};
use tks_sync::loader;
use tks_sync::store::database::SqliteEntryStore;
use tks_sync::store::github::GithubDiscussions;
use tks_sync::sync::runner;

/// Command-line arguments for tks-sync
#[derive(Parser, Debug)]
#[command(name = "tks-sync")]
#[command(about = "Sync troubleshooting articles to the entry database and GitHub Discussions")]
#[command(version)]
struct Args {
    /// Directory holding the article corpus
    #[arg(short, long, env = "TKS_CONTENT_DIR")]
    content_dir: Option<PathBuf>,

    /// Path to the entry database
    #[arg(short, long, env = "TKS_DATABASE_PATH")]
    database_path: Option<PathBuf>,

    /// GitHub API token with discussion write access
    #[arg(long, env = "TKS_GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// GitHub repository hosting the discussion mirror (owner/name)
    #[arg(long, env = "TKS_GITHUB_REPOSITORY")]
    github_repository: Option<String>,

    /// Discussion category for mirrored articles
    #[arg(long, env = "TKS_DISCUSSION_CATEGORY")]
    discussion_category: Option<String>,

    /// Base URL of the published site, for attribution footers
    #[arg(long, env = "TKS_SITE_BASE_URL")]
    site_base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tks_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting tks-sync");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Configuration errors here are fatal: no entry is processed
    let file_config =
        tks_common::config::load_file_config().context("Failed to load config file")?;
    let config = SyncConfig::resolve(
        CliSettings {
            content_dir: args.content_dir,
            database_path: args.database_path,
            github_token: args.github_token,
            github_repository: args.github_repository,
            discussion_category: args.discussion_category,
            site_base_url: args.site_base_url,
        },
        &file_config,
    )
    .context("Configuration error")?;

    let pool = tks_common::db::init_database_pool(&config.database_path)
        .await
        .context("Failed to open entry database")?;
    info!("Database: {}", config.database_path.display());

    let entry_store = SqliteEntryStore::new(pool);

    let discussion_store = GithubDiscussions::connect(
        config.github_token.clone(),
        &config.github_owner,
        &config.github_repo,
        &config.discussion_category,
    )
    .await
    .context("Failed to connect to GitHub Discussions")?;
    info!(
        "Discussion mirror: {}/{} ({})",
        config.github_owner, config.github_repo, config.discussion_category
    );

    let corpus =
        loader::load_entries(&config.content_dir).context("Failed to load entry corpus")?;

    let report = runner::run_all(
        &corpus.entries,
        &entry_store,
        &discussion_store,
        &config.site_base_url,
    )
    .await
    .context("Reconciliation run failed")?;

    if report.has_errors() || corpus.failures > 0 {
        error!("Run finished with errors");
        std::process::exit(1);
    }

    Ok(())
}
