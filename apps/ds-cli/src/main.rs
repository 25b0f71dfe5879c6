//! # streak
//!
//! Command-line host for Daily Streak.
//!
//! - `streak add/list/show` — manage daily goals
//! - `streak done <id>` — mark today complete (run again to uncheck)
//! - `streak photo <id> <path>` — attach a progress photo
//! - `streak remove <id>` — delete a goal and its photos
//! - `streak status` — when the daily reminder last fired
//!
//! Every invocation runs the once-a-day reminder check first.

mod commands;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ds_goal::calendar::local_days;
use ds_goal::{GoalStore, JsonlObserver, LogObserver, SharedGoalStore};
use ds_photo::PhotoPipeline;
use ds_storage::{FileStore, KeyValueStore};

use commands::goal::{GoalCommands, Today};
use config::Paths;

/// Log filter used when RUST_LOG is unset.
const DEFAULT_LOG_FILTER: &str = "ds_goal=info,ds_notify=info,streak=info";

/// Daily Streak — track daily goals, streaks, and progress photos.
#[derive(Parser)]
#[command(name = "streak", version, about)]
struct Cli {
    /// Data directory (defaults to the platform data dir).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (defaults to <data-dir>/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip the daily reminder check for this run.
    #[arg(long, global = true)]
    no_remind: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Goal(GoalCommands),
    /// Show when the daily reminder last fired.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't mix with command output. RUST_LOG,
    // when set, replaces the defaults entirely.
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(
            std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(),
        ))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let (paths, config) = Paths::resolve(cli.data_dir.as_deref(), cli.config.as_deref())?;
    tracing::debug!(
        data_dir = %paths.data_dir.display(),
        config = %paths.config_file.display(),
        "resolved paths"
    );

    let storage: Arc<dyn KeyValueStore> = Arc::new(
        FileStore::new(&paths.data_dir)
            .with_context(|| format!("Failed to open data dir: {}", paths.data_dir.display()))?
            .with_max_value_bytes(config.storage.max_value_bytes),
    );

    let mut store = GoalStore::open(storage.clone())
        .with_photo_pipeline(PhotoPipeline::new(config.photos));
    if let Some(e) = store.take_load_error() {
        eprintln!("WARNING: saved goals could not be read, starting empty: {}", e);
    }
    store.subscribe(Box::new(LogObserver));
    if let Some(path) = &config.storage.activity_log {
        store.subscribe(Box::new(JsonlObserver::new(path)));
    }

    let (today, yesterday) = local_days();
    let days = Today { today, yesterday };

    if !cli.no_remind {
        commands::remind::check(storage.clone(), &config.reminders, store.goals(), days);
    }

    let store = SharedGoalStore::new(store);
    match &cli.command {
        Commands::Goal(command) => commands::goal::execute(command, &store, days).await,
        Commands::Status => {
            commands::remind::status(storage, &config.reminders, days);
            Ok(())
        }
    }
}

/// The RUST_LOG value when it is set and valid, otherwise the defaults.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|spec| !spec.trim().is_empty())
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}
