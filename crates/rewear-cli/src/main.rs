//! ReWear CLI - a command-line client for the ReWear clothing-exchange marketplace.
//!
//! Browse and list garments, request swaps, buy with points and manage
//! your profile from the terminal.

mod app;
mod cli;
mod format;
mod render;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rewear_core::Config;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use cli::Cli;

/// Log file name inside `<cache_dir>/logs`
const LOG_FILE: &str = "rewear.log";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr unless `log_dir` is given. The returned guard flushes
/// the file writer and must live until exit.
fn init_tracing(log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_dir {
        Some(dir) => {
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, LOG_FILE));
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

fn log_dir(config: &Config) -> Option<PathBuf> {
    let dir = config.cache_dir().ok()?.join("logs");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let loaded = Config::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    let _guard = if cli.log_file {
        init_tracing(log_dir(&config))
    } else {
        init_tracing(None)
    };
    if let Err(e) = &loaded {
        warn!(error = %e, "Failed to load config, using defaults");
    }
    info!(command = ?cli.command, "ReWear CLI starting");

    let mut app = App::new(config, cli.api_url, cli.json)?;
    app.run(cli.command).await
}
