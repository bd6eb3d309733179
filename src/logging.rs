//! File logging.
//!
//! The dashboard owns the terminal, so everything goes to
//! `{home}/logs/fund-tracker.log`.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE_NAME: &str = "fund-tracker.log";

/// Set up non-blocking file logging.
///
/// Respects `RUST_LOG`, defaulting to `info`. The returned guard must stay
/// alive for the duration of the program so buffered lines are flushed.
pub fn setup_logging(home: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = home.join("logs");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE_NAME);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(non_blocking_file)
        .with_filter(filter);

    tracing_subscriber::registry().with(file_layer).try_init()?;

    info!("Logging to file: {}", log_dir.join(LOG_FILE_NAME).display());

    Ok(guard)
}
