//! File logging with `tracing`.
//!
//! The terminal belongs to the UI, so log output goes to a daily rolling file
//! under the platform cache directory. Without a writable directory the
//! browser runs unlogged.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::DEFAULT_LOG_LEVEL;
use crate::error::{AppError, Result};

const LOG_FILE_PREFIX: &str = "plot-browser.log";

/// Directory for log files.
pub fn log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("plot-browser")
        .join("logs")
}

/// Filter precedence: an explicit level (config file or `--log-level`),
/// then `RUST_LOG`, then [`DEFAULT_LOG_LEVEL`]. A malformed directive falls
/// through to the next source.
fn build_filter(explicit: Option<&str>) -> EnvFilter {
    explicit
        .and_then(|level| EnvFilter::try_new(level).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Create `dir`, or report on stderr why logging is off.
fn prepare_dir(dir: &Path) -> Option<&Path> {
    match std::fs::create_dir_all(dir) {
        Ok(()) => Some(dir),
        Err(e) => {
            eprintln!(
                "Warning: logging disabled, cannot create {}: {}",
                dir.display(),
                e
            );
            None
        }
    }
}

/// Install the global subscriber. The returned guard flushes the writer on
/// drop and must be held for the lifetime of the program. `None` means no
/// log directory was available and nothing was installed.
pub fn init(level: Option<&str>) -> Result<Option<WorkerGuard>> {
    let dir = log_dir();
    let Some(dir) = prepare_dir(&dir) else {
        return Ok(None);
    };

    let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(build_filter(level))
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))?;

    tracing::info!(dir = %dir.display(), "logging initialized");
    Ok(Some(guard))
}
