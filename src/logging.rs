//! Application log file setup.
//!
//! Installs a `tracing` subscriber writing to the log file at
//! [`crate::quill_dirs::log_file_path`]. The returned guard must be kept
//! alive for the lifetime of the process; dropping it flushes the appender.

use crate::error::{ExpanderError, Result};
use crate::quill_dirs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

/// Initialize file logging in the application data directory.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or a global
/// subscriber is already installed.
pub fn init() -> Result<WorkerGuard> {
    init_at(&quill_dirs::app_data_dir())
}

/// Initialize file logging with the log file placed in `dir`.
///
/// # Errors
///
/// Returns an error if `dir` cannot be created or a global subscriber is
/// already installed.
pub fn init_at(dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, "log.txt");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| ExpanderError::Logging(format!("cannot install subscriber: {e}")))?;

    Ok(guard)
}
