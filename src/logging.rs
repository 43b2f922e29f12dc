//! File logging via `tracing`.
//!
//! The terminal belongs to the UI, so events go to `slashpad.log` in the log
//! directory through a non-blocking writer. Keep the returned guard alive for
//! the lifetime of the program or buffered lines are lost.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "slashpad.log";
const DEFAULT_FILTER: &str = "info";

/// Default log directory: the platform data dir, else the working directory.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("slashpad"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Filter directive: explicit level, then `RUST_LOG`, then `info`.
pub fn filter_directive(level: Option<&str>, env: Option<String>) -> String {
    match level {
        Some(level) if !level.trim().is_empty() => level.trim().to_string(),
        _ => env
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string()),
    }
}

/// Install the global subscriber. Returns `None` when logging could not be set
/// up; the editor runs without logs in that case.
pub fn init(level: Option<&str>, log_dir: &Path) -> Option<WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!("Warning: cannot create log directory {}: {}", log_dir.display(), e);
        return None;
    }

    let directive = filter_directive(level, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => {
            tracing::info!(log_dir = %log_dir.display(), filter = %directive, "logging initialized");
            Some(guard)
        }
        // A subscriber is already installed.
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_level_wins() {
        assert_eq!(filter_directive(Some("debug"), Some("warn".into())), "debug");
    }

    #[test]
    fn falls_back_to_env_then_default() {
        assert_eq!(filter_directive(None, Some("slashpad=trace".into())), "slashpad=trace");
        assert_eq!(filter_directive(Some("  "), None), "info");
        assert_eq!(filter_directive(None, Some(String::new())), "info");
    }
}
