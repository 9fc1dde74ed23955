//! Shared logging setup for Dropzone binaries.
//!
//! Console output always goes to stderr. When a log directory is available
//! a second, non-ANSI layer writes to `<dir>/<app>.<date>.log`, one file per
//! day, keeping the last few days.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "dropzone=info,dropzone_logging=info";
const MAX_LOG_FILES: usize = 5;

/// Logging configuration shared by Dropzone binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    /// Console gets `debug` for the dropzone crates instead of the file filter.
    pub verbose: bool,
    /// Explicit log directory. `None` falls back to `$DROPZONE_HOME/logs`.
    pub log_dir: Option<PathBuf>,
    /// Disable the file layer entirely.
    pub console_only: bool,
}

/// Keeps the background file writer alive. Drop it only at exit, or buffered
/// lines are lost.
#[must_use = "dropping the handle stops file logging"]
pub struct LogHandle {
    dir: Option<PathBuf>,
    _guard: Option<WorkerGuard>,
}

impl LogHandle {
    /// Directory the file layer writes to, if any.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}

/// Initialize tracing with stderr output and, unless disabled, a daily log file.
pub fn init_logging(config: LogConfig<'_>) -> Result<LogHandle> {
    let file_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let console_filter = if config.verbose {
        EnvFilter::new("dropzone=debug,dropzone_logging=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    let log_dir = if config.console_only {
        None
    } else {
        config.log_dir.or_else(default_logs_dir)
    };

    match log_dir {
        Some(dir) => {
            let appender = file_appender(&dir, config.app_name)?;
            let (file_writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(file_writer)
                        .with_ansi(false)
                        .with_filter(file_filter),
                )
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_filter(console_filter),
                )
                .try_init()
                .context("Failed to install tracing subscriber")?;
            Ok(LogHandle {
                dir: Some(dir),
                _guard: Some(guard),
            })
        }
        None => {
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_filter(console_filter),
                )
                .try_init()
                .context("Failed to install tracing subscriber")?;
            Ok(LogHandle {
                dir: None,
                _guard: None,
            })
        }
    }
}

/// Daily-rotated appender for `<dir>/<app_name>.<date>.log`.
fn file_appender(dir: &Path, app_name: &str) -> Result<RollingFileAppender> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create logs directory: {}", dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(app_name)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
        .context("Failed to initialize log file appender")
}

/// Dropzone home directory: `$DROPZONE_HOME`, else `~/.dropzone`.
pub fn dropzone_home() -> Option<PathBuf> {
    if let Ok(override_path) = std::env::var("DROPZONE_HOME") {
        return Some(PathBuf::from(override_path));
    }
    dirs::home_dir().map(|home| home.join(".dropzone"))
}

/// Default logs directory: `<home>/logs`
pub fn default_logs_dir() -> Option<PathBuf> {
    dropzone_home().map(|home| home.join("logs"))
}
