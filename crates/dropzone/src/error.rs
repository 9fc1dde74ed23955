//! Error types for the intake pipeline

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Intake error type
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Pattern error: {pattern}: {message}")]
    Pattern { pattern: String, message: String },

    #[error("Archive error for '{path}': {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to {action} '{path}': {source}")]
    Disposition {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl IntakeError {
    pub(crate) fn disposition(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Disposition {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, IntakeError>;
