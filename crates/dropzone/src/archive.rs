//! Archive integrity checks
//!
//! Two questions are asked of a zip file: is it ready (opens, has entries) and
//! is it valid for a rule (opens, entry count equals the expectation exactly).
//! Entry counts come from the central directory and include directory entries.
//! Neither check propagates errors: a file that will not open is simply not
//! ready, or not valid.

use crate::error::{IntakeError, Result};
use crate::rules::Rule;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};
use zip::ZipArchive;

pub(crate) type ZipReader = ZipArchive<BufReader<File>>;

/// Open a file as a zip archive.
pub(crate) fn open_archive(path: &Path) -> Result<ZipReader> {
    let file = File::open(path)?;
    ZipArchive::new(BufReader::new(file)).map_err(|source| IntakeError::Archive {
        path: path.to_path_buf(),
        source,
    })
}

/// Readiness of a file as an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    NonEmpty(usize),
    Empty,
    Unreadable(String),
}

impl Probe {
    pub fn is_ready(&self) -> bool {
        matches!(self, Probe::NonEmpty(_))
    }
}

/// Check whether a file opens as an archive with at least one entry.
pub fn probe(path: &Path) -> Probe {
    match open_archive(path) {
        Ok(archive) if archive.is_empty() => Probe::Empty,
        Ok(archive) => Probe::NonEmpty(archive.len()),
        Err(e) => Probe::Unreadable(e.to_string()),
    }
}

/// Result of validating an archive against a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid { entries: usize },
    CountMismatch { expected: usize, actual: usize },
    Unreadable(String),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid { .. })
    }
}

/// Validate the archive's entry count against the rule.
pub fn validate(path: &Path, rule: &Rule) -> Validation {
    let archive = match open_archive(path) {
        Ok(archive) => archive,
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Archive validation failed");
            return Validation::Unreadable(e.to_string());
        }
    };

    let actual = archive.len();
    info!(
        file = %path.display(),
        expected = rule.expected_entry_count,
        actual,
        "Validating archive entries"
    );

    if actual == rule.expected_entry_count {
        Validation::Valid { entries: actual }
    } else {
        Validation::CountMismatch {
            expected: rule.expected_entry_count,
            actual,
        }
    }
}
