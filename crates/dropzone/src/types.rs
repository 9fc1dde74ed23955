//! Core types for the intake pipeline

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

/// A file observed in the upload directory during one scan.
///
/// Recomputed on every tick; the path is its only identity.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub path: PathBuf,
    pub file_name: String,
    pub modified: DateTime<Utc>,
}

impl Candidate {
    /// Build a candidate from a directory entry's metadata.
    ///
    /// Returns `None` for anything that is not a regular file.
    pub fn from_metadata(path: &Path, metadata: &Metadata) -> std::io::Result<Option<Self>> {
        if !metadata.is_file() {
            return Ok(None);
        }
        let Some(name) = path.file_name() else {
            return Ok(None);
        };
        let modified = DateTime::<Utc>::from(metadata.modified()?);
        Ok(Some(Self {
            path: path.to_path_buf(),
            file_name: name.to_string_lossy().into_owned(),
            modified,
        }))
    }

    /// Age relative to `now`. A modification time in the future counts as zero.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        let age = now.signed_duration_since(self.modified);
        if age < Duration::zero() {
            Duration::zero()
        } else {
            age
        }
    }
}

/// Gate decision for one candidate in one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Matches a rule and opens as a non-empty archive.
    Ready,
    /// Older than the stale threshold; goes to quarantine without being opened.
    Stale,
    /// Left in place for the next tick.
    Deferred(DeferReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferReason {
    NoMatchingRule,
    /// Not yet openable as an archive, or no entries yet.
    Incomplete,
}

/// Why a file was sent to the rejected directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuarantineReason {
    Stale,
    UnmatchedRule,
    IntegrityMismatch { expected: usize, actual: usize },
    Unreadable(String),
}

impl fmt::Display for QuarantineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuarantineReason::Stale => write!(f, "stale"),
            QuarantineReason::UnmatchedRule => write!(f, "no matching rule"),
            QuarantineReason::IntegrityMismatch { expected, actual } => {
                write!(f, "expected {} entries, found {}", expected, actual)
            }
            QuarantineReason::Unreadable(msg) => write!(f, "unreadable archive: {}", msg),
        }
    }
}

/// Why a file was left in the upload directory after being accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetainReason {
    /// The archive could not be opened for extraction.
    ExtractionUnavailable(String),
    /// Deleting or moving the source failed.
    DispositionFailed(String),
}

/// A single entry that could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    pub entry: String,
    pub message: String,
}

/// What an extraction produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub dirs_created: usize,
    pub files_written: usize,
    pub failures: Vec<EntryFailure>,
}

/// Terminal result of processing one accepted candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Extracted {
        destination: PathBuf,
        report: ExtractReport,
    },
    Quarantined {
        reason: QuarantineReason,
        target: PathBuf,
    },
    Retained {
        reason: RetainReason,
    },
}

/// Counters for one tick of the poller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickReport {
    pub started_at: Option<DateTime<Utc>>,
    pub scanned: u64,
    pub deferred: u64,
    pub extracted: u64,
    pub quarantined: u64,
    pub retained: u64,
    pub entry_failures: u64,
    pub duration_ms: u64,
    pub listing_error: Option<String>,
}

impl TickReport {
    pub(crate) fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Extracted { report, .. } => {
                self.extracted += 1;
                self.entry_failures += report.failures.len() as u64;
            }
            Outcome::Quarantined { .. } => self.quarantined += 1,
            Outcome::Retained { .. } => self.retained += 1,
        }
    }

    /// True when this tick moved, deleted or retained anything.
    pub fn had_activity(&self) -> bool {
        self.extracted + self.quarantined + self.retained > 0
    }
}
