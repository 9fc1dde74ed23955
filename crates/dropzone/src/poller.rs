//! Upload directory poller
//!
//! Polling rather than change notification: each tick lists the upload
//! directory, runs every entry through the readiness gate, then processes the
//! admitted files one at a time. The directory itself is the work queue, so
//! nothing is carried from one tick to the next.
//!
//! # Per-file pipeline
//!
//! ```text
//! gate ─ Stale ───────────────────────────────────────────▶ quarantine
//!      ─ Ready ─▶ rule lookup ─ none ──────────────────────▶ quarantine
//!                             ─ rule ─▶ validate ─ invalid ▶ quarantine
//!                                                ─ valid ──▶ extract ─▶ delete
//!      ─ Deferred ─▶ (left in place)
//! ```

use crate::archive::{self, Validation};
use crate::config::IntakeConfig;
use crate::disposition::{delete_source, quarantine};
use crate::error::Result;
use crate::extract::extract;
use crate::gate;
use crate::rules::{Rule, RuleRegistry};
use crate::shutdown::ShutdownToken;
use crate::types::{Admission, Candidate, Outcome, QuarantineReason, RetainReason, TickReport};
use chrono::Utc;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Drives the intake pipeline over the upload directory
pub struct Poller {
    upload_dir: PathBuf,
    destination_base: PathBuf,
    rejected_dir: PathBuf,
    registry: RuleRegistry,
    stale_threshold: chrono::Duration,
    interval: Duration,
}

impl Poller {
    /// Build a poller from a validated configuration.
    pub fn new(config: &IntakeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            upload_dir: config.upload_dir.clone(),
            destination_base: config.destination_base.clone(),
            rejected_dir: config.rejected_dir.clone(),
            registry: RuleRegistry::from_config(&config.rules)?,
            stale_threshold: config.stale_threshold(),
            interval: config.poll_interval(),
        })
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Poll until shutdown is requested.
    ///
    /// The delay runs from the end of one tick to the start of the next; a tick
    /// in progress always finishes before the loop exits.
    pub fn run(&self, shutdown: &ShutdownToken) {
        info!(
            upload_dir = %self.upload_dir.display(),
            interval_ms = self.interval.as_millis() as u64,
            stale_ms = self.stale_threshold.num_milliseconds(),
            rules = self.registry.len(),
            "Polling upload directory"
        );

        while !shutdown.is_requested() {
            self.run_once();
            if shutdown.sleep(self.interval) {
                break;
            }
        }

        info!("Poller stopped");
    }

    /// One scan of the upload directory and processing of everything admitted.
    pub fn run_once(&self) -> TickReport {
        let start = Instant::now();
        let mut report = TickReport {
            started_at: Some(Utc::now()),
            ..TickReport::default()
        };

        match self.scan() {
            Ok(candidates) => {
                report.scanned = candidates.len() as u64;

                let admitted: Vec<(&Candidate, Admission)> = candidates
                    .iter()
                    .filter_map(|candidate| {
                        let admission =
                            gate::evaluate(candidate, &self.registry, self.stale_threshold, Utc::now());
                        match admission {
                            Admission::Deferred(_) => None,
                            _ => Some((candidate, admission)),
                        }
                    })
                    .collect();
                report.deferred = report.scanned - admitted.len() as u64;

                for (candidate, admission) in admitted {
                    if let Some(outcome) = self.handle(candidate, admission) {
                        report.record(&outcome);
                    }
                }
            }
            Err(e) => {
                error!(
                    upload_dir = %self.upload_dir.display(),
                    error = %e,
                    "Failed to list upload directory"
                );
                report.listing_error = Some(e.to_string());
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        if report.had_activity() {
            info!(
                scanned = report.scanned,
                extracted = report.extracted,
                quarantined = report.quarantined,
                retained = report.retained,
                deferred = report.deferred,
                duration_ms = report.duration_ms,
                "Tick complete"
            );
        } else {
            debug!(scanned = report.scanned, deferred = report.deferred, "Tick complete");
        }
        report
    }

    /// List regular files currently in the upload directory.
    pub fn scan(&self) -> io::Result<Vec<Candidate>> {
        let mut candidates = Vec::new();
        for entry in fs::read_dir(&self.upload_dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Failed to read upload directory entry");
                    continue;
                }
            };
            let path = entry.path();
            // Follows symlinks; the entry may also vanish between listing and stat
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    debug!(file = %path.display(), error = %e, "Skipping entry without metadata");
                    continue;
                }
            };
            match Candidate::from_metadata(&path, &metadata) {
                Ok(Some(candidate)) => candidates.push(candidate),
                Ok(None) => debug!(path = %path.display(), "Skipping non-file entry"),
                Err(e) => {
                    debug!(file = %path.display(), error = %e, "Skipping entry without mtime")
                }
            }
        }
        Ok(candidates)
    }

    /// Run one admitted candidate to its outcome. Deferred candidates yield `None`.
    pub fn handle(&self, candidate: &Candidate, admission: Admission) -> Option<Outcome> {
        match admission {
            Admission::Deferred(_) => None,
            Admission::Stale => Some(self.reject(candidate, QuarantineReason::Stale)),
            Admission::Ready => Some(self.process(candidate)),
        }
    }

    fn process(&self, candidate: &Candidate) -> Outcome {
        info!(file = %candidate.file_name, "Detected complete candidate");

        let Some(rule) = self.registry.find(&candidate.file_name) else {
            warn!(file = %candidate.file_name, "No rule found for file");
            return self.reject(candidate, QuarantineReason::UnmatchedRule);
        };

        match archive::validate(&candidate.path, rule) {
            Validation::Valid { .. } => self.accept(candidate, rule),
            Validation::CountMismatch { expected, actual } => {
                self.reject(candidate, QuarantineReason::IntegrityMismatch { expected, actual })
            }
            Validation::Unreadable(message) => {
                self.reject(candidate, QuarantineReason::Unreadable(message))
            }
        }
    }

    fn accept(&self, candidate: &Candidate, rule: &Rule) -> Outcome {
        let destination = rule.destination_under(&self.destination_base);
        info!(
            file = %candidate.file_name,
            destination = %destination.display(),
            "Archive is valid, extracting contents"
        );

        let report = match extract(&candidate.path, &destination) {
            Ok(report) => report,
            Err(e) => {
                // Source stays in the upload directory and is retried next tick
                error!(file = %candidate.file_name, error = %e, "Error extracting archive");
                return Outcome::Retained {
                    reason: RetainReason::ExtractionUnavailable(e.to_string()),
                };
            }
        };

        info!(
            file = %candidate.file_name,
            files = report.files_written,
            dirs = report.dirs_created,
            failed_entries = report.failures.len(),
            "Extraction completed, cleaning up"
        );

        if let Err(e) = delete_source(&candidate.path) {
            error!(file = %candidate.file_name, error = %e, "Error deleting extracted source");
            return Outcome::Retained {
                reason: RetainReason::DispositionFailed(e.to_string()),
            };
        }

        Outcome::Extracted {
            destination,
            report,
        }
    }

    fn reject(&self, candidate: &Candidate, reason: QuarantineReason) -> Outcome {
        error!(file = %candidate.file_name, reason = %reason, "File is invalid, moving to rejected files");

        match quarantine(&candidate.path, &self.rejected_dir) {
            Ok(target) => Outcome::Quarantined { reason, target },
            Err(e) => {
                error!(file = %candidate.file_name, error = %e, "Error moving rejected file");
                Outcome::Retained {
                    reason: RetainReason::DispositionFailed(e.to_string()),
                }
            }
        }
    }
}
