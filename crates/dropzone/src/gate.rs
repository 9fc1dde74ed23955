//! Readiness gate
//!
//! Producers give no completion signal, so a file is only taken once it is
//! either a complete, non-empty archive matching a rule, or older than the
//! stale threshold. Everything else is left for a later scan.

use crate::archive::{probe, Probe};
use crate::rules::RuleRegistry;
use crate::types::{Admission, Candidate, DeferReason};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

/// Decide what to do with a candidate in this tick.
///
/// Stale candidates are admitted without being opened.
pub fn evaluate(
    candidate: &Candidate,
    registry: &RuleRegistry,
    stale_threshold: Duration,
    now: DateTime<Utc>,
) -> Admission {
    if candidate.age_at(now) > stale_threshold {
        warn!(file = %candidate.file_name, "Stale file detected");
        return Admission::Stale;
    }

    if registry.find(&candidate.file_name).is_none() {
        debug!(file = %candidate.file_name, "No rule matches yet, deferring");
        return Admission::Deferred(DeferReason::NoMatchingRule);
    }

    match probe(&candidate.path) {
        Probe::NonEmpty(_) => Admission::Ready,
        Probe::Empty => {
            debug!(file = %candidate.file_name, "Archive has no entries yet, deferring");
            Admission::Deferred(DeferReason::Incomplete)
        }
        Probe::Unreadable(reason) => {
            debug!(file = %candidate.file_name, reason = %reason, "Archive not readable yet, deferring");
            Admission::Deferred(DeferReason::Incomplete)
        }
    }
}
