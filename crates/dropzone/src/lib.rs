//! Dropzone - Watched-Directory Archive Intake
//!
//! A producer drops zip archives into an upload directory. Dropzone polls that
//! directory, waits until each file is a complete archive (or has gone stale),
//! checks it against the configured rules, and either extracts it under the
//! destination base or moves it to the rejected directory.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌───────────────┐
//! │   Poller    │     │    Gate     │     │  Validator  │     │   Extractor   │
//! │ (list dir   │────▶│ (ready /    │────▶│ (rule +     │────▶│  + delete     │
//! │  each tick) │     │ stale/defer)│     │  entry count│     │ or quarantine │
//! └─────────────┘     └─────────────┘     └─────────────┘     └───────────────┘
//! ```
//!
//! # Core Concepts
//!
//! - **Candidate**: a regular file seen in the upload directory during one tick
//! - **Rule**: filename pattern → expected entry count + destination
//! - **Stale threshold**: age after which a file is quarantined unopened
//! - **Outcome**: extracted, quarantined, or retained for the next tick

pub mod archive;
pub mod config;
pub mod disposition;
pub mod error;
pub mod extract;
pub mod gate;
pub mod poller;
pub mod rules;
pub mod shutdown;
pub mod types;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use config::{IntakeConfig, RuleConfig};
pub use error::{IntakeError, Result};
pub use poller::Poller;
pub use rules::{Rule, RuleRegistry};
pub use shutdown::ShutdownToken;
pub use types::{
    Admission, Candidate, DeferReason, EntryFailure, ExtractReport, Outcome, QuarantineReason,
    RetainReason, TickReport,
};
