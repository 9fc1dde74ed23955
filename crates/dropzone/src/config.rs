//! Configuration for the intake pipeline

use crate::error::{IntakeError, Result};
use crate::rules::Rule;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// Main configuration for Dropzone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Directory the producer drops archives into
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Root under which each rule's destination is created
    #[serde(default = "default_destination_base")]
    pub destination_base: PathBuf,

    /// Quarantine directory for files that fail any check
    #[serde(default = "default_rejected_dir")]
    pub rejected_dir: PathBuf,

    /// Age in milliseconds after which a file is quarantined without validation
    #[serde(default = "default_stale_file_wait_ms")]
    pub stale_file_wait_ms: u64,

    /// Delay between the end of one scan and the start of the next
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Classification rules, first match wins
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// One classification rule as written in the config file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleConfig {
    /// Regular expression matched against the whole filename
    pub pattern: String,
    /// Exact number of archive entries (files and directories)
    pub expected_entry_count: usize,
    /// Subdirectory of `destination_base` to extract into
    pub destination: String,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("files_in")
}

fn default_destination_base() -> PathBuf {
    PathBuf::from("files_out")
}

fn default_rejected_dir() -> PathBuf {
    PathBuf::from("files_bad")
}

fn default_stale_file_wait_ms() -> u64 {
    60_000
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            destination_base: default_destination_base(),
            rejected_dir: default_rejected_dir(),
            stale_file_wait_ms: default_stale_file_wait_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            rules: Vec::new(),
        }
    }
}

impl IntakeConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| IntakeError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| IntakeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn stale_threshold(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(i64::try_from(self.stale_file_wait_ms).unwrap_or(i64::MAX))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Check everything that can be checked without touching the filesystem.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(IntakeError::Config(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        let dirs = [
            ("upload_dir", &self.upload_dir),
            ("destination_base", &self.destination_base),
            ("rejected_dir", &self.rejected_dir),
        ];
        for (i, (name, dir)) in dirs.iter().enumerate() {
            if dir.as_os_str().is_empty() {
                return Err(IntakeError::Config(format!("{} must not be empty", name)));
            }
            for (other_name, other) in &dirs[i + 1..] {
                if dir == other {
                    return Err(IntakeError::Config(format!(
                        "{} and {} must be different directories ({})",
                        name,
                        other_name,
                        dir.display()
                    )));
                }
            }
        }

        for rule in &self.rules {
            Rule::new(&rule.pattern, rule.expected_entry_count, &rule.destination)?;
            validate_destination(&rule.destination)?;
        }

        Ok(())
    }

    /// Create the upload, destination and rejected directories if absent.
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.upload_dir, &self.destination_base, &self.rejected_dir] {
            if !dir.exists() {
                tracing::info!(dir = %dir.display(), "Creating missing directory");
            }
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// A rule destination must stay inside the destination base.
fn validate_destination(destination: &str) -> Result<()> {
    let path = Path::new(destination);
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes || path.as_os_str().is_empty() {
        return Err(IntakeError::Config(format!(
            "rule destination '{}' must be a relative path inside destination_base",
            destination
        )));
    }
    Ok(())
}
