//! Filename classification rules
//!
//! A rule pairs a filename pattern with the number of entries the archive must
//! hold and the subdirectory (under the destination base) it extracts into.
//! Rules are evaluated in configured order and the first match wins.

use crate::config::RuleConfig;
use crate::error::{IntakeError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};

/// Compiled classification rule
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: String,
    matcher: Regex,
    pub expected_entry_count: usize,
    pub destination: PathBuf,
}

impl Rule {
    /// Compile a rule. The pattern must match the whole filename, so it is
    /// anchored on both ends.
    pub fn new(pattern: &str, expected_entry_count: usize, destination: impl Into<PathBuf>) -> Result<Self> {
        let matcher = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| IntakeError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            matcher,
            expected_entry_count,
            destination: destination.into(),
        })
    }

    /// The pattern as written in the configuration
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.matcher.is_match(file_name)
    }

    /// Where this rule's archives are extracted, given the destination base.
    pub fn destination_under(&self, base: &Path) -> PathBuf {
        base.join(&self.destination)
    }
}

/// Ordered rule set
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Compile rules from configuration, keeping their order.
    pub fn from_config(configs: &[RuleConfig]) -> Result<Self> {
        let rules = configs
            .iter()
            .map(|c| Rule::new(&c.pattern, c.expected_entry_count, &c.destination))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// First rule whose pattern matches the whole filename.
    pub fn find(&self, file_name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(file_name))
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
