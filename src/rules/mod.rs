//! Moderation rules for chat-guardrails
//!
//! A rule is a case-insensitive regex tagged with a severity. Rules live in
//! the [`store::PatternStore`] and are matched by [`selector::select`].

pub mod selector;
pub mod store;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::fmt;

use crate::error::{ModerationError, Result};

/// How bad a match is; also the number of strikes it adds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub enum Severity {
    /// Warn
    Low = 1,

    /// Warn and remove on a repeat
    Medium = 2,

    /// Straight to a ban
    High = 3,
}

impl Severity {
    /// Highest severity; a match at this level ends the search
    pub const MAX: Severity = Severity::High;

    /// Numeric value (1-3)
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Parse a single decimal digit, as stored at the start of a pattern line
    pub fn from_digit(c: char) -> Option<Self> {
        c.to_digit(10).and_then(|d| Severity::try_from(d as i64).ok())
    }
}

impl TryFrom<i64> for Severity {
    type Error = ModerationError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            1 => Ok(Severity::Low),
            2 => Ok(Severity::Medium),
            3 => Ok(Severity::High),
            _ => Err(ModerationError::InvalidSeverity { value }),
        }
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.value()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// A compiled moderation rule
#[derive(Debug, Clone)]
pub struct Rule {
    /// Pattern source as typed by the admin; the rule's identity
    pub source: String,

    /// Case-insensitive compiled form
    pub regex: Regex,

    /// Severity of a match
    pub severity: Severity,
}

impl Rule {
    /// Compile a rule, failing with `InvalidPattern` on bad syntax
    pub fn new(severity: Severity, source: &str) -> Result<Self> {
        let regex = compile_pattern(source)?;
        Ok(Self {
            source: source.to_string(),
            regex,
            severity,
        })
    }

    /// Serialized form: severity digit followed directly by the source
    pub fn to_line(&self) -> String {
        format!("{}{}", self.severity, self.source)
    }
}

/// Compile a pattern source case-insensitively
pub fn compile_pattern(source: &str) -> Result<Regex> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .build()
        .map_err(|e| ModerationError::InvalidPattern {
            pattern: source.to_string(),
            source: e,
        })
}
