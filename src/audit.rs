//! JSONL audit logging for chat-guardrails
//!
//! Records enforcement decisions and pattern changes to a JSONL file for
//! later review.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::input::{AdminRequest, ChannelMessage};
use crate::policy::Action;
use crate::rules::selector::MatchResult;
use crate::rules::Severity;

/// Log level for audit entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Actions were issued
    Enforced,

    /// Match recorded, only a warning issued (warn-only mode)
    Warn,

    /// Pattern added or overwritten
    Added,

    /// Pattern removed
    Removed,
}

/// An audit log entry
#[derive(Debug, Serialize)]
pub struct AuditEntry {
    /// Timestamp of the decision
    pub timestamp: DateTime<Utc>,

    /// Log level (ENFORCED, WARN, ADDED, REMOVED)
    pub level: LogLevel,

    /// Identity the entry concerns
    pub identity: String,

    /// Channel, for enforcement entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    /// Pattern source involved
    pub rule: String,

    /// Severity of the rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,

    /// Strike total after the violation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strikes: Option<u8>,

    /// Actions issued, in order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<&'static str>,
}

impl AuditEntry {
    /// Entry for a moderated message
    pub fn enforcement(
        message: &ChannelMessage,
        found: &MatchResult,
        strikes: u8,
        actions: &[Action],
        warn_only: bool,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            level: if warn_only {
                LogLevel::Warn
            } else {
                LogLevel::Enforced
            },
            identity: message.identity.clone(),
            channel: Some(message.channel.clone()),
            rule: found.source.clone(),
            severity: Some(found.severity),
            strikes: Some(strikes),
            actions: actions.iter().map(Action::kind).collect(),
        }
    }

    /// Entry for a pattern change
    pub fn mutation(request: &AdminRequest, level: LogLevel, rule: &str, severity: Option<Severity>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            identity: request.identity.clone(),
            channel: None,
            rule: rule.to_string(),
            severity,
            strikes: None,
            actions: Vec::new(),
        }
    }
}

/// Audit logger, shareable across threads
#[derive(Default)]
pub struct AuditLogger {
    writer: Option<Mutex<BufWriter<File>>>,
}

impl AuditLogger {
    /// Create a new audit logger; `None` or an unopenable path disables it
    pub fn new(path: Option<&Path>) -> Self {
        let writer = path.and_then(|p| {
            // Ensure parent directory exists
            if let Some(parent) = p.parent() {
                let _ = std::fs::create_dir_all(parent);
            }

            match OpenOptions::new().create(true).append(true).open(p) {
                Ok(file) => Some(Mutex::new(BufWriter::new(file))),
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "audit log disabled");
                    None
                }
            }
        });

        Self { writer }
    }

    /// Log an audit entry
    pub fn log(&self, entry: &AuditEntry) -> Result<(), std::io::Error> {
        if let Some(writer) = &self.writer {
            let json = serde_json::to_string(entry)?;
            let mut writer = writer.lock().unwrap_or_else(PoisonError::into_inner);
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Log an entry, reporting failure as a warning
    pub fn record(&self, entry: &AuditEntry) {
        if let Err(e) = self.log(entry) {
            tracing::warn!(error = %e, "failed to write audit log");
        }
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }
}
