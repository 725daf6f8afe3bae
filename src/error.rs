//! Error types for chat-guardrails
//!
//! None of these are fatal to the host process. Callers log them and carry on
//! with whatever state they already had.

use std::path::PathBuf;

/// Errors raised by the moderation core
#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    /// Pattern source failed to compile as a regex
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Severity outside the 1-3 range
    #[error("invalid severity {value}, expected 1-3")]
    InvalidSeverity { value: i64 },

    /// Pattern file could not be read or written
    #[error("pattern file {}: {source}", path.display())]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Export to the paste service failed or returned nothing
    #[error("publication failed: {reason}")]
    PublicationFailure { reason: String },
}

impl ModerationError {
    pub(crate) fn publication(reason: impl Into<String>) -> Self {
        ModerationError::PublicationFailure {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModerationError>;
