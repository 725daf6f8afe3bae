//! Enforcement policy: strike value to ordered actions
//!
//! Thresholds are cumulative, evaluated high to low with fallthrough:
//!
//! | strikes | actions                 |
//! |---------|-------------------------|
//! | 3       | ban, remove, notice     |
//! | 2       | remove, notice          |
//! | 1       | notice                  |
//! | 0       | none                    |

use serde::Serialize;

use crate::config::EnforcementConfig;

/// Who and where an action targets
#[derive(Debug, Clone)]
pub struct Target<'a> {
    /// Identity mask (used for bans)
    pub identity: &'a str,

    /// Nick to notice or remove
    pub nick: &'a str,

    /// Channel the violation happened in
    pub channel: &'a str,
}

/// An enforcement step for the collaborator to execute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    /// Ban the identity mask from the channel
    Ban { channel: String, mask: String },

    /// Remove the user from the channel with a reason
    Remove {
        channel: String,
        nick: String,
        reason: String,
    },

    /// Privately warn the user
    Notice { nick: String, text: String },
}

impl Action {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Ban { .. } => "ban",
            Action::Remove { .. } => "remove",
            Action::Notice { .. } => "notice",
        }
    }
}

/// Computes actions and warning text
#[derive(Debug, Clone)]
pub struct EnforcementPolicy {
    warning_prefix: String,
    warning_chars: usize,
}

impl EnforcementPolicy {
    pub fn new(config: &EnforcementConfig) -> Self {
        Self {
            warning_prefix: config.warning_prefix.clone(),
            warning_chars: config.warning_chars,
        }
    }

    /// Warning label plus the first few characters of the matched text
    pub fn warning(&self, matched_text: &str) -> String {
        let quoted: String = matched_text.chars().take(self.warning_chars).collect();
        format!("{}{}", self.warning_prefix, quoted)
    }

    /// Actions for a strike value, in execution order
    pub fn apply(&self, strikes: u8, matched_text: &str, target: &Target<'_>) -> Vec<Action> {
        if strikes == 0 {
            return Vec::new();
        }

        let warning = self.warning(matched_text);
        let mut actions = Vec::with_capacity(3);

        if strikes >= 3 {
            actions.push(Action::Ban {
                channel: target.channel.to_string(),
                mask: target.identity.to_string(),
            });
        }
        if strikes >= 2 {
            actions.push(Action::Remove {
                channel: target.channel.to_string(),
                nick: target.nick.to_string(),
                reason: warning.clone(),
            });
        }
        actions.push(Action::Notice {
            nick: target.nick.to_string(),
            text: warning,
        });

        actions
    }
}

impl Default for EnforcementPolicy {
    fn default() -> Self {
        Self::new(&EnforcementConfig::default())
    }
}

/// Keep only the warning (used in warn-only mode)
pub fn warn_only(actions: Vec<Action>) -> Vec<Action> {
    actions
        .into_iter()
        .filter(|a| matches!(a, Action::Notice { .. }))
        .collect()
}
