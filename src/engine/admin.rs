//! Admin commands: list, add and rem
//!
//! Malformed commands get no reply at all. Admins see silence rather than an
//! error, matching how the bot treats any other unknown trigger.

use crate::audit::{AuditEntry, LogLevel};
use crate::engine::{EngineState, Handler};
use crate::input::{AdminRequest, ChatEvent};
use crate::output::Response;
use crate::rules::Severity;

pub const LIST_PREFIX: &str = "Words: ";
pub const ADDED_PREFIX: &str = "Word added: ";
pub const REMOVED_PREFIX: &str = "Word removed: ";

/// A parsed admin command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// Publish and link the rule list
    List,

    /// Add or overwrite a rule
    Add { severity: Severity, pattern: String },

    /// Remove the rule with this exact source
    Remove { pattern: String },
}

impl AdminCommand {
    /// Parse `list`, `add <1-3> <pattern>` or `rem <pattern>`.
    ///
    /// The command splits on single spaces into at most three trimmed
    /// pieces, so an `add` pattern keeps its inner spaces and a `rem`
    /// pattern is rebuilt from its last two pieces. Returns `None` for
    /// anything malformed.
    pub fn parse(raw: &str) -> Option<Self> {
        let args: Vec<&str> = raw.trim().splitn(3, ' ').map(str::trim).collect();
        let subcommand = args.first()?.to_lowercase();

        match subcommand.as_str() {
            "list" => Some(AdminCommand::List),
            "add" => {
                if args.len() < 3 {
                    return None;
                }
                let severity = args[1]
                    .parse::<i64>()
                    .ok()
                    .and_then(|n| Severity::try_from(n).ok())?;
                let pattern = args[2];
                if pattern.is_empty() {
                    return None;
                }
                Some(AdminCommand::Add {
                    severity,
                    pattern: pattern.to_string(),
                })
            }
            "rem" => {
                let pattern = match args.len() {
                    2 => args[1].to_string(),
                    3 => format!("{} {}", args[1], args[2]),
                    _ => return None,
                };
                if pattern.trim().is_empty() {
                    return None;
                }
                Some(AdminCommand::Remove { pattern })
            }
            _ => None,
        }
    }
}

/// Handles `ChatEvent::Admin`
pub struct AdminHandler;

impl Handler for AdminHandler {
    fn name(&self) -> &'static str {
        "admin"
    }

    fn handle(&self, event: &ChatEvent, state: &EngineState) -> Response {
        match event {
            ChatEvent::Admin(request) => run(request, state),
            _ => Response::none(),
        }
    }
}

/// Run one admin request against the shared state
pub fn run(request: &AdminRequest, state: &EngineState) -> Response {
    let Some(command) = AdminCommand::parse(&request.command) else {
        tracing::debug!(command = %request.command, "ignoring malformed admin command");
        return Response::none();
    };

    match command {
        AdminCommand::List => {
            let reference = state.published_list();
            Response::reply(&request.nick, format!("{}{}", LIST_PREFIX, reference))
        }
        AdminCommand::Add { severity, pattern } => match state.store.add(severity, &pattern) {
            Ok(()) => {
                tracing::info!(admin = %request.identity, pattern = %pattern, %severity, "pattern added");
                state.audit.record(&AuditEntry::mutation(
                    request,
                    LogLevel::Added,
                    &pattern,
                    Some(severity),
                ));
                Response::reply(&request.nick, format!("{}{}", ADDED_PREFIX, pattern))
            }
            Err(e) => {
                tracing::error!(admin = %request.identity, error = %e, "rejected pattern");
                Response::none()
            }
        },
        AdminCommand::Remove { pattern } => {
            if !state.store.remove(&pattern) {
                return Response::none();
            }
            tracing::info!(admin = %request.identity, pattern = %pattern, "pattern removed");
            state
                .audit
                .record(&AuditEntry::mutation(request, LogLevel::Removed, &pattern, None));
            Response::reply(&request.nick, format!("{}{}", REMOVED_PREFIX, pattern))
        }
    }
}
