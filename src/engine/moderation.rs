//! Message moderation: select, strike, enforce

use crate::audit::AuditEntry;
use crate::engine::{EngineState, Handler, ModerationEngine};
use crate::input::{ChannelMessage, ChatEvent};
use crate::output::Response;
use crate::policy::{self, Target};

/// Handles `ChatEvent::Message` and `ChatEvent::Action`
pub struct ModerationHandler;

impl Handler for ModerationHandler {
    fn name(&self) -> &'static str {
        "moderation"
    }

    fn handle(&self, event: &ChatEvent, state: &EngineState) -> Response {
        match event.channel_message() {
            Some(message) => check(message, state),
            None => Response::none(),
        }
    }
}

/// Moderate one channel line
pub fn check(message: &ChannelMessage, state: &EngineState) -> Response {
    if ModerationEngine::is_disabled() {
        return Response::none();
    }
    if message.exempt && state.exempt_moderators {
        return Response::none();
    }

    let Some(found) = state.store.select(&message.text) else {
        return Response::none();
    };

    let strikes = state
        .strikes
        .record(&message.identity, found.severity.value());

    let target = Target {
        identity: &message.identity,
        nick: &message.nick,
        channel: &message.channel,
    };
    let mut actions = state.policy.apply(strikes, &found.matched_text, &target);

    let warn_only = ModerationEngine::is_warn_only();
    if warn_only {
        actions = policy::warn_only(actions);
    }

    tracing::info!(
        identity = %message.identity,
        channel = %message.channel,
        rule = %found.source,
        severity = %found.severity,
        strikes,
        actions = actions.len(),
        "violation"
    );
    state.audit.record(&AuditEntry::enforcement(
        message, &found, strikes, &actions, warn_only,
    ));

    Response::enforce(actions)
}
