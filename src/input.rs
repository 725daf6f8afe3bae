//! Input parsing for chat events
//!
//! The collaborator writes one JSON event per line. Admin events have already
//! passed the collaborator's privilege check.

use serde::Deserialize;

/// A line of chat from a channel
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelMessage {
    /// Stable identity of the speaker (hostmask)
    pub identity: String,

    /// Display nick of the speaker
    pub nick: String,

    /// Channel the line was said in
    pub channel: String,

    /// Message text
    pub text: String,

    /// Speaker is a moderator and is not moderated
    #[serde(default)]
    pub exempt: bool,
}

/// An admin command, minus the trigger word
#[derive(Debug, Clone, Deserialize)]
pub struct AdminRequest {
    /// Identity of the admin
    pub identity: String,

    /// Nick replies go to
    pub nick: String,

    /// Raw command text, e.g. `add 2 darn`
    pub command: String,
}

/// Events delivered by the collaborator
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChatEvent {
    /// Regular channel message
    Message(ChannelMessage),

    /// `/me` action, moderated like a message
    Action(ChannelMessage),

    /// Pattern administration
    Admin(AdminRequest),
}

impl ChatEvent {
    /// Parse an event from a JSON line
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Channel line carried by this event, if any
    pub fn channel_message(&self) -> Option<&ChannelMessage> {
        match self {
            ChatEvent::Message(msg) | ChatEvent::Action(msg) => Some(msg),
            ChatEvent::Admin(_) => None,
        }
    }

    /// Identity behind this event
    pub fn identity(&self) -> &str {
        match self {
            ChatEvent::Message(msg) | ChatEvent::Action(msg) => &msg.identity,
            ChatEvent::Admin(req) => &req.identity,
        }
    }

    /// Get a summary of the event for logging
    pub fn summary(&self) -> String {
        match self {
            ChatEvent::Message(msg) => format!("{} <{}> {}", msg.channel, msg.nick, truncate(&msg.text)),
            ChatEvent::Action(msg) => format!("{} * {} {}", msg.channel, msg.nick, truncate(&msg.text)),
            ChatEvent::Admin(req) => format!("admin {}: {}", req.nick, truncate(&req.command)),
        }
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() > 100 {
        let head: String = text.chars().take(100).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
