//! Output formatting for collaborator responses
//!
//! One JSON object per event. An event with no effect serializes to `{}`.

use serde::Serialize;

use crate::policy::Action;

/// Private text reply to the requester
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    /// Nick to message
    pub nick: String,

    /// Reply text
    pub text: String,
}

/// What the collaborator should do in response to one event
#[derive(Debug, Clone, Default, Serialize)]
pub struct Response {
    /// Enforcement actions, in execution order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,

    /// Reply to an admin command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<Reply>,
}

impl Response {
    /// Response with nothing to do
    pub fn none() -> Self {
        Self::default()
    }

    /// Response carrying enforcement actions
    pub fn enforce(actions: Vec<Action>) -> Self {
        Self {
            actions,
            reply: None,
        }
    }

    /// Response carrying a reply
    pub fn reply(nick: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            actions: Vec::new(),
            reply: Some(Reply {
                nick: nick.into(),
                text: text.into(),
            }),
        }
    }

    /// Fold another handler's response into this one
    pub fn merge(&mut self, other: Response) {
        self.actions.extend(other.actions);
        if other.reply.is_some() {
            self.reply = other.reply;
        }
    }

    /// Check if there is nothing to do
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.reply.is_none()
    }

    /// Reply text, if any
    pub fn reply_text(&self) -> Option<&str> {
        self.reply.as_ref().map(|r| r.text.as_str())
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
