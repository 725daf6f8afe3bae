//! Moderation engine for chat-guardrails
//!
//! Runs every event through a fixed, ordered list of handlers that share one
//! [`EngineState`].

pub mod admin;
pub mod moderation;

use std::env;
use std::sync::Arc;

use crate::audit::AuditLogger;
use crate::config::Config;
use crate::error::{ModerationError, Result};
use crate::input::ChatEvent;
use crate::output::Response;
use crate::policy::EnforcementPolicy;
use crate::publish::{render_rules, PastebinPublisher, PublicationCache, Publisher};
use crate::rules::store::PatternStore;
use crate::strikes::StrikeTracker;

use admin::AdminHandler;
use moderation::ModerationHandler;

/// Something that reacts to chat events
pub trait Handler: Send + Sync {
    /// Name for logs
    fn name(&self) -> &'static str;

    /// React to one event; handlers ignore events they do not care about
    fn handle(&self, event: &ChatEvent, state: &EngineState) -> Response;
}

/// State shared by all handlers
pub struct EngineState {
    pub store: PatternStore,
    pub strikes: StrikeTracker,
    pub policy: EnforcementPolicy,
    pub cache: Arc<PublicationCache>,
    pub publisher: Box<dyn Publisher>,
    pub audit: AuditLogger,
    pub paste_name: String,
    pub exempt_moderators: bool,
}

impl EngineState {
    /// Rule list reference, republished if the rules changed
    pub fn published_list(&self) -> String {
        self.cache.get_snapshot(|| {
            let text = render_rules(&self.store.list());
            self.publisher.publish(&self.paste_name, &text)
        })
    }
}

/// Publisher used when the paste client cannot be built
struct Unavailable(String);

impl Publisher for Unavailable {
    fn publish(&self, _title: &str, _text: &str) -> Result<String> {
        Err(ModerationError::publication(self.0.clone()))
    }
}

/// The main moderation engine
pub struct ModerationEngine {
    state: EngineState,
    handlers: Vec<Box<dyn Handler>>,
}

impl ModerationEngine {
    /// Create an engine from configuration: opens the pattern file, the
    /// audit log and the paste client
    pub fn new(config: &Config) -> Self {
        let store = PatternStore::open(config.patterns_path());

        let publisher: Box<dyn Publisher> =
            match PastebinPublisher::new(&config.publish, config.publish_timeout()) {
                Ok(publisher) => Box::new(publisher),
                Err(e) => {
                    tracing::error!(error = %e, "paste client unavailable");
                    Box::new(Unavailable(e.to_string()))
                }
            };

        let audit_path = if config.general.audit_log {
            config.audit_path()
        } else {
            None
        };
        let audit = AuditLogger::new(audit_path.as_deref());

        Self::from_parts(config, store, publisher, audit)
    }

    /// Create an engine from prebuilt parts
    pub fn from_parts(
        config: &Config,
        store: PatternStore,
        publisher: Box<dyn Publisher>,
        audit: AuditLogger,
    ) -> Self {
        let cache = Arc::new(PublicationCache::new());
        let state = EngineState {
            store: store.with_cache(cache.clone()),
            strikes: StrikeTracker::new(config.strike_window()),
            policy: EnforcementPolicy::new(&config.enforcement),
            cache,
            publisher,
            audit,
            paste_name: config.publish.paste_name.clone(),
            exempt_moderators: config.enforcement.exempt_moderators,
        };

        // Admin first so a command line is never also moderated as chat
        let handlers: Vec<Box<dyn Handler>> =
            vec![Box::new(AdminHandler), Box::new(ModerationHandler)];

        Self { state, handlers }
    }

    /// Check if moderation is disabled via environment
    pub fn is_disabled() -> bool {
        env::var("CHAT_GUARDRAILS_DISABLED").is_ok()
    }

    /// Check if warn-only mode is enabled
    pub fn is_warn_only() -> bool {
        env::var("CHAT_GUARDRAILS_WARN_ONLY").is_ok()
    }

    /// Main entry point: run an event through every handler
    pub fn handle(&self, event: &ChatEvent) -> Response {
        let mut response = Response::none();
        for handler in &self.handlers {
            let out = handler.handle(event, &self.state);
            if !out.is_empty() {
                tracing::debug!(
                    handler = handler.name(),
                    identity = event.identity(),
                    event = %event.summary(),
                    "handled"
                );
            }
            response.merge(out);
        }
        response
    }

    /// Pattern store
    pub fn store(&self) -> &PatternStore {
        &self.state.store
    }

    /// Strike tracker
    pub fn strikes(&self) -> &StrikeTracker {
        &self.state.strikes
    }

    /// Publication cache
    pub fn cache(&self) -> &PublicationCache {
        &self.state.cache
    }

    /// Handler names, in dispatch order
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }
}
