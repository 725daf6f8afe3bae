//! chat-guardrails - Pattern-based moderation for chat streams
//!
//! This library classifies chat messages against a live set of
//! severity-tagged regex rules, tracks a decaying strike score per speaker,
//! and tells the hosting bot which enforcement actions to take.
//!
//! # Features
//!
//! - **Pattern store**: add/remove/list rules at runtime, persisted to a flat file
//! - **Match selection**: highest severity wins, severity 3 ends the search
//! - **Strike tracking**: per-identity score, clamped to 3, expires after 10 minutes idle
//! - **Escalation**: notice, then remove, then ban
//! - **Published rule list**: exported to a paste service, regenerated only after changes
//! - **Audit logging**: JSONL log of enforcement and rule changes
//!
//! # Example
//!
//! ```
//! use chat_guardrails::{ChatEvent, Config, ModerationEngine, PatternStore, Severity};
//! use chat_guardrails::audit::AuditLogger;
//! use chat_guardrails::publish::Publisher;
//!
//! struct NoPaste;
//! impl Publisher for NoPaste {
//!     fn publish(&self, _: &str, _: &str) -> chat_guardrails::error::Result<String> {
//!         Ok("https://paste.example/x".to_string())
//!     }
//! }
//!
//! let store = PatternStore::in_memory();
//! store.add(Severity::High, "badword").unwrap();
//! let engine = ModerationEngine::from_parts(
//!     &Config::default(),
//!     store,
//!     Box::new(NoPaste),
//!     AuditLogger::default(),
//! );
//!
//! let line = r##"{"type":"message","identity":"t!~t@host","nick":"t","channel":"#c","text":"a badword"}"##;
//! let response = engine.handle(&ChatEvent::from_json(line).unwrap());
//! assert_eq!(response.actions.len(), 3);
//! ```

pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod output;
pub mod policy;
pub mod publish;
pub mod rules;
pub mod strikes;

// Re-exports for convenience
pub use config::Config;
pub use engine::ModerationEngine;
pub use error::ModerationError;
pub use input::{AdminRequest, ChannelMessage, ChatEvent};
pub use output::Response;
pub use policy::Action;
pub use rules::store::PatternStore;
pub use rules::Severity;
