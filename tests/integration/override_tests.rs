//! Integration tests for override mechanisms

use std::env;
use std::sync::Mutex;

use chat_guardrails::audit::AuditLogger;
use chat_guardrails::error::Result;
use chat_guardrails::publish::Publisher;
use chat_guardrails::{Action, ChatEvent, Config, ModerationEngine, PatternStore, Severity};

// Environment is process-wide; keep these tests from interleaving
static ENV_LOCK: Mutex<()> = Mutex::new(());

struct NoPaste;

impl Publisher for NoPaste {
    fn publish(&self, _title: &str, _text: &str) -> Result<String> {
        Ok("https://paste.example/none".to_string())
    }
}

fn engine() -> ModerationEngine {
    let store = PatternStore::in_memory();
    store.add(Severity::High, "badword").unwrap();
    ModerationEngine::from_parts(&Config::default(), store, Box::new(NoPaste), AuditLogger::default())
}

fn event(json: &str) -> ChatEvent {
    ChatEvent::from_json(json).unwrap()
}

const BAD_LINE: &str =
    r##"{"type":"message","identity":"t!~t@host","nick":"t","channel":"#agar","text":"badword"}"##;

// ============================================================================
// CHAT_GUARDRAILS_DISABLED Tests
// ============================================================================

#[test]
fn test_disabled_skips_moderation() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    // Without the override the line is banned
    let engine = engine();
    assert_eq!(engine.handle(&event(BAD_LINE)).actions.len(), 3);

    env::set_var("CHAT_GUARDRAILS_DISABLED", "1");
    let engine = self::engine();
    let response = engine.handle(&event(BAD_LINE));
    env::remove_var("CHAT_GUARDRAILS_DISABLED");

    assert!(response.is_empty());
    assert_eq!(engine.strikes().current("t!~t@host"), 0);
}

#[test]
fn test_disabled_still_allows_admin() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    env::set_var("CHAT_GUARDRAILS_DISABLED", "1");
    let engine = engine();
    let response = engine.handle(&event(
        r#"{"type":"admin","identity":"a!~a@host","nick":"a","command":"add 1 darn"}"#,
    ));
    env::remove_var("CHAT_GUARDRAILS_DISABLED");

    assert_eq!(response.reply_text(), Some("Word added: darn"));
}

// ============================================================================
// CHAT_GUARDRAILS_WARN_ONLY Tests
// ============================================================================

#[test]
fn test_warn_only_keeps_notice() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    env::set_var("CHAT_GUARDRAILS_WARN_ONLY", "1");
    let engine = engine();
    let response = engine.handle(&event(BAD_LINE));
    env::remove_var("CHAT_GUARDRAILS_WARN_ONLY");

    assert_eq!(response.actions.len(), 1);
    assert!(matches!(response.actions[0], Action::Notice { .. }));
    // Strikes still accumulate
    assert_eq!(engine.strikes().current("t!~t@host"), 3);
}

// ============================================================================
// Config overrides
// ============================================================================

#[test]
fn test_paste_key_from_environment() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    env::set_var("CHAT_GUARDRAILS_PASTE_KEY", "from-env");
    let config = Config::default().with_env_overrides();
    env::remove_var("CHAT_GUARDRAILS_PASTE_KEY");

    assert_eq!(config.publish.api_key, "from-env");
}

#[test]
fn test_custom_warning_prefix() {
    let mut config = Config::default();
    config.enforcement.warning_prefix = "Watch it: ".to_string();
    config.enforcement.warning_chars = 3;

    let store = PatternStore::in_memory();
    store.add(Severity::Low, "badword").unwrap();
    let engine = ModerationEngine::from_parts(&config, store, Box::new(NoPaste), AuditLogger::default());

    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let response = engine.handle(&event(BAD_LINE));
    assert_eq!(
        response.actions,
        [Action::Notice {
            nick: "t".to_string(),
            text: "Watch it: bad".to_string(),
        }]
    );
}

#[test]
fn test_config_file_loading() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[patterns]\nfile = \"/tmp/words.txt\"\n\n[strikes]\nwindow_secs = 60\n",
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.patterns.file, "/tmp/words.txt");
    assert_eq!(config.strikes.window_secs, 60);
    assert_eq!(config.publish.paste_name, "Badword_list");
}
