//! Integration tests for pattern administration and the published list

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use chat_guardrails::audit::AuditLogger;
use chat_guardrails::error::{ModerationError, Result};
use chat_guardrails::publish::Publisher;
use chat_guardrails::{ChatEvent, Config, ModerationEngine, PatternStore, Severity};
use tempfile::TempDir;

/// Publisher that records what it was asked to publish
#[derive(Clone, Default)]
struct RecordingPublisher {
    calls: Arc<AtomicUsize>,
    texts: Arc<Mutex<Vec<String>>>,
    failing: Arc<AtomicBool>,
}

impl Publisher for RecordingPublisher {
    fn publish(&self, title: &str, text: &str) -> Result<String> {
        assert_eq!(title, "Badword_list");
        if self.failing.load(Ordering::SeqCst) {
            return Err(ModerationError::PublicationFailure {
                reason: "service down".to_string(),
            });
        }
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.texts.lock().unwrap().push(text.to_string());
        Ok(format!("https://paste.example/{}", n))
    }
}

struct Fixture {
    _dir: TempDir,
    path: PathBuf,
    publisher: RecordingPublisher,
    engine: ModerationEngine,
}

fn fixture_with(initial: &str) -> Fixture {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("badwords.txt");
    fs::write(&path, initial).unwrap();

    let publisher = RecordingPublisher::default();
    let engine = ModerationEngine::from_parts(
        &Config::default(),
        PatternStore::open(&path),
        Box::new(publisher.clone()),
        AuditLogger::default(),
    );

    Fixture {
        _dir: dir,
        path,
        publisher,
        engine,
    }
}

fn fixture() -> Fixture {
    fixture_with("")
}

fn admin(engine: &ModerationEngine, command: &str) -> Option<String> {
    let json = format!(
        r#"{{"type":"admin","identity":"admin!~a@host","nick":"admin","command":"{}"}}"#,
        command.replace('\\', "\\\\").replace('"', "\\\"")
    );
    let event = ChatEvent::from_json(&json).unwrap();
    let response = engine.handle(&event);
    assert!(response.actions.is_empty());
    response.reply_text().map(str::to_string)
}

fn file_lines(path: &PathBuf) -> Vec<String> {
    let mut lines: Vec<String> = fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    lines.sort();
    lines
}

// ============================================================================
// add
// ============================================================================

#[test]
fn test_add_confirms_and_persists() {
    let f = fixture();
    admin(&f.engine, "list");
    assert!(!f.engine.cache().is_dirty());

    let reply = admin(&f.engine, "add 2 darn");
    assert_eq!(reply.as_deref(), Some("Word added: darn"));
    assert_eq!(file_lines(&f.path), ["2darn"]);
    assert_eq!(f.engine.store().get("darn"), Some(Severity::Medium));
    assert!(f.engine.cache().is_dirty());
}

#[test]
fn test_add_then_list_regenerates() {
    let f = fixture();
    assert_eq!(admin(&f.engine, "list").as_deref(), Some("Words: https://paste.example/1"));

    admin(&f.engine, "add 2 darn");
    assert_eq!(admin(&f.engine, "list").as_deref(), Some("Words: https://paste.example/2"));

    let texts = f.publisher.texts.lock().unwrap();
    assert_eq!(texts[1], "Words:\n2 darn\n");
}

#[test]
fn test_add_pattern_with_spaces() {
    let f = fixture();
    assert_eq!(
        admin(&f.engine, "add 3 very bad word").as_deref(),
        Some("Word added: very bad word")
    );
    assert_eq!(file_lines(&f.path), ["3very bad word"]);
}

#[test]
fn test_add_overwrites_existing() {
    let f = fixture_with("1darn\n");
    admin(&f.engine, "add 3 darn");
    assert_eq!(f.engine.store().len(), 1);
    assert_eq!(file_lines(&f.path), ["3darn"]);
}

#[test]
fn test_add_rejected_quietly() {
    let f = fixture_with("1spam\n");
    let before = fs::read_to_string(&f.path).unwrap();

    for command in ["add", "add 2", "add x darn", "add 0 darn", "add 4 darn", "add 2 (unclosed"] {
        assert_eq!(admin(&f.engine, command), None, "command: {}", command);
    }
    assert_eq!(f.engine.store().len(), 1);
    assert_eq!(fs::read_to_string(&f.path).unwrap(), before);
}

// ============================================================================
// rem
// ============================================================================

#[test]
fn test_rem_existing() {
    let f = fixture_with("1spam\n3badword\n");
    assert_eq!(admin(&f.engine, "rem spam").as_deref(), Some("Word removed: spam"));
    assert_eq!(file_lines(&f.path), ["3badword"]);
}

#[test]
fn test_rem_pattern_with_space() {
    let f = fixture();
    admin(&f.engine, "add 1 bad word");
    assert_eq!(admin(&f.engine, "rem bad word").as_deref(), Some("Word removed: bad word"));
    assert!(f.engine.store().is_empty());
}

#[test]
fn test_rem_absent_is_silent_and_leaves_cache_clean() {
    let f = fixture_with("1spam\n");
    admin(&f.engine, "list");
    assert!(!f.engine.cache().is_dirty());
    let before = fs::read_to_string(&f.path).unwrap();

    assert_eq!(admin(&f.engine, "rem eggs"), None);
    assert_eq!(fs::read_to_string(&f.path).unwrap(), before);
    assert!(!f.engine.cache().is_dirty());
}

// ============================================================================
// list
// ============================================================================

#[test]
fn test_list_cached_between_mutations() {
    let f = fixture_with("1spam\n");
    admin(&f.engine, "list");
    admin(&f.engine, "LIST");
    admin(&f.engine, "list");
    assert_eq!(f.publisher.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_list_failure_retries() {
    let f = fixture_with("1spam\n");
    f.publisher.failing.store(true, Ordering::SeqCst);

    assert_eq!(admin(&f.engine, "list").as_deref(), Some("Words: "));
    assert!(f.engine.cache().is_dirty());

    f.publisher.failing.store(false, Ordering::SeqCst);
    assert_eq!(admin(&f.engine, "list").as_deref(), Some("Words: https://paste.example/1"));
    assert!(!f.engine.cache().is_dirty());
}

#[test]
fn test_list_failure_keeps_previous_reference() {
    let f = fixture_with("1spam\n");
    admin(&f.engine, "list");
    admin(&f.engine, "add 2 darn");

    f.publisher.failing.store(true, Ordering::SeqCst);
    assert_eq!(admin(&f.engine, "list").as_deref(), Some("Words: https://paste.example/1"));
}

#[test]
fn test_list_renders_loaded_rules() {
    let f = fixture_with("1spam\n3badword\n");
    admin(&f.engine, "list");
    let texts = f.publisher.texts.lock().unwrap();
    assert_eq!(texts[0], "Words:\n3 badword\n1 spam\n");
}

// ============================================================================
// persistence
// ============================================================================

#[test]
fn test_round_trip_through_file() {
    let f = fixture();
    admin(&f.engine, "add 2 foo");
    admin(&f.engine, "add 1 spam");
    admin(&f.engine, "rem spam");

    let reloaded = PatternStore::open(&f.path);
    assert_eq!(reloaded.len(), 1);
    let found = reloaded.select("FOO").unwrap();
    assert_eq!(found.severity, Severity::Medium);
}

#[test]
fn test_bad_lines_dropped_on_load() {
    let f = fixture_with("1spam\n3(broken\n\n2ok\n");
    assert_eq!(f.engine.store().len(), 2);

    // The next write drops the broken line from the file
    admin(&f.engine, "add 1 new");
    assert_eq!(file_lines(&f.path), ["1new", "1spam", "2ok"]);
}

#[test]
fn test_missing_file_created() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/badwords.txt");
    let store = PatternStore::open(&path);
    assert!(store.is_empty());
    assert!(path.exists());
}

#[test]
fn test_concurrent_edits_leave_file_matching_store() {
    let f = fixture_with("1keep\n");
    let engine = Arc::new(f.engine);

    let handles: Vec<_> = (0..6)
        .map(|t| {
            let engine = engine.clone();
            thread::spawn(move || {
                for round in 0..40 {
                    // Threads share the word pool so adds and removes collide
                    let word = format!("w{}", (t + round) % 10);
                    if (t + round) % 3 == 0 {
                        admin(&engine, &format!("rem {}", word));
                    } else {
                        admin(&engine, &format!("add {} {}", t % 3 + 1, word));
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let expected = engine.store().list();
    assert!(expected.contains_key("keep"));
    assert_eq!(PatternStore::open(&f.path).list(), expected);

    let mut lines: Vec<String> = expected
        .iter()
        .map(|(source, severity)| format!("{}{}", severity, source))
        .collect();
    lines.sort();
    assert_eq!(file_lines(&f.path), lines);
}
