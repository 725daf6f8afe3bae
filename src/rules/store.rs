//! Pattern store: the live rule set and its flat-file persistence
//!
//! File format is one rule per line: a severity digit followed directly by
//! the pattern source, e.g. `2darn`.

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{ModerationError, Result};
use crate::publish::PublicationCache;
use crate::rules::selector::{self, MatchResult};
use crate::rules::{Rule, Severity};

/// Concurrent rule map keyed by pattern source
pub struct PatternStore {
    rules: DashMap<String, Rule>,
    path: Option<PathBuf>,
    /// Serializes add/remove with the file write that follows them
    write_lock: Mutex<()>,
    cache: Option<Arc<PublicationCache>>,
}

impl PatternStore {
    /// Store with no backing file
    pub fn in_memory() -> Self {
        Self {
            rules: DashMap::new(),
            path: None,
            write_lock: Mutex::new(()),
            cache: None,
        }
    }

    /// Open the pattern file, creating it empty if absent
    ///
    /// Read failures and bad lines are logged; the store starts with
    /// whatever could be loaded.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut store = Self::in_memory();

        match read_or_create(&path) {
            Ok(content) => {
                let loaded = store.load_lines(&content);
                tracing::info!(path = %path.display(), rules = loaded, "loaded patterns");
            }
            Err(e) => tracing::error!(error = %e, "failed to read patterns"),
        }

        store.path = Some(path);
        store
    }

    /// Invalidate `cache` whenever the rule set changes
    pub fn with_cache(mut self, cache: Arc<PublicationCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Parse pattern-file content into the store, returning the number of
    /// rules loaded
    pub fn load_lines(&self, content: &str) -> usize {
        let mut loaded = 0;
        for line in content.lines() {
            if let Some(rule) = parse_line(line) {
                self.rules.insert(rule.source.clone(), rule);
                loaded += 1;
            }
        }
        loaded
    }

    /// Add or overwrite a rule, then persist
    pub fn add(&self, severity: Severity, source: &str) -> Result<()> {
        let rule = Rule::new(severity, source)?;

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.rules.insert(rule.source.clone(), rule);
        // Mark dirty only after the insert is visible, otherwise a concurrent
        // regeneration could clear the flag and publish the old set.
        self.invalidate();
        self.persist_logged();
        Ok(())
    }

    /// Remove every rule whose source equals `source`
    ///
    /// Returns false, without touching the file, when nothing matched.
    pub fn remove(&self, source: &str) -> bool {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.rules.remove(source).is_none() {
            return false;
        }
        self.invalidate();
        self.persist_logged();
        true
    }

    /// Read-only snapshot of source -> severity
    pub fn list(&self) -> BTreeMap<String, Severity> {
        self.rules
            .iter()
            .map(|entry| (entry.key().clone(), entry.severity))
            .collect()
    }

    /// Pick the highest-severity rule matching `message`
    pub fn select(&self, message: &str) -> Option<MatchResult> {
        selector::select(message, self.rules.iter())
    }

    /// Severity of the rule with this exact source, if any
    pub fn get(&self, source: &str) -> Option<Severity> {
        self.rules.get(source).map(|rule| rule.severity)
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the store has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Write the full rule set to the backing file
    pub fn persist(&self) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };

        let mut lines: Vec<String> = self.rules.iter().map(|entry| entry.to_line()).collect();
        lines.sort();

        write_atomically(path, &lines).map_err(|source| ModerationError::PersistenceFailure {
            path: path.to_path_buf(),
            source,
        })
    }

    fn persist_logged(&self) {
        if let Err(e) = self.persist() {
            tracing::error!(error = %e, "failed to write patterns");
        }
    }

    fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate();
        }
    }
}

/// Parse one line of the pattern file
///
/// Empty lines are skipped silently; bad severities and bad patterns are
/// logged and dropped.
fn parse_line(line: &str) -> Option<Rule> {
    let mut chars = line.chars();
    let first = chars.next()?;
    let source = chars.as_str();

    let Some(severity) = Severity::from_digit(first) else {
        tracing::warn!(line, "dropping pattern line with invalid severity");
        return None;
    };

    match Rule::new(severity, source) {
        Ok(rule) => Some(rule),
        Err(e) => {
            tracing::error!(error = %e, "dropping pattern line");
            None
        }
    }
}

fn read_or_create(path: &Path) -> Result<String> {
    let io_err = |source| ModerationError::PersistenceFailure {
        path: path.to_path_buf(),
        source,
    };

    if !path.exists() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::File::create(path).map_err(io_err)?;
        return Ok(String::new());
    }

    fs::read_to_string(path).map_err(io_err)
}

/// Write to a sibling temp file, then rename over the target
fn write_atomically(path: &Path, lines: &[String]) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "patterns".to_string());
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    {
        let mut file = fs::File::create(&tmp)?;
        for line in lines {
            writeln!(file, "{}", line)?;
        }
        file.sync_all()?;
    }

    fs::rename(&tmp, path)
}
