//! Publication of the rule list
//!
//! The rule list is too long for a chat reply, so `list` answers with a link
//! to an export on a paste service. [`PublicationCache`] keeps the last link
//! and only regenerates it after the rules change.

pub mod pastebin;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::Result;
use crate::rules::Severity;

pub use pastebin::PastebinPublisher;

/// Something that can publish a text export and hand back a reference
pub trait Publisher: Send + Sync {
    fn publish(&self, title: &str, text: &str) -> Result<String>;
}

/// Render the rule list for export, one `<severity> <source>` per line
pub fn render_rules(rules: &BTreeMap<String, Severity>) -> String {
    let mut text = String::from("Words:\n");
    for (source, severity) in rules {
        text.push_str(&format!("{} {}\n", severity, source));
    }
    text
}

/// Lazily regenerated snapshot with a dirty flag
///
/// The lock is owned by the cache and wraps the snapshot value, so
/// concurrent readers queue behind one regeneration instead of each
/// starting their own.
pub struct PublicationCache {
    dirty: AtomicBool,
    snapshot: Mutex<String>,
}

impl PublicationCache {
    /// New cache; starts dirty so the first read publishes
    pub fn new() -> Self {
        Self {
            dirty: AtomicBool::new(true),
            snapshot: Mutex::new(String::new()),
        }
    }

    /// Mark the snapshot stale
    pub fn invalidate(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Check if the next read will regenerate
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Return the snapshot, regenerating it first if stale.
    ///
    /// On failure the flag is set again for a retry on the next call and the
    /// previous snapshot is returned.
    pub fn get_snapshot<F>(&self, regenerate: F) -> String
    where
        F: FnOnce() -> Result<String>,
    {
        let mut snapshot = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);

        if self.dirty.swap(false, Ordering::SeqCst) {
            match regenerate() {
                Ok(fresh) => *snapshot = fresh,
                Err(e) => {
                    tracing::warn!(error = %e, "keeping previous rule list snapshot");
                    self.dirty.store(true, Ordering::SeqCst);
                }
            }
        }

        snapshot.clone()
    }
}

impl Default for PublicationCache {
    fn default() -> Self {
        Self::new()
    }
}
