//! Per-identity strike tracking with a fixed decay window
//!
//! Each identity carries a score in `0..=3`. Every update restarts the
//! identity's window; once a window passes with no update the record expires
//! and the identity is back to zero.

use moka::sync::Cache;
use std::time::Duration;

/// Highest strike value; further violations clamp here
pub const MAX_STRIKES: u8 = 3;

/// Strike tracker backed by an expire-after-write cache
pub struct StrikeTracker {
    strikes: Cache<String, u8>,
}

impl StrikeTracker {
    /// Create a tracker whose records expire `window` after their last update.
    ///
    /// There is no size bound: a record leaves only when its window passes.
    pub fn new(window: Duration) -> Self {
        let strikes = Cache::builder().time_to_live(window).build();

        Self { strikes }
    }

    /// Add `added` strikes to `identity` and return the clamped total.
    ///
    /// The read-modify-write runs as one atomic upsert on the identity's
    /// entry, so concurrent calls for the same identity never lose updates.
    pub fn record(&self, identity: &str, added: u8) -> u8 {
        self.strikes
            .entry(identity.to_string())
            .and_upsert_with(|current| {
                let previous = current.map(|entry| entry.into_value()).unwrap_or(0);
                previous.saturating_add(added).min(MAX_STRIKES)
            })
            .into_value()
    }

    /// Current strikes for `identity` without refreshing its window
    pub fn current(&self, identity: &str) -> u8 {
        self.strikes.get(identity).unwrap_or(0)
    }
}

impl Default for StrikeTracker {
    fn default() -> Self {
        Self::new(Duration::from_secs(600))
    }
}
