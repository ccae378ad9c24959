//! `AccessRecorder` - Per-key access history and the recent-access window.
//!
//! `TigerStyle`: Bounded memory, explicit pruning, deterministic via `SimClock`.
//!
//! Two views of the same stream of accesses:
//! - a per-key map of last-access time and cumulative count, surviving
//!   eviction and expiry so hot keys keep their history across tier moves
//! - a short sliding window of the most recent accesses in order, which the
//!   preloader reads to learn key→key co-access transitions

use std::collections::{HashMap, VecDeque};

use crate::constants::{ACCESS_RECORDER_PRUNE_THRESHOLD_MS, ACCESS_RECORDER_WINDOW_COUNT_MAX};
use crate::dst::SimClock;

/// Cumulative access history for one key.
#[derive(Debug, Clone, Copy)]
pub struct AccessPattern {
    /// Timestamp of the most recent access (ms)
    pub last_access_ms: u64,
    /// Total accesses recorded for the key
    pub access_count: u64,
}

/// Records key accesses independently of entry residency.
#[derive(Debug)]
pub struct AccessRecorder {
    records: HashMap<String, AccessPattern>,
    recent: VecDeque<(String, u64)>,
    clock: SimClock,
}

impl AccessRecorder {
    /// Create an empty recorder.
    #[must_use]
    pub fn new(clock: SimClock) -> Self {
        Self {
            records: HashMap::new(),
            recent: VecDeque::with_capacity(ACCESS_RECORDER_WINDOW_COUNT_MAX),
            clock,
        }
    }

    /// Record one access to `key` at the current time.
    pub fn record_access(&mut self, key: &str) {
        let now_ms = self.clock.now_ms();

        let pattern = self.records.entry(key.to_string()).or_insert(AccessPattern {
            last_access_ms: now_ms,
            access_count: 0,
        });
        pattern.last_access_ms = now_ms;
        pattern.access_count += 1;

        self.recent.push_back((key.to_string(), now_ms));
        while self.recent.len() > ACCESS_RECORDER_WINDOW_COUNT_MAX {
            self.recent.pop_front();
        }

        // Postconditions
        assert!(
            self.recent.len() <= ACCESS_RECORDER_WINDOW_COUNT_MAX,
            "recent-access window exceeded its bound"
        );
    }

    /// The most recent access to a key other than `key`, if it happened
    /// within `window_ms` of now.
    ///
    /// Queried before recording the current access, this is the predecessor
    /// in a co-access pair.
    #[must_use]
    pub fn last_distinct_access_within(&self, key: &str, window_ms: u64) -> Option<String> {
        let now_ms = self.clock.now_ms();
        self.recent
            .iter()
            .rev()
            .find(|(recent_key, at_ms)| {
                recent_key != key && now_ms.saturating_sub(*at_ms) <= window_ms
            })
            .map(|(recent_key, _)| recent_key.clone())
    }

    /// Access history for `key`, if any has been recorded.
    #[must_use]
    pub fn pattern(&self, key: &str) -> Option<&AccessPattern> {
        self.records.get(key)
    }

    /// Drop records idle longer than `ACCESS_RECORDER_PRUNE_THRESHOLD_MS`.
    ///
    /// Returns the number of records removed.
    pub fn prune_old_records(&mut self) -> usize {
        let now_ms = self.clock.now_ms();
        let before = self.records.len();
        self.records.retain(|_, pattern| {
            now_ms.saturating_sub(pattern.last_access_ms) <= ACCESS_RECORDER_PRUNE_THRESHOLD_MS
        });
        self.recent.retain(|(_, at_ms)| {
            now_ms.saturating_sub(*at_ms) <= ACCESS_RECORDER_PRUNE_THRESHOLD_MS
        });
        before - self.records.len()
    }

    /// Number of keys with recorded history.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Forget all history.
    pub fn clear(&mut self) {
        self.records.clear();
        self.recent.clear();
    }
}
