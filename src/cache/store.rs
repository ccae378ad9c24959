//! `TierStore` - Bounded key→entry map for exactly one tier.
//!
//! `TigerStyle`: Explicit limits, TTL expiration, eviction under pressure.
//!
//! # Design
//!
//! A tier owns its entries, enforces byte and entry budgets, and invokes its
//! eviction policy when an insert would overflow. Every removal caused by
//! eviction or sweep emits a [`RemovalEvent`] so the owning façade can decide
//! whether to demote the value into a slower tier instead of discarding it.
//!
//! One deliberate exception to the capacity bound: an entry larger than the
//! whole tier budget is still accepted once the tier has been emptied for it.
//! That is a caller configuration problem and is flagged with a warning, not
//! silently rejected.

use std::collections::HashMap;

use crate::cache::entry::{CacheEntry, EntryOrigin};
use crate::cache::eviction::{EvictionCandidate, EvictionPolicy, EvictionPolicyKind};
use crate::cache::size::SizeAccountant;
use crate::cache::stats::{TierStats, TierStatsSnapshot};
use crate::constants::CACHE_KEY_BYTES_MAX;
use crate::dst::SimClock;

// =============================================================================
// Configuration
// =============================================================================

/// Construction-time configuration for one tier.
#[derive(Debug, Clone)]
pub struct TierConfig {
    /// Maximum total bytes
    pub max_bytes: usize,
    /// Maximum number of entries
    pub max_entries: usize,
    /// Default TTL for entries inserted into this tier; `None` falls back to
    /// the cache-wide default
    pub default_ttl_ms: Option<u64>,
    /// Eviction policy selector
    pub eviction: EvictionPolicyKind,
    /// Eviction victims with `access_count` above this are demoted to the
    /// next slower tier instead of discarded
    pub demote_min_access_count: u64,
    /// Whether this tier is the preload staging target
    pub predictive: bool,
}

impl TierConfig {
    /// Create a tier configuration with the given budgets and LRU eviction.
    #[must_use]
    pub fn new(max_bytes: usize, max_entries: usize) -> Self {
        Self {
            max_bytes,
            max_entries,
            default_ttl_ms: None,
            eviction: EvictionPolicyKind::Lru,
            demote_min_access_count: 0,
            predictive: false,
        }
    }

    /// Set the default TTL for this tier.
    #[must_use]
    pub fn with_default_ttl_ms(mut self, ttl_ms: u64) -> Self {
        assert!(ttl_ms > 0, "ttl_ms must be positive");
        self.default_ttl_ms = Some(ttl_ms);
        self
    }

    /// Set the eviction policy.
    #[must_use]
    pub fn with_eviction(mut self, eviction: EvictionPolicyKind) -> Self {
        self.eviction = eviction;
        self
    }

    /// Set the demotion access-count threshold.
    #[must_use]
    pub fn with_demote_min_access_count(mut self, count: u64) -> Self {
        self.demote_min_access_count = count;
        self
    }

    /// Mark this tier as the preload staging target.
    #[must_use]
    pub fn predictive(mut self) -> Self {
        self.predictive = true;
        self
    }
}

// =============================================================================
// Removal Events
// =============================================================================

/// Why an entry left a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalCause {
    /// Removed by the eviction policy under capacity pressure.
    Evicted,
    /// Removed because its TTL passed.
    Expired,
}

/// A removal observed by the owning façade (demotion input).
#[derive(Debug, Clone)]
pub struct RemovalEvent<V> {
    /// The removed key
    pub key: String,
    /// The removed entry, with its metadata intact
    pub entry: CacheEntry<V>,
    /// Why it was removed
    pub cause: RemovalCause,
}

// =============================================================================
// Tier Store
// =============================================================================

/// Bounded key→entry map for one tier.
#[derive(Debug)]
pub struct TierStore<V> {
    config: TierConfig,
    entries: HashMap<String, CacheEntry<V>>,
    size: SizeAccountant,
    stats: TierStats,
    policy: Box<dyn EvictionPolicy>,
    clock: SimClock,
}

impl<V> TierStore<V> {
    /// Create a tier store.
    ///
    /// # Preconditions
    /// - `config.max_bytes` and `config.max_entries` must be > 0 (validated
    ///   upstream by `CacheConfig::validate`, asserted here)
    #[must_use]
    pub fn new(config: TierConfig, clock: SimClock) -> Self {
        // Preconditions
        assert!(config.max_bytes > 0, "max_bytes must be > 0");
        assert!(config.max_entries > 0, "max_entries must be > 0");

        let policy = config.eviction.build();
        let size = SizeAccountant::new(config.max_bytes);

        Self {
            config,
            entries: HashMap::new(),
            size,
            stats: TierStats::default(),
            policy,
            clock,
        }
    }

    /// Insert an entry, evicting until it fits.
    ///
    /// Overwriting an existing key replaces the entry without emitting an
    /// event. Returns the eviction victims, oldest-selected first.
    ///
    /// # Preconditions
    /// - `key` must be non-empty and at most `CACHE_KEY_BYTES_MAX` bytes
    pub fn insert(&mut self, key: &str, entry: CacheEntry<V>) -> Vec<RemovalEvent<V>> {
        // Preconditions
        assert!(!key.is_empty(), "key cannot be empty");
        assert!(
            key.len() <= CACHE_KEY_BYTES_MAX,
            "key length {} exceeds maximum {}",
            key.len(),
            CACHE_KEY_BYTES_MAX
        );

        // Overwrite: drop the old entry silently so accounting stays exact.
        if let Some(old) = self.entries.remove(key) {
            self.size.subtract(old.size_bytes);
        }

        if entry.size_bytes > self.config.max_bytes {
            tracing::warn!(
                key,
                size_bytes = entry.size_bytes,
                max_bytes = self.config.max_bytes,
                policy = self.policy.name(),
                "entry exceeds entire tier budget; accepting after emptying tier"
            );
        }

        let now_ms = self.clock.now_ms();
        let mut removed = Vec::new();

        while (self.size.would_overflow(entry.size_bytes)
            || self.entries.len() >= self.config.max_entries)
            && !self.entries.is_empty()
        {
            let Some(victim_key) = self.select_victim(now_ms) else {
                break;
            };
            let victim = self
                .entries
                .remove(&victim_key)
                .expect("policy selected a key not in the tier");
            self.size.subtract(victim.size_bytes);
            self.stats.evictions += 1;
            tracing::debug!(key = %victim_key, policy = self.policy.name(), "evicted");
            removed.push(RemovalEvent {
                key: victim_key,
                entry: victim,
                cause: RemovalCause::Evicted,
            });
        }

        self.size.add(entry.size_bytes);
        self.entries.insert(key.to_string(), entry);

        // Postconditions: capacity bound holds, except for the documented
        // oversized-single-entry case.
        assert!(
            !self.size.is_over_budget() || self.entries.len() == 1,
            "capacity bound violated with {} entries",
            self.entries.len()
        );
        assert!(
            self.entries.len() <= self.config.max_entries,
            "entry count bound violated"
        );

        removed
    }

    /// Look up an entry.
    ///
    /// Returns `None` without mutating metadata if the key is missing or
    /// expired. An expired entry is removed as a side effect of being
    /// observed; that counts as an expiration, never a hit.
    pub fn lookup(&mut self, key: &str) -> Option<&CacheEntry<V>> {
        let now_ms = self.clock.now_ms();
        let expired = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_expired(now_ms));

        if expired {
            let entry = self.entries.remove(key).expect("checked above");
            self.size.subtract(entry.size_bytes);
            self.stats.expirations += 1;
            return None;
        }

        self.entries.get(key)
    }

    /// Record a hit on a resident entry, updating its metadata in place.
    ///
    /// # Preconditions
    /// - `key` must be resident and unexpired (call after a successful
    ///   `lookup`)
    pub fn touch(&mut self, key: &str) {
        let now_ms = self.clock.now_ms();
        let entry = self
            .entries
            .get_mut(key)
            .expect("touch on a key that is not resident");
        entry.touch(now_ms);
        self.stats.hits += 1;
    }

    /// Remove an entry for promotion, counting the hit against this tier.
    ///
    /// The caller becomes the owner; no removal event is emitted because the
    /// entry is being moved, not discarded.
    pub fn take_hit(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.size.subtract(entry.size_bytes);
        self.stats.hits += 1;
        Some(entry)
    }

    /// If the entry was staged by preload and has not been hit yet, mark it
    /// converted and return `true`.
    ///
    /// A preload entry counts toward preload accuracy exactly once, on its
    /// first hit; after that it behaves like a directly stored entry.
    pub fn convert_preload_origin(&mut self, key: &str) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) if entry.origin == EntryOrigin::Preload => {
                entry.origin = EntryOrigin::Direct;
                true
            }
            _ => false,
        }
    }

    /// Remove an entry unconditionally; returns whether something was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.size.subtract(entry.size_bytes);
                true
            }
            None => false,
        }
    }

    /// Remove every expired entry.
    pub fn sweep_expired(&mut self) -> Vec<RemovalEvent<V>> {
        let now_ms = self.clock.now_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now_ms))
            .map(|(key, _)| key.clone())
            .collect();

        let mut removed = Vec::with_capacity(expired_keys.len());
        for key in expired_keys {
            let entry = self.entries.remove(&key).expect("collected above");
            self.size.subtract(entry.size_bytes);
            self.stats.expirations += 1;
            removed.push(RemovalEvent {
                key,
                entry,
                cause: RemovalCause::Expired,
            });
        }
        removed
    }

    /// Whether the key is resident and unexpired.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(self.clock.now_ms()))
    }

    /// Whether the key is resident, expired or not.
    #[must_use]
    pub fn contains_any(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Current number of entries (including not-yet-observed expired ones).
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Current occupancy in bytes.
    #[must_use]
    pub fn current_bytes(&self) -> usize {
        self.size.current_bytes()
    }

    /// Whether the tier is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tier configuration.
    #[must_use]
    pub fn config(&self) -> &TierConfig {
        &self.config
    }

    /// Empty the tier and reset counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.size.reset();
        self.stats = TierStats::default();
    }

    /// Snapshot counters and occupancy for statistics reporting.
    #[must_use]
    pub fn snapshot(&self, tier: usize) -> TierStatsSnapshot {
        TierStatsSnapshot {
            tier,
            hits: self.stats.hits,
            evictions: self.stats.evictions,
            expirations: self.stats.expirations,
            current_bytes: self.size.current_bytes(),
            entry_count: self.entries.len(),
        }
    }

    fn select_victim(&self, now_ms: u64) -> Option<String> {
        let candidates: Vec<EvictionCandidate<'_>> = self
            .entries
            .iter()
            .map(|(key, entry)| EvictionCandidate {
                key,
                created_at_ms: entry.created_at_ms,
                last_accessed_ms: entry.last_accessed_ms,
                access_count: entry.access_count,
                size_bytes: entry.size_bytes,
            })
            .collect();
        self.policy.select_victim(&candidates, now_ms)
    }
}

// =============================================================================
// Tests
// =============================================================================
