//! `MultiTierCache` - The unified façade over the tier chain.
//!
//! `TigerStyle`: Single owner of cross-tier movement, explicit config
//! validation, invariants asserted at the seams.
//!
//! # Responsibilities
//!
//! - **Lookup** walks tiers fastest-first; a hit below tier 0 promotes the
//!   entry into tier 0 with a fresh tier-0 TTL, carrying its access metadata.
//! - **Store** writes to tier 0 and removes the key from every other tier so
//!   a key is resident in at most one tier.
//! - **Demotion** turns eviction victims into inserts in the next slower
//!   tier when their access count clears the source tier's threshold;
//!   victims of the last tier are discarded.
//! - **Preloading** learns co-access transitions from the lookup stream and
//!   emits hints through an optional sink; fulfilled hints are staged in the
//!   predictive tier and tracked separately in statistics.

use std::time::Instant;

use crate::cache::{
    CacheEntry, CacheStats, EntryOrigin, EvictionPolicyKind, GlobalStats, RemovalCause,
    RemovalEvent, TierConfig, TierId, TierStore,
};
use crate::constants::{
    CACHE_TIERS_COUNT_MAX, TIER_FAST_ENTRIES_COUNT_DEFAULT, TIER_FAST_SIZE_BYTES_DEFAULT,
    TIER_FAST_TTL_MS_DEFAULT, TIER_MEDIUM_ENTRIES_COUNT_DEFAULT, TIER_MEDIUM_SIZE_BYTES_DEFAULT,
    TIER_MEDIUM_TTL_MS_DEFAULT, TIER_PREDICTIVE_ENTRIES_COUNT_DEFAULT,
    TIER_PREDICTIVE_SIZE_BYTES_DEFAULT, TIER_PREDICTIVE_TTL_MS_DEFAULT,
};
use crate::dst::SimClock;
use crate::orchestration::access_tracker::AccessRecorder;
use crate::orchestration::preload::{PredictivePreloader, PreloadConfig, PreloadSink};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration rejected at construction.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The tier list was empty.
    #[error("cache requires at least one tier")]
    NoTiers,

    /// More tiers than the supported maximum.
    #[error("{count} tiers exceeds maximum {max}", max = CACHE_TIERS_COUNT_MAX)]
    TooManyTiers {
        /// Configured tier count
        count: usize,
    },

    /// A tier was configured with a zero byte budget.
    #[error("tier {tier} has a zero byte budget")]
    ZeroByteBudget {
        /// Offending tier index
        tier: usize,
    },

    /// A tier was configured with a zero entry budget.
    #[error("tier {tier} has a zero entry budget")]
    ZeroEntryBudget {
        /// Offending tier index
        tier: usize,
    },

    /// More than one tier was marked as the preload staging target.
    #[error("at most one tier may be marked predictive")]
    MultiplePredictiveTiers,

    /// Adaptive eviction weights were non-finite or negative.
    #[error("tier {tier} has invalid adaptive eviction weights")]
    InvalidAdaptiveWeights {
        /// Offending tier index
        tier: usize,
    },
}

/// Whole-cache configuration, validated once at construction.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Tier configurations, fastest first
    pub tiers: Vec<TierConfig>,
    /// Fallback TTL for tiers without their own default; `None` disables TTL
    pub default_ttl_ms: Option<u64>,
    /// Preload learning and hint-emission tunables
    pub preload: PreloadConfig,
}

impl CacheConfig {
    /// The standard fast / medium / predictive preset.
    ///
    /// Fast-tier victims demote whenever they have been hit at all; medium
    /// victims demote only after more than one hit; predictive-tier victims
    /// are discarded.
    #[must_use]
    pub fn three_tier() -> Self {
        Self {
            tiers: vec![
                TierConfig::new(TIER_FAST_SIZE_BYTES_DEFAULT, TIER_FAST_ENTRIES_COUNT_DEFAULT)
                    .with_default_ttl_ms(TIER_FAST_TTL_MS_DEFAULT),
                TierConfig::new(
                    TIER_MEDIUM_SIZE_BYTES_DEFAULT,
                    TIER_MEDIUM_ENTRIES_COUNT_DEFAULT,
                )
                .with_default_ttl_ms(TIER_MEDIUM_TTL_MS_DEFAULT)
                .with_demote_min_access_count(1),
                TierConfig::new(
                    TIER_PREDICTIVE_SIZE_BYTES_DEFAULT,
                    TIER_PREDICTIVE_ENTRIES_COUNT_DEFAULT,
                )
                .with_default_ttl_ms(TIER_PREDICTIVE_TTL_MS_DEFAULT)
                .predictive(),
            ],
            default_ttl_ms: None,
            preload: PreloadConfig::default(),
        }
    }

    /// Build a configuration from explicit tiers.
    #[must_use]
    pub fn with_tiers(tiers: Vec<TierConfig>) -> Self {
        Self {
            tiers,
            default_ttl_ms: None,
            preload: PreloadConfig::default(),
        }
    }

    /// Set the cache-wide fallback TTL.
    #[must_use]
    pub fn with_default_ttl_ms(mut self, ttl_ms: u64) -> Self {
        assert!(ttl_ms > 0, "ttl_ms must be positive");
        self.default_ttl_ms = Some(ttl_ms);
        self
    }

    /// Set the preload tunables.
    #[must_use]
    pub fn with_preload(mut self, preload: PreloadConfig) -> Self {
        self.preload = preload;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tiers.is_empty() {
            return Err(ConfigError::NoTiers);
        }
        if self.tiers.len() > CACHE_TIERS_COUNT_MAX {
            return Err(ConfigError::TooManyTiers {
                count: self.tiers.len(),
            });
        }
        for (index, tier) in self.tiers.iter().enumerate() {
            if tier.max_bytes == 0 {
                return Err(ConfigError::ZeroByteBudget { tier: index });
            }
            if tier.max_entries == 0 {
                return Err(ConfigError::ZeroEntryBudget { tier: index });
            }
            if let EvictionPolicyKind::Adaptive(weights) = &tier.eviction {
                if !weights.is_valid() {
                    return Err(ConfigError::InvalidAdaptiveWeights { tier: index });
                }
            }
        }
        if self.tiers.iter().filter(|tier| tier.predictive).count() > 1 {
            return Err(ConfigError::MultiplePredictiveTiers);
        }
        Ok(())
    }

    /// Index of the preload staging tier: the tier marked predictive, or the
    /// last tier when none is marked.
    #[must_use]
    pub fn preload_tier_index(&self) -> usize {
        self.tiers
            .iter()
            .position(|tier| tier.predictive)
            .unwrap_or(self.tiers.len().saturating_sub(1))
    }
}

// =============================================================================
// Façade
// =============================================================================

/// Multi-tier cache with promotion, demotion, and predictive preloading.
pub struct MultiTierCache<V> {
    tiers: Vec<TierStore<V>>,
    recorder: AccessRecorder,
    preloader: PredictivePreloader,
    sink: Option<Box<dyn PreloadSink>>,
    global: GlobalStats,
    clock: SimClock,
    default_ttl_ms: Option<u64>,
    preload_tier: usize,
}

impl<V> std::fmt::Debug for MultiTierCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiTierCache")
            .field("tiers", &self.tiers.len())
            .field("preload_tier", &self.preload_tier)
            .finish_non_exhaustive()
    }
}

impl<V: Clone> MultiTierCache<V> {
    /// Create a cache from a validated configuration.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] when the configuration is invalid. This is
    /// the only point where configuration problems surface; every later
    /// operation may assume a valid tier chain.
    pub fn new(config: CacheConfig, clock: SimClock) -> Result<Self, ConfigError> {
        config.validate()?;

        let preload_tier = config.preload_tier_index();
        let tiers: Vec<TierStore<V>> = config
            .tiers
            .into_iter()
            .map(|tier_config| TierStore::new(tier_config, clock.clone()))
            .collect();

        Ok(Self {
            tiers,
            recorder: AccessRecorder::new(clock.clone()),
            preloader: PredictivePreloader::new(config.preload),
            sink: None,
            global: GlobalStats::default(),
            clock,
            default_ttl_ms: config.default_ttl_ms,
            preload_tier,
        })
    }

    /// Attach a sink that receives preload hints.
    #[must_use]
    pub fn with_preload_sink(mut self, sink: Box<dyn PreloadSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Look up a value, promoting hits below tier 0.
    ///
    /// A miss mutates no entry metadata. Access history is recorded either
    /// way so the preloader can learn from misses too.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn get(&mut self, key: &str) -> Option<V> {
        let started = Instant::now();
        self.global.get_calls += 1;

        let predecessor = self
            .recorder
            .last_distinct_access_within(key, self.preloader.config().recency_window_ms);
        self.recorder.record_access(key);
        if let Some(previous) = predecessor {
            self.preloader.record_transition(&previous, key);
        }

        let result = self.lookup_and_promote(key);
        if result.is_none() {
            self.global.misses += 1;
        } else {
            self.emit_hints(key);
        }

        self.record_latency(started);
        result
    }

    /// Store a value in tier 0 with the default TTL.
    pub fn set(&mut self, key: &str, value: V, size_bytes: usize) {
        self.set_with_ttl(key, value, size_bytes, self.tier_ttl_ms(0));
    }

    /// Store a value in tier 0 with an explicit TTL (`None` = no expiry).
    #[tracing::instrument(level = "debug", skip(self, value))]
    pub fn set_with_ttl(&mut self, key: &str, value: V, size_bytes: usize, ttl_ms: Option<u64>) {
        self.store_in_tier(key, value, size_bytes, 0, ttl_ms);
    }

    /// Store a value directly in the given tier with that tier's TTL.
    ///
    /// # Preconditions
    /// - `tier` must name a configured tier
    pub fn set_in_tier(&mut self, key: &str, value: V, size_bytes: usize, tier: TierId) {
        // Preconditions
        assert!(
            tier.0 < self.tiers.len(),
            "{tier} out of range ({} tiers)",
            self.tiers.len()
        );

        let ttl_ms = self.tier_ttl_ms(tier.0);
        self.store_in_tier(key, value, size_bytes, tier.0, ttl_ms);
    }

    /// Store a value directly in the given tier with an explicit TTL
    /// (`None` = no expiry).
    ///
    /// # Preconditions
    /// - `tier` must name a configured tier
    pub fn set_in_tier_with_ttl(
        &mut self,
        key: &str,
        value: V,
        size_bytes: usize,
        tier: TierId,
        ttl_ms: Option<u64>,
    ) {
        // Preconditions
        assert!(
            tier.0 < self.tiers.len(),
            "{tier} out of range ({} tiers)",
            self.tiers.len()
        );

        self.store_in_tier(key, value, size_bytes, tier.0, ttl_ms);
    }

    fn store_in_tier(
        &mut self,
        key: &str,
        value: V,
        size_bytes: usize,
        tier: usize,
        ttl_ms: Option<u64>,
    ) {
        // A key lives in exactly one tier; purge residual copies first.
        for (index, other) in self.tiers.iter_mut().enumerate() {
            if index != tier {
                other.remove(key);
            }
        }

        let entry = CacheEntry::new(value, size_bytes, ttl_ms, &self.clock);
        let removals = self.tiers[tier].insert(key, entry);
        self.handle_removals(tier, removals);
        // Hints accompany fastest-tier activity only; writes to slower tiers
        // are staging, not demand.
        if tier == 0 {
            self.emit_hints(key);
        }

        debug_assert!(self.resident_tier_count(key) == 1, "tier exclusivity violated by set");
    }

    /// Stage a preload-fulfilled value in the predictive tier.
    ///
    /// Skipped (returning `false`) when the key is already resident and
    /// unexpired anywhere; a fulfilled hint must never clobber live data.
    pub fn preload_insert(&mut self, key: &str, value: V, size_bytes: usize) -> bool {
        if self.tiers.iter().any(|tier| tier.contains(key)) {
            return false;
        }
        // Expired leftovers would break exclusivity once the new copy lands.
        for tier in &mut self.tiers {
            tier.remove(key);
        }

        let target = self.preload_tier;
        let mut entry = CacheEntry::new(value, size_bytes, self.tier_ttl_ms(target), &self.clock);
        entry.origin = EntryOrigin::Preload;

        let removals = self.tiers[target].insert(key, entry);
        self.handle_removals(target, removals);
        self.global.preload_inserts += 1;
        tracing::debug!(key, tier = target, "staged preload entry");
        true
    }

    /// Remove a key from every tier; returns whether anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let mut removed = false;
        for tier in &mut self.tiers {
            removed |= tier.remove(key);
        }
        removed
    }

    /// Drop every entry and reset statistics.
    ///
    /// Learned access patterns survive so a repopulated cache predicts well
    /// immediately; call [`Self::reset_access_patterns`] to forget those too.
    pub fn clear(&mut self) {
        for tier in &mut self.tiers {
            tier.clear();
        }
        self.global.reset();
    }

    /// Forget all access history and learned co-access transitions.
    pub fn reset_access_patterns(&mut self) {
        self.recorder.clear();
        self.preloader.clear();
    }

    /// Whether the key is resident and unexpired in any tier.
    #[must_use]
    pub fn exists(&self, key: &str) -> bool {
        self.tiers.iter().any(|tier| tier.contains(key))
    }

    /// Whether the key is resident in any tier, expired or not.
    ///
    /// Lazy expiry means an expired entry can linger until observed; this
    /// reports physical residency where [`Self::exists`] reports liveness.
    #[must_use]
    pub fn exists_any(&self, key: &str) -> bool {
        self.tiers.iter().any(|tier| tier.contains_any(key))
    }

    /// The tier currently holding the key (expired or not), if any.
    #[must_use]
    pub fn locate(&self, key: &str) -> Option<TierId> {
        self.tiers
            .iter()
            .position(|tier| tier.contains_any(key))
            .map(TierId)
    }

    /// Remove every expired entry across all tiers.
    ///
    /// Expired entries are discarded, never demoted. Returns the number of
    /// entries removed.
    pub fn sweep_expired(&mut self) -> usize {
        let mut swept = 0;
        for tier in &mut self.tiers {
            swept += tier.sweep_expired().len();
        }
        if swept > 0 {
            tracing::debug!(swept, "expiry sweep removed entries");
        }
        swept
    }

    /// Drop stale access-history records; returns how many were pruned.
    pub fn prune_access_records(&mut self) -> usize {
        self.recorder.prune_old_records()
    }

    /// Immutable statistics snapshot.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let tiers = self
            .tiers
            .iter()
            .enumerate()
            .map(|(index, tier)| tier.snapshot(index))
            .collect();
        CacheStats::assemble(tiers, &self.global)
    }

    /// Number of tiers in the chain.
    #[must_use]
    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn lookup_and_promote(&mut self, key: &str) -> Option<V> {
        // Tier 0: hit in place.
        if self.tiers[0].lookup(key).is_some() {
            if self.tiers[0].convert_preload_origin(key) {
                self.global.preload_hits += 1;
            }
            self.tiers[0].touch(key);
            let value = self.tiers[0]
                .lookup(key)
                .map(|entry| entry.value.clone())
                .expect("entry resident after touch");
            return Some(value);
        }

        // Deeper tiers: hit promotes into tier 0.
        for index in 1..self.tiers.len() {
            if self.tiers[index].lookup(key).is_none() {
                continue;
            }
            let mut entry = self.tiers[index]
                .take_hit(key)
                .expect("entry resident after lookup");

            let now_ms = self.clock.now_ms();
            entry.touch(now_ms);
            if entry.origin == EntryOrigin::Preload {
                self.global.preload_hits += 1;
                entry.origin = EntryOrigin::Direct;
            }
            let value = entry.value.clone();

            entry.reset_ttl(self.tier_ttl_ms(0), now_ms);
            let removals = self.tiers[0].insert(key, entry);
            self.handle_removals(0, removals);
            tracing::debug!(key, from_tier = index, "promoted on hit");

            return Some(value);
        }

        None
    }

    /// Demote or discard eviction victims, cascading down the chain.
    fn handle_removals(&mut self, source_tier: usize, removals: Vec<RemovalEvent<V>>) {
        let target = source_tier + 1;
        for event in removals {
            // An expired victim is dead data; demoting it would hand it a
            // fresh TTL and resurrect it.
            let demote = event.cause == RemovalCause::Evicted
                && target < self.tiers.len()
                && !event.entry.is_expired(self.clock.now_ms())
                && event.entry.access_count
                    > self.tiers[source_tier].config().demote_min_access_count;

            if demote {
                let mut entry = event.entry;
                entry.reset_ttl(self.tier_ttl_ms(target), self.clock.now_ms());
                let next = self.tiers[target].insert(&event.key, entry);
                tracing::debug!(key = %event.key, from_tier = source_tier, to_tier = target, "demoted victim");
                self.handle_removals(target, next);
            } else {
                tracing::trace!(key = %event.key, tier = source_tier, cause = ?event.cause, "discarded");
            }
        }
    }

    fn emit_hints(&self, key: &str) {
        let Some(sink) = &self.sink else {
            return;
        };
        for hint in self.preloader.candidates(key) {
            if !self.exists(&hint.key) {
                sink.send_hint(hint);
            }
        }
    }

    fn tier_ttl_ms(&self, tier: usize) -> Option<u64> {
        self.tiers[tier].config().default_ttl_ms.or(self.default_ttl_ms)
    }

    fn record_latency(&mut self, started: Instant) {
        let elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.global.access_latency_us_total =
            self.global.access_latency_us_total.saturating_add(elapsed_us);
    }

    fn resident_tier_count(&self, key: &str) -> usize {
        self.tiers.iter().filter(|tier| tier.contains_any(key)).count()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> CacheConfig {
        CacheConfig::with_tiers(vec![
            TierConfig::new(100, 4),
            TierConfig::new(200, 8).with_demote_min_access_count(1),
            TierConfig::new(200, 8).predictive(),
        ])
    }

    fn cache(clock: &SimClock) -> MultiTierCache<String> {
        MultiTierCache::new(small_config(), clock.clone()).unwrap()
    }

    #[test]
    fn test_set_get_roundtrip() {
        let clock = SimClock::new();
        let mut cache = cache(&clock);

        cache.set("a", "va".to_string(), 10);
        assert_eq!(cache.get("a"), Some("va".to_string()));
        assert_eq!(cache.get("missing"), None);

        let stats = cache.stats();
        assert_eq!(stats.get_calls, 2);
        assert_eq!(stats.hits_total, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_config_rejected_at_construction() {
        let clock = SimClock::new();

        let empty = CacheConfig::with_tiers(vec![]);
        assert!(matches!(
            MultiTierCache::<String>::new(empty, clock.clone()),
            Err(ConfigError::NoTiers)
        ));

        let zero = CacheConfig::with_tiers(vec![TierConfig::new(100, 0)]);
        assert!(matches!(
            MultiTierCache::<String>::new(zero, clock.clone()),
            Err(ConfigError::ZeroEntryBudget { tier: 0 })
        ));

        let two_predictive = CacheConfig::with_tiers(vec![
            TierConfig::new(100, 4).predictive(),
            TierConfig::new(100, 4).predictive(),
        ]);
        assert!(matches!(
            MultiTierCache::<String>::new(two_predictive, clock),
            Err(ConfigError::MultiplePredictiveTiers)
        ));
    }

    #[test]
    fn test_three_tier_preset_validates() {
        assert!(CacheConfig::three_tier().validate().is_ok());
        assert_eq!(CacheConfig::three_tier().preload_tier_index(), 2);
    }

    #[test]
    fn test_eviction_demotes_accessed_victim() {
        let clock = SimClock::new();
        let mut cache = cache(&clock);

        // Fill tier 0 (100 bytes), hit "a" so it qualifies for demotion.
        cache.set("a", "va".to_string(), 60);
        assert!(cache.get("a").is_some());
        clock.advance_ms(10);

        cache.set("b", "vb".to_string(), 60);

        assert_eq!(cache.locate("a"), Some(TierId(1)), "hit victim demotes");
        assert_eq!(cache.locate("b"), Some(TierId(0)));
        assert_eq!(cache.get("a"), Some("va".to_string()), "still served after demotion");
    }

    #[test]
    fn test_eviction_discards_unaccessed_victim() {
        let clock = SimClock::new();
        let mut cache = cache(&clock);

        cache.set("a", "va".to_string(), 60);
        clock.advance_ms(10);
        cache.set("b", "vb".to_string(), 60);

        assert_eq!(cache.locate("a"), None, "never-hit victim is discarded");
    }

    #[test]
    fn test_hit_below_tier0_promotes_with_fresh_ttl() {
        let clock = SimClock::new();
        let mut cache = cache(&clock);

        cache.set("a", "va".to_string(), 60);
        assert!(cache.get("a").is_some());
        clock.advance_ms(10);
        cache.set("b", "vb".to_string(), 60); // demotes "a" to tier 1

        assert_eq!(cache.locate("a"), Some(TierId(1)));
        assert_eq!(cache.get("a"), Some("va".to_string()));
        assert_eq!(cache.locate("a"), Some(TierId(0)), "hit promotes back to tier 0");
    }

    #[test]
    fn test_promotion_carries_access_metadata() {
        let clock = SimClock::new();
        let mut cache = cache(&clock);

        cache.set("a", "va".to_string(), 60);
        assert!(cache.get("a").is_some());
        assert!(cache.get("a").is_some());
        clock.advance_ms(10);
        cache.set("b", "vb".to_string(), 60); // "a" (2 hits) demotes

        assert!(cache.get("a").is_some()); // promotes back

        // 3 hits counted in recorder history too.
        assert_eq!(cache.recorder.pattern("a").unwrap().access_count, 3);
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let clock = SimClock::new();
        let config = CacheConfig::with_tiers(vec![TierConfig::new(100, 4)])
            .with_default_ttl_ms(100);
        let mut cache: MultiTierCache<String> =
            MultiTierCache::new(config, clock.clone()).unwrap();

        cache.set("a", "va".to_string(), 10);
        clock.advance_ms(150);

        assert_eq!(cache.get("a"), None);
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.tiers[0].expirations, 1);
    }

    #[test]
    fn test_expired_eviction_victim_is_discarded() {
        let clock = SimClock::new();
        let mut cache = cache(&clock);

        // "a" is hit, so by access count alone it would qualify for demotion.
        cache.set_with_ttl("a", "va".to_string(), 60, Some(100));
        assert!(cache.get("a").is_some());
        clock.advance_ms(150);

        // Capacity pressure evicts the now-expired "a".
        cache.set("b", "vb".to_string(), 60);

        assert_eq!(cache.locate("a"), None, "expired victim must not be demoted");
        assert_eq!(cache.get("a"), None, "an expired value is never served again");
    }

    #[test]
    fn test_sweep_discards_expired_without_demotion() {
        let clock = SimClock::new();
        let config = CacheConfig::with_tiers(vec![
            TierConfig::new(100, 4).with_default_ttl_ms(100),
            TierConfig::new(100, 4),
        ]);
        let mut cache: MultiTierCache<String> =
            MultiTierCache::new(config, clock.clone()).unwrap();

        cache.set("a", "va".to_string(), 10);
        assert!(cache.get("a").is_some()); // would qualify for demotion if evicted
        clock.advance_ms(150);

        assert_eq!(cache.sweep_expired(), 1);
        assert_eq!(cache.locate("a"), None, "expired entries never demote");
    }

    #[test]
    fn test_set_enforces_tier_exclusivity() {
        let clock = SimClock::new();
        let mut cache = cache(&clock);

        cache.set("a", "v1".to_string(), 60);
        assert!(cache.get("a").is_some());
        clock.advance_ms(10);
        cache.set("b", "vb".to_string(), 60); // "a" demotes to tier 1

        cache.set("a", "v2".to_string(), 10); // overwrite must purge tier-1 copy
        assert_eq!(cache.locate("a"), Some(TierId(0)));
        assert_eq!(cache.get("a"), Some("v2".to_string()));
    }

    #[test]
    fn test_set_in_tier_targets_chosen_tier() {
        let clock = SimClock::new();
        let mut cache = cache(&clock);

        cache.set_in_tier("a", "va".to_string(), 10, TierId(1));
        assert_eq!(cache.locate("a"), Some(TierId(1)));

        // Writing elsewhere purges the old residency.
        cache.set_in_tier("a", "v2".to_string(), 10, TierId(2));
        assert_eq!(cache.locate("a"), Some(TierId(2)));
        assert_eq!(cache.get("a"), Some("v2".to_string()));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_in_tier_rejects_unknown_tier() {
        let clock = SimClock::new();
        let mut cache = cache(&clock);
        cache.set_in_tier("a", "va".to_string(), 10, TierId(9));
    }

    #[test]
    fn test_set_in_tier_with_ttl_override() {
        let clock = SimClock::new();
        let mut cache = cache(&clock);

        cache.set_in_tier_with_ttl("short", "v".to_string(), 10, TierId(1), Some(100));
        cache.set_in_tier_with_ttl("forever", "v".to_string(), 10, TierId(1), None);
        clock.advance_ms(150);

        assert_eq!(cache.get("short"), None);
        assert_eq!(cache.get("forever"), Some("v".to_string()));
    }

    #[test]
    fn test_slow_tier_insert_emits_no_hints() {
        use crate::orchestration::preload::ChannelPreloadSink;

        let clock = SimClock::new();
        let (sink, mut rx) = ChannelPreloadSink::channel();
        let mut cache = MultiTierCache::new(small_config(), clock.clone())
            .unwrap()
            .with_preload_sink(Box::new(sink));

        // Learn a→b, then drop "b" so a hint would have something to fetch.
        cache.set("a", "va".to_string(), 5);
        cache.set("b", "vb".to_string(), 5);
        assert!(cache.get("a").is_some());
        clock.advance_ms(10);
        assert!(cache.get("b").is_some());
        cache.remove("b");
        while rx.try_recv().is_ok() {}

        cache.set_in_tier("a", "va".to_string(), 5, TierId(1));
        assert!(rx.try_recv().is_err(), "staging writes are not demand");

        cache.set("a", "va".to_string(), 5);
        assert_eq!(
            rx.try_recv().expect("fastest-tier write emits").key,
            "b"
        );
    }

    #[test]
    fn test_exists_vs_exists_any() {
        let clock = SimClock::new();
        let config = CacheConfig::with_tiers(vec![TierConfig::new(100, 4)])
            .with_default_ttl_ms(100);
        let mut cache: MultiTierCache<String> =
            MultiTierCache::new(config, clock.clone()).unwrap();

        cache.set("a", "va".to_string(), 10);
        assert!(cache.exists("a"));
        assert!(cache.exists_any("a"));

        clock.advance_ms(150);
        assert!(!cache.exists("a"), "expired entry is not live");
        assert!(cache.exists_any("a"), "but still physically resident");

        cache.sweep_expired();
        assert!(!cache.exists_any("a"));
    }

    #[test]
    fn test_remove_purges_all_tiers() {
        let clock = SimClock::new();
        let mut cache = cache(&clock);

        cache.set("a", "va".to_string(), 10);
        assert!(cache.remove("a"));
        assert!(!cache.remove("a"));
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_clear_keeps_access_patterns() {
        let clock = SimClock::new();
        let mut cache = cache(&clock);

        cache.set("a", "va".to_string(), 10);
        assert!(cache.get("a").is_some());
        cache.clear();

        assert_eq!(cache.get("a"), None);
        assert!(cache.recorder.pattern("a").is_some(), "history survives clear");
        assert_eq!(cache.stats().hits_total, 0, "counters reset");

        cache.reset_access_patterns();
        assert!(cache.recorder.pattern("a").is_none());
    }

    #[test]
    fn test_preload_insert_stages_in_predictive_tier() {
        let clock = SimClock::new();
        let mut cache = cache(&clock);

        assert!(cache.preload_insert("p", "vp".to_string(), 10));
        assert_eq!(cache.locate("p"), Some(TierId(2)));
        assert_eq!(cache.stats().preload_inserts, 1);
        assert_eq!(cache.stats().preload_hits, 0);
    }

    #[test]
    fn test_preload_insert_skips_resident_key() {
        let clock = SimClock::new();
        let mut cache = cache(&clock);

        cache.set("a", "direct".to_string(), 10);
        assert!(!cache.preload_insert("a", "stale".to_string(), 10));
        assert_eq!(cache.get("a"), Some("direct".to_string()));
        assert_eq!(cache.stats().preload_inserts, 0);
    }

    #[test]
    fn test_preload_hit_counted_once_and_promotes() {
        let clock = SimClock::new();
        let mut cache = cache(&clock);

        cache.preload_insert("p", "vp".to_string(), 10);

        assert_eq!(cache.get("p"), Some("vp".to_string()));
        assert_eq!(cache.locate("p"), Some(TierId(0)), "preload hit promotes");
        assert_eq!(cache.stats().preload_hits, 1);

        assert!(cache.get("p").is_some());
        assert_eq!(cache.stats().preload_hits, 1, "counted once per staged entry");
        assert!((cache.stats().preload_hit_ratio - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hints_flow_to_sink() {
        use crate::orchestration::preload::ChannelPreloadSink;

        let clock = SimClock::new();
        let (sink, mut rx) = ChannelPreloadSink::channel();
        let mut cache = MultiTierCache::new(small_config(), clock.clone())
            .unwrap()
            .with_preload_sink(Box::new(sink));

        cache.set("a", "va".to_string(), 5);
        cache.set("b", "vb".to_string(), 5);

        // Learn a→b, then drop "b" so the hint has something to fetch.
        assert!(cache.get("a").is_some());
        clock.advance_ms(10);
        assert!(cache.get("b").is_some());
        cache.remove("b");
        while rx.try_recv().is_ok() {}

        clock.advance_ms(10);
        assert!(cache.get("a").is_some());

        let hint = rx.try_recv().expect("a→b transition should emit a hint");
        assert_eq!(hint.key, "b");
        assert_eq!(hint.predicted_from, "a");
    }

    #[test]
    fn test_hints_skip_resident_keys() {
        use crate::orchestration::preload::ChannelPreloadSink;

        let clock = SimClock::new();
        let (sink, mut rx) = ChannelPreloadSink::channel();
        let mut cache = MultiTierCache::new(small_config(), clock.clone())
            .unwrap()
            .with_preload_sink(Box::new(sink));

        cache.set("a", "va".to_string(), 5);
        cache.set("b", "vb".to_string(), 5);
        assert!(cache.get("a").is_some());
        clock.advance_ms(10);
        assert!(cache.get("b").is_some());
        while rx.try_recv().is_ok() {}

        clock.advance_ms(10);
        assert!(cache.get("a").is_some());
        assert!(
            rx.try_recv().is_err(),
            "no hint for a key that is already resident"
        );
    }

    #[test]
    fn test_stats_snapshot_is_detached() {
        let clock = SimClock::new();
        let mut cache = cache(&clock);

        cache.set("a", "va".to_string(), 10);
        let before = cache.stats();
        assert!(cache.get("a").is_some());

        assert_eq!(before.hits_total, 0, "snapshot unaffected by later activity");
        assert_eq!(cache.stats().hits_total, 1);
    }
}

#[cfg(test)]
mod dst_tests {
    use super::*;
    use crate::dst::test_seeds;

    #[test]
    fn test_deterministic_across_runs() {
        let run = |seed: u64| {
            let clock = SimClock::new();
            let config = CacheConfig::with_tiers(vec![
                TierConfig::new(50, 4),
                TierConfig::new(100, 8).with_demote_min_access_count(1),
            ])
            .with_default_ttl_ms(1_000);
            let mut cache: MultiTierCache<u64> =
                MultiTierCache::new(config, clock.clone()).unwrap();
            let mut rng = crate::dst::DeterministicRng::new(seed);

            for i in 0_u64..500 {
                let key = format!("k{}", rng.next_usize(0, 9));
                match rng.next_usize(0, 3) {
                    0 => cache.set(&key, i, rng.next_usize(1, 20)),
                    1 => {
                        let _ = cache.get(&key);
                    }
                    2 => {
                        cache.remove(&key);
                    }
                    _ => {
                        clock.advance_ms(rng.next_usize(1, 500) as u64);
                        cache.sweep_expired();
                    }
                }
            }
            let stats = cache.stats();
            (stats.get_calls, stats.hits_total, stats.misses)
        };

        for seed in test_seeds() {
            assert_eq!(run(seed), run(seed), "seed {seed} must reproduce exactly");
        }
    }

    #[test]
    fn test_ttl_expiry_under_simulated_time() {
        let clock = SimClock::new();
        let config = CacheConfig::with_tiers(vec![TierConfig::new(1_000, 16)])
            .with_default_ttl_ms(5_000);
        let mut cache: MultiTierCache<String> =
            MultiTierCache::new(config, clock.clone()).unwrap();

        cache.set("a", "va".to_string(), 10);
        clock.advance_ms(4_999);
        assert!(cache.get("a").is_some());
        clock.advance_ms(1);
        assert!(cache.get("a").is_none(), "expiry boundary is inclusive");
    }
}
