//! Cache statistics.
//!
//! Counters accumulate monotonically until an explicit `clear()`. The public
//! surface only ever hands out owned snapshots, so external code cannot
//! mutate internal counters.

use serde::Serialize;

/// Live per-tier counters, owned by a `TierStore`.
#[derive(Debug, Clone, Default)]
pub struct TierStats {
    /// Successful lookups served by this tier
    pub hits: u64,
    /// Entries removed by capacity eviction
    pub evictions: u64,
    /// Entries removed because their TTL passed
    pub expirations: u64,
}

/// Snapshot of one tier's state and counters.
#[derive(Debug, Clone, Serialize)]
pub struct TierStatsSnapshot {
    /// Tier index (0 = fastest)
    pub tier: usize,
    /// Successful lookups served by this tier
    pub hits: u64,
    /// Entries removed by capacity eviction
    pub evictions: u64,
    /// Entries removed because their TTL passed
    pub expirations: u64,
    /// Current occupancy in bytes
    pub current_bytes: usize,
    /// Current number of entries
    pub entry_count: usize,
}

/// Immutable snapshot of the whole cache's statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Per-tier counters, fastest first
    pub tiers: Vec<TierStatsSnapshot>,
    /// Total `get` calls
    pub get_calls: u64,
    /// Hits across all tiers
    pub hits_total: u64,
    /// `get` calls that missed every tier
    pub misses: u64,
    /// Hit ratio: `hits_total / (hits_total + misses)`, 0 when no lookups
    pub hit_ratio: f64,
    /// Mean `get` latency in microseconds (0 when no lookups)
    pub avg_access_latency_us: f64,
    /// Entries staged via preload fulfillment
    pub preload_inserts: u64,
    /// Hits against preload-originated entries
    pub preload_hits: u64,
    /// Preload accuracy: `preload_hits / preload_inserts`, 0 when none staged
    pub preload_hit_ratio: f64,
}

/// Live global counters, owned by the façade.
#[derive(Debug, Clone, Default)]
pub struct GlobalStats {
    /// Total `get` calls
    pub get_calls: u64,
    /// `get` calls that missed every tier
    pub misses: u64,
    /// Entries staged via preload fulfillment
    pub preload_inserts: u64,
    /// Hits against preload-originated entries
    pub preload_hits: u64,
    /// Accumulated `get` latency in microseconds
    pub access_latency_us_total: u64,
}

impl GlobalStats {
    /// Reset all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl CacheStats {
    /// Assemble a snapshot from live counters.
    #[must_use]
    pub fn assemble(tiers: Vec<TierStatsSnapshot>, global: &GlobalStats) -> Self {
        let hits_total: u64 = tiers.iter().map(|t| t.hits).sum();
        let lookups = hits_total + global.misses;

        #[allow(clippy::cast_precision_loss)]
        let hit_ratio = if lookups > 0 {
            hits_total as f64 / lookups as f64
        } else {
            0.0
        };

        #[allow(clippy::cast_precision_loss)]
        let avg_access_latency_us = if global.get_calls > 0 {
            global.access_latency_us_total as f64 / global.get_calls as f64
        } else {
            0.0
        };

        #[allow(clippy::cast_precision_loss)]
        let preload_hit_ratio = if global.preload_inserts > 0 {
            global.preload_hits as f64 / global.preload_inserts as f64
        } else {
            0.0
        };

        Self {
            tiers,
            get_calls: global.get_calls,
            hits_total,
            misses: global.misses,
            hit_ratio,
            avg_access_latency_us,
            preload_inserts: global.preload_inserts,
            preload_hits: global.preload_hits,
            preload_hit_ratio,
        }
    }
}
