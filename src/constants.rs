//! `TigerStyle` Constants
//!
//! All limits use big-endian naming: `CATEGORY_SPECIFICS_UNIT_LIMIT`
//! Example: `TIER_FAST_SIZE_BYTES_DEFAULT` (not `DEFAULT_FAST_TIER_SIZE`)
//!
//! Every constant includes units in the name:
//! - `_BYTES_MAX/DEFAULT` for size limits
//! - `_MS` for milliseconds
//! - `_COUNT_MAX` for quantity limits

// =============================================================================
// Tier Defaults (three-tier preset: Fast / Medium / Predictive)
// =============================================================================

/// Default byte budget for the fast tier
pub const TIER_FAST_SIZE_BYTES_DEFAULT: usize = 256 * 1024; // 256KB

/// Default byte budget for the medium tier
pub const TIER_MEDIUM_SIZE_BYTES_DEFAULT: usize = 1024 * 1024; // 1MB

/// Default byte budget for the predictive tier
pub const TIER_PREDICTIVE_SIZE_BYTES_DEFAULT: usize = 512 * 1024; // 512KB

/// Default entry budget for the fast tier
pub const TIER_FAST_ENTRIES_COUNT_DEFAULT: usize = 1_000;

/// Default entry budget for the medium tier
pub const TIER_MEDIUM_ENTRIES_COUNT_DEFAULT: usize = 5_000;

/// Default entry budget for the predictive tier
pub const TIER_PREDICTIVE_ENTRIES_COUNT_DEFAULT: usize = 2_000;

/// Default TTL for the fast tier (5 minutes)
pub const TIER_FAST_TTL_MS_DEFAULT: u64 = 5 * TIME_MS_PER_MIN;

/// Default TTL for the medium tier (30 minutes)
pub const TIER_MEDIUM_TTL_MS_DEFAULT: u64 = 30 * TIME_MS_PER_MIN;

/// Default TTL for the predictive tier (10 minutes)
pub const TIER_PREDICTIVE_TTL_MS_DEFAULT: u64 = 10 * TIME_MS_PER_MIN;

/// Maximum number of tiers in a cache
pub const CACHE_TIERS_COUNT_MAX: usize = 8;

/// Maximum key length in bytes
pub const CACHE_KEY_BYTES_MAX: usize = 1024;

// =============================================================================
// Eviction Policy
// =============================================================================

/// Adaptive eviction weight for entry age (in minutes)
pub const EVICTION_ADAPTIVE_WEIGHT_AGE: f64 = 0.5;

/// Adaptive eviction weight for inverse access frequency
pub const EVICTION_ADAPTIVE_WEIGHT_FREQUENCY: f64 = 0.3;

/// Adaptive eviction weight for entry size (in bytes)
pub const EVICTION_ADAPTIVE_WEIGHT_SIZE: f64 = 0.2;

// =============================================================================
// Access Tracking
// =============================================================================

/// Length of the recent-access window used for co-access learning
pub const ACCESS_RECORDER_WINDOW_COUNT_MAX: usize = 32;

/// Threshold for pruning old access records (1 hour without access)
pub const ACCESS_RECORDER_PRUNE_THRESHOLD_MS: u64 = TIME_MS_PER_HOUR;

// =============================================================================
// Predictive Preloading
// =============================================================================

/// Two accesses closer together than this count as a co-access observation
pub const PRELOAD_RECENCY_WINDOW_MS_DEFAULT: u64 = 30 * TIME_MS_PER_SEC;

/// Maximum successors tracked per key in the co-access graph
pub const PRELOAD_SUCCESSORS_COUNT_MAX: usize = 8;

/// Maximum keys tracked in the co-access graph
pub const PRELOAD_TRACKED_KEYS_COUNT_MAX: usize = 1_024;

/// Maximum preload hints emitted per fast-tier insert
pub const PRELOAD_HINTS_PER_INSERT_COUNT_MAX: usize = 4;

// =============================================================================
// Sweep Scheduling
// =============================================================================

/// Default interval between expiry sweeps (60 seconds)
pub const SWEEP_INTERVAL_MS_DEFAULT: u64 = 60 * TIME_MS_PER_SEC;

/// Minimum allowed sweep interval
pub const SWEEP_INTERVAL_MS_MIN: u64 = 10;

// =============================================================================
// DST (Deterministic Simulation Testing) Limits
// =============================================================================

/// Maximum time advance per step in milliseconds
pub const DST_TIME_ADVANCE_MS_MAX: u64 = 86_400_000; // 24 hours

/// Maximum number of operations in a property test run
pub const DST_PROPERTY_OPERATIONS_COUNT_MAX: usize = 1_000_000;

// =============================================================================
// Time Constants
// =============================================================================

/// Milliseconds per second
pub const TIME_MS_PER_SEC: u64 = 1000;

/// Milliseconds per minute
pub const TIME_MS_PER_MIN: u64 = 60 * TIME_MS_PER_SEC;

/// Milliseconds per hour
pub const TIME_MS_PER_HOUR: u64 = 60 * TIME_MS_PER_MIN;

/// Milliseconds per day
pub const TIME_MS_PER_DAY: u64 = 24 * TIME_MS_PER_HOUR;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_defaults_ordered() {
        assert!(TIER_FAST_SIZE_BYTES_DEFAULT < TIER_MEDIUM_SIZE_BYTES_DEFAULT);
        assert!(TIER_FAST_TTL_MS_DEFAULT < TIER_MEDIUM_TTL_MS_DEFAULT);
    }

    #[test]
    fn test_adaptive_weights_sum_to_one() {
        let sum = EVICTION_ADAPTIVE_WEIGHT_AGE
            + EVICTION_ADAPTIVE_WEIGHT_FREQUENCY
            + EVICTION_ADAPTIVE_WEIGHT_SIZE;
        assert!((sum - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_time_constants_consistent() {
        assert_eq!(TIME_MS_PER_MIN, 60_000);
        assert_eq!(TIME_MS_PER_HOUR, 3_600_000);
        assert_eq!(TIME_MS_PER_DAY, 86_400_000);
    }
}
