//! Eviction policies for capacity-bounded tiers.
//!
//! `TigerStyle`: Deterministic selection, configurable weights.
//!
//! A policy inspects entry metadata and names the next victim. All variants
//! break ties by lexicographic key order so that eviction is reproducible
//! under test.

use crate::constants::{
    EVICTION_ADAPTIVE_WEIGHT_AGE, EVICTION_ADAPTIVE_WEIGHT_FREQUENCY,
    EVICTION_ADAPTIVE_WEIGHT_SIZE, TIME_MS_PER_MIN,
};

/// Metadata view of one entry offered to a policy.
#[derive(Debug, Clone, Copy)]
pub struct EvictionCandidate<'a> {
    /// Entry key
    pub key: &'a str,
    /// Creation timestamp (ms)
    pub created_at_ms: u64,
    /// Last-hit timestamp (ms)
    pub last_accessed_ms: u64,
    /// Number of hits
    pub access_count: u64,
    /// Size estimate in bytes
    pub size_bytes: usize,
}

/// Policy for selecting eviction victims from a tier.
pub trait EvictionPolicy: Send + Sync + std::fmt::Debug {
    /// Select the next victim among `candidates` at time `now_ms`.
    ///
    /// # Postconditions
    /// - Returns `None` only when `candidates` is empty
    /// - Deterministic: equal inputs produce equal outputs
    fn select_victim(&self, candidates: &[EvictionCandidate<'_>], now_ms: u64) -> Option<String>;

    /// Short policy name for logs.
    fn name(&self) -> &'static str;
}

/// Selector for the policy a tier uses, resolved at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum EvictionPolicyKind {
    /// Evict the least recently used entry.
    Lru,
    /// Evict the least frequently used entry.
    Lfu,
    /// Evict the oldest entry.
    Fifo,
    /// Evict by weighted age/frequency/size score.
    Adaptive(AdaptiveWeights),
}

impl EvictionPolicyKind {
    /// Build the policy implementation.
    #[must_use]
    pub fn build(&self) -> Box<dyn EvictionPolicy> {
        match self {
            Self::Lru => Box::new(LruPolicy),
            Self::Lfu => Box::new(LfuPolicy),
            Self::Fifo => Box::new(FifoPolicy),
            Self::Adaptive(weights) => Box::new(AdaptivePolicy::new(*weights)),
        }
    }
}

// =============================================================================
// LRU / LFU / FIFO
// =============================================================================

/// Victim = smallest `last_accessed_ms`.
#[derive(Debug, Clone)]
pub struct LruPolicy;

impl EvictionPolicy for LruPolicy {
    fn select_victim(&self, candidates: &[EvictionCandidate<'_>], _now_ms: u64) -> Option<String> {
        candidates
            .iter()
            .min_by_key(|c| (c.last_accessed_ms, c.key))
            .map(|c| c.key.to_string())
    }

    fn name(&self) -> &'static str {
        "lru"
    }
}

/// Victim = smallest `access_count`.
#[derive(Debug, Clone)]
pub struct LfuPolicy;

impl EvictionPolicy for LfuPolicy {
    fn select_victim(&self, candidates: &[EvictionCandidate<'_>], _now_ms: u64) -> Option<String> {
        candidates
            .iter()
            .min_by_key(|c| (c.access_count, c.key))
            .map(|c| c.key.to_string())
    }

    fn name(&self) -> &'static str {
        "lfu"
    }
}

/// Victim = smallest `created_at_ms`.
#[derive(Debug, Clone)]
pub struct FifoPolicy;

impl EvictionPolicy for FifoPolicy {
    fn select_victim(&self, candidates: &[EvictionCandidate<'_>], _now_ms: u64) -> Option<String> {
        candidates
            .iter()
            .min_by_key(|c| (c.created_at_ms, c.key))
            .map(|c| c.key.to_string())
    }

    fn name(&self) -> &'static str {
        "fifo"
    }
}

// =============================================================================
// Adaptive
// =============================================================================

/// Weights for the adaptive eviction score.
///
/// `score = age·age_minutes + frequency·(1/(access_count+1)) + size·size_bytes`;
/// the entry with the highest score (old, rarely used, large) is evicted
/// first. Weights are deployment configuration, not hard-coded policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveWeights {
    /// Weight on entry age in minutes
    pub age: f64,
    /// Weight on inverse access frequency
    pub frequency: f64,
    /// Weight on entry size in bytes
    pub size: f64,
}

impl AdaptiveWeights {
    /// Create weights, validating non-negativity.
    ///
    /// # Preconditions
    /// - All weights must be >= 0.0 and at least one must be > 0.0
    #[must_use]
    pub fn new(age: f64, frequency: f64, size: f64) -> Self {
        // Preconditions
        assert!(age >= 0.0, "age weight must be >= 0.0");
        assert!(frequency >= 0.0, "frequency weight must be >= 0.0");
        assert!(size >= 0.0, "size weight must be >= 0.0");
        assert!(
            age + frequency + size > 0.0,
            "at least one weight must be > 0.0"
        );

        Self {
            age,
            frequency,
            size,
        }
    }

    /// Whether the weights are valid (used by config validation).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.age >= 0.0
            && self.frequency >= 0.0
            && self.size >= 0.0
            && self.age + self.frequency + self.size > 0.0
    }
}

impl Default for AdaptiveWeights {
    fn default() -> Self {
        Self {
            age: EVICTION_ADAPTIVE_WEIGHT_AGE,
            frequency: EVICTION_ADAPTIVE_WEIGHT_FREQUENCY,
            size: EVICTION_ADAPTIVE_WEIGHT_SIZE,
        }
    }
}

/// Weighted-score eviction; evicts old, rarely used, large entries first.
#[derive(Debug, Clone)]
pub struct AdaptivePolicy {
    weights: AdaptiveWeights,
}

impl AdaptivePolicy {
    /// Create a policy with the given weights.
    #[must_use]
    pub fn new(weights: AdaptiveWeights) -> Self {
        // Preconditions
        assert!(weights.is_valid(), "invalid adaptive weights");

        Self { weights }
    }

    fn score(&self, candidate: &EvictionCandidate<'_>, now_ms: u64) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let age_minutes =
            now_ms.saturating_sub(candidate.created_at_ms) as f64 / TIME_MS_PER_MIN as f64;
        #[allow(clippy::cast_precision_loss)]
        let inverse_frequency = 1.0 / (candidate.access_count as f64 + 1.0);
        #[allow(clippy::cast_precision_loss)]
        let size = candidate.size_bytes as f64;

        self.weights.age * age_minutes
            + self.weights.frequency * inverse_frequency
            + self.weights.size * size
    }
}

impl EvictionPolicy for AdaptivePolicy {
    fn select_victim(&self, candidates: &[EvictionCandidate<'_>], now_ms: u64) -> Option<String> {
        candidates
            .iter()
            .map(|c| (self.score(c, now_ms), c.key))
            // Highest score evicted first; ties broken by key order.
            .max_by(|(score_a, key_a), (score_b, key_b)| {
                score_a
                    .partial_cmp(score_b)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| key_b.cmp(key_a))
            })
            .map(|(_, key)| key.to_string())
    }

    fn name(&self) -> &'static str {
        "adaptive"
    }
}

// =============================================================================
// Tests
// =============================================================================
