//! `PredictivePreloader` - Co-access learning and preload hints.
//!
//! `TigerStyle`: Bounded graph, deterministic tie-breaks, no I/O.
//!
//! The preloader never fetches anything itself. It watches the access stream,
//! maintains a bounded key→successor co-access graph, and emits
//! [`PreloadHint`]s through a [`PreloadSink`]. An external fetcher that
//! resolves a hint hands the value back via the façade's preload-fulfillment
//! path, which stages it in the predictive tier.

use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::constants::{
    PRELOAD_HINTS_PER_INSERT_COUNT_MAX, PRELOAD_RECENCY_WINDOW_MS_DEFAULT,
    PRELOAD_SUCCESSORS_COUNT_MAX, PRELOAD_TRACKED_KEYS_COUNT_MAX,
};

// =============================================================================
// Configuration
// =============================================================================

/// Tunables for co-access learning and hint emission.
#[derive(Debug, Clone)]
pub struct PreloadConfig {
    /// Two accesses closer together than this count as a co-access
    pub recency_window_ms: u64,
    /// Maximum successors tracked per key
    pub max_successors: usize,
    /// Maximum keys tracked in the graph
    pub max_tracked_keys: usize,
    /// Maximum hints emitted per triggering access
    pub max_hints: usize,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            recency_window_ms: PRELOAD_RECENCY_WINDOW_MS_DEFAULT,
            max_successors: PRELOAD_SUCCESSORS_COUNT_MAX,
            max_tracked_keys: PRELOAD_TRACKED_KEYS_COUNT_MAX,
            max_hints: PRELOAD_HINTS_PER_INSERT_COUNT_MAX,
        }
    }
}

impl PreloadConfig {
    /// Set the co-access recency window.
    #[must_use]
    pub fn with_recency_window_ms(mut self, window_ms: u64) -> Self {
        assert!(window_ms > 0, "recency window must be positive");
        self.recency_window_ms = window_ms;
        self
    }

    /// Set the maximum hints emitted per triggering access.
    #[must_use]
    pub fn with_max_hints(mut self, max_hints: usize) -> Self {
        assert!(max_hints > 0, "max_hints must be positive");
        self.max_hints = max_hints;
        self
    }
}

// =============================================================================
// Hints and Sinks
// =============================================================================

/// A suggestion to fetch `key` ahead of demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadHint {
    /// The key predicted to be accessed soon
    pub key: String,
    /// The key whose access triggered the prediction
    pub predicted_from: String,
    /// Number of co-access observations backing the prediction
    pub observations: u64,
}

/// Receives preload hints for out-of-band fulfillment.
pub trait PreloadSink: Send + Sync + std::fmt::Debug {
    /// Deliver one hint. Must not block.
    fn send_hint(&self, hint: PreloadHint);
}

/// Sink that forwards hints over an unbounded channel.
///
/// A dropped receiver silently discards hints: preloading is advisory and
/// must never disturb the serving path.
#[derive(Debug, Clone)]
pub struct ChannelPreloadSink {
    tx: mpsc::UnboundedSender<PreloadHint>,
}

impl ChannelPreloadSink {
    /// Create a sink and the receiver a fetcher task should drain.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PreloadHint>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl PreloadSink for ChannelPreloadSink {
    fn send_hint(&self, hint: PreloadHint) {
        if self.tx.send(hint).is_err() {
            tracing::debug!("preload hint receiver dropped; discarding hint");
        }
    }
}

// =============================================================================
// Preloader
// =============================================================================

/// Bounded key→successor co-access graph.
#[derive(Debug)]
pub struct PredictivePreloader {
    graph: HashMap<String, HashMap<String, u64>>,
    config: PreloadConfig,
}

impl PredictivePreloader {
    /// Create an empty preloader.
    #[must_use]
    pub fn new(config: PreloadConfig) -> Self {
        // Preconditions
        assert!(config.max_successors > 0, "max_successors must be positive");
        assert!(
            config.max_tracked_keys > 0,
            "max_tracked_keys must be positive"
        );

        Self {
            graph: HashMap::new(),
            config,
        }
    }

    /// Record that an access to `from` was followed by an access to `to`.
    ///
    /// Self-transitions carry no predictive signal and are dropped.
    pub fn record_transition(&mut self, from: &str, to: &str) {
        if from == to {
            return;
        }

        if !self.graph.contains_key(from) && self.graph.len() >= self.config.max_tracked_keys {
            self.evict_weakest_tracked_key();
        }

        let successors = self.graph.entry(from.to_string()).or_default();
        if !successors.contains_key(to) && successors.len() >= self.config.max_successors {
            // Make room by forgetting the weakest successor.
            if let Some(weakest) = successors
                .iter()
                .min_by(|(key_a, count_a), (key_b, count_b)| {
                    count_a.cmp(count_b).then_with(|| key_a.cmp(key_b))
                })
                .map(|(key, _)| key.clone())
            {
                successors.remove(&weakest);
            }
        }
        *successors.entry(to.to_string()).or_insert(0) += 1;

        // Postconditions
        assert!(
            self.graph.len() <= self.config.max_tracked_keys,
            "tracked-key bound violated"
        );
    }

    /// Predicted next keys after `key`, strongest first.
    ///
    /// Ordered by observation count descending, then key ascending, truncated
    /// to the configured hint budget.
    #[must_use]
    pub fn candidates(&self, key: &str) -> Vec<PreloadHint> {
        let Some(successors) = self.graph.get(key) else {
            return Vec::new();
        };

        let mut hints: Vec<PreloadHint> = successors
            .iter()
            .map(|(successor, count)| PreloadHint {
                key: successor.clone(),
                predicted_from: key.to_string(),
                observations: *count,
            })
            .collect();
        hints.sort_by(|a, b| {
            b.observations
                .cmp(&a.observations)
                .then_with(|| a.key.cmp(&b.key))
        });
        hints.truncate(self.config.max_hints);
        hints
    }

    /// Number of keys with at least one tracked successor.
    #[must_use]
    pub fn tracked_key_count(&self) -> usize {
        self.graph.len()
    }

    /// Preloader configuration.
    #[must_use]
    pub fn config(&self) -> &PreloadConfig {
        &self.config
    }

    /// Forget all learned transitions.
    pub fn clear(&mut self) {
        self.graph.clear();
    }

    fn evict_weakest_tracked_key(&mut self) {
        let weakest = self
            .graph
            .iter()
            .map(|(key, successors)| (key, successors.values().sum::<u64>()))
            .min_by(|(key_a, total_a), (key_b, total_b)| {
                total_a.cmp(total_b).then_with(|| key_a.cmp(key_b))
            })
            .map(|(key, _)| key.clone());
        if let Some(key) = weakest {
            self.graph.remove(&key);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
