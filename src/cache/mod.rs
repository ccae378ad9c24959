//! Cache storage layer: entries, tiers, eviction, and accounting.
//!
//! This module owns everything that happens *inside* one tier. The
//! cross-tier behaviors (promotion, demotion, preloading) live in
//! [`crate::orchestration`] and drive the tiers through the `TierStore`
//! surface defined here.

pub mod entry;
pub mod eviction;
pub mod key;
pub mod size;
pub mod stats;
pub mod store;

pub use entry::{CacheEntry, EntryOrigin, TierId};
pub use eviction::{AdaptiveWeights, EvictionCandidate, EvictionPolicy, EvictionPolicyKind};
pub use key::{derive_key, KeyError};
pub use size::SizeAccountant;
pub use stats::{CacheStats, GlobalStats, TierStats, TierStatsSnapshot};
pub use store::{RemovalCause, RemovalEvent, TierConfig, TierStore};
