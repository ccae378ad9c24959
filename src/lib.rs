//! # stratacache
//!
//! Multi-tier in-memory cache with pluggable eviction, TTL expiry, and
//! predictive preloading.
//!
//! `TigerStyle`-inspired: explicit limits on everything, assertions at the
//! seams, and deterministic simulation testing throughout.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     MultiTierCache                      │
//! │   get / set / remove / clear / stats / sweep_expired    │
//! └──────┬──────────────┬───────────────┬───────────────────┘
//!        │ promotion ▲  │ demotion ▼    │ access stream
//! ┌──────▼──────┐ ┌─────▼───────┐ ┌─────▼────────────────┐
//! │  TierStore  │ │  TierStore  │ │   AccessRecorder     │
//! │  (fast)     │ │  (medium…)  │ │          │           │
//! │  eviction,  │ │  eviction,  │ │ PredictivePreloader  │
//! │  TTL, size  │ │  TTL, size  │ │    → PreloadSink     │
//! └─────────────┘ └─────────────┘ └──────────────────────┘
//! ```
//!
//! Lookups walk the tier chain fastest-first; hits below tier 0 are promoted
//! with a fresh tier-0 TTL. Eviction victims demote to the next slower tier
//! when their access count clears the source tier's threshold. A co-access
//! graph learned from the lookup stream emits preload hints; fulfilled hints
//! are staged in the predictive tier and measured separately.
//!
//! ## Example
//!
//! ```
//! use stratacache::{CacheConfig, MultiTierCache, SimClock};
//!
//! let clock = SimClock::new();
//! let mut cache: MultiTierCache<String> =
//!     MultiTierCache::new(CacheConfig::three_tier(), clock.clone()).unwrap();
//!
//! cache.set("greeting", "hello".to_string(), 5);
//! assert_eq!(cache.get("greeting"), Some("hello".to_string()));
//! assert!(cache.stats().hit_ratio > 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod constants;
pub mod dst;
pub mod orchestration;

pub use cache::{
    derive_key, AdaptiveWeights, CacheEntry, CacheStats, EntryOrigin, EvictionPolicyKind,
    KeyError, RemovalCause, RemovalEvent, TierConfig, TierId, TierStatsSnapshot,
};
pub use dst::SimClock;
pub use orchestration::{
    CacheConfig, ChannelPreloadSink, ConfigError, MultiTierCache, PreloadConfig, PreloadHint,
    PreloadSink, SweepHandle, SweepScheduler,
};
