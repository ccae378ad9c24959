//! Cross-tier orchestration: lookup routing, promotion, demotion, access
//! learning, predictive preloading, and scheduled sweeps.

pub mod access_tracker;
pub mod preload;
pub mod sweep;
pub mod unified;

pub use access_tracker::{AccessPattern, AccessRecorder};
pub use preload::{
    ChannelPreloadSink, PredictivePreloader, PreloadConfig, PreloadHint, PreloadSink,
};
pub use sweep::{SweepHandle, SweepScheduler};
pub use unified::{CacheConfig, ConfigError, MultiTierCache};
