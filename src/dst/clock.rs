//! `SimClock` - Deterministic time source.
//!
//! `TigerStyle`: All time in the cache flows through a `SimClock`. Tests
//! advance it explicitly; production deployments drive it from wall time.
//!
//! Clones share state, so a single advance is visible to every component
//! holding a handle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use crate::constants::DST_TIME_ADVANCE_MS_MAX;

/// Shared, manually advanced clock (milliseconds since an arbitrary epoch).
#[derive(Debug, Clone)]
pub struct SimClock {
    inner: Arc<ClockInner>,
}

#[derive(Debug)]
struct ClockInner {
    now_ms: AtomicU64,
    advanced: Notify,
}

impl SimClock {
    /// Create a clock starting at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::at_ms(0)
    }

    /// Create a clock starting at the given millisecond timestamp.
    #[must_use]
    pub fn at_ms(start_ms: u64) -> Self {
        Self {
            inner: Arc::new(ClockInner {
                now_ms: AtomicU64::new(start_ms),
                advanced: Notify::new(),
            }),
        }
    }

    /// Current time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.inner.now_ms.load(Ordering::Acquire)
    }

    /// Advance time by `ms` milliseconds, returning the new time.
    ///
    /// # Preconditions
    /// - `ms` must not exceed `DST_TIME_ADVANCE_MS_MAX` (advance large spans
    ///   in increments; a single huge jump usually indicates a test bug)
    pub fn advance_ms(&self, ms: u64) -> u64 {
        // Preconditions
        assert!(
            ms <= DST_TIME_ADVANCE_MS_MAX,
            "time advance {} ms exceeds maximum {}",
            ms,
            DST_TIME_ADVANCE_MS_MAX
        );

        let new_now = self.inner.now_ms.fetch_add(ms, Ordering::AcqRel) + ms;
        self.inner.advanced.notify_waiters();
        new_now
    }

    /// Advance time by fractional seconds, returning the new time.
    pub fn advance_secs(&self, secs: f64) -> u64 {
        // Preconditions
        assert!(secs >= 0.0, "secs must be non-negative, got {}", secs);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let ms = (secs * 1000.0) as u64;
        self.advance_ms(ms)
    }

    /// Wait until the clock has advanced by at least `ms` milliseconds.
    ///
    /// Completes immediately if the target time has already passed. Never
    /// advances time itself.
    pub async fn sleep_ms(&self, ms: u64) {
        let target = self.now_ms().saturating_add(ms);
        while self.now_ms() < target {
            self.inner.advanced.notified().await;
        }
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_at_zero() {
        let clock = SimClock::new();
        assert_eq!(clock.now_ms(), 0);
    }

    #[test]
    fn test_clock_at_ms() {
        let clock = SimClock::at_ms(1_000_000);
        assert_eq!(clock.now_ms(), 1_000_000);
    }

    #[test]
    fn test_advance_returns_new_time() {
        let clock = SimClock::new();
        assert_eq!(clock.advance_ms(500), 500);
        assert_eq!(clock.advance_ms(250), 750);
        assert_eq!(clock.now_ms(), 750);
    }

    #[test]
    fn test_clones_share_state() {
        let clock = SimClock::new();
        let other = clock.clone();
        clock.advance_ms(100);
        assert_eq!(other.now_ms(), 100);
    }

    #[test]
    fn test_advance_secs() {
        let clock = SimClock::new();
        clock.advance_secs(1.5);
        assert_eq!(clock.now_ms(), 1500);
    }

    #[test]
    #[should_panic(expected = "exceeds maximum")]
    fn test_advance_beyond_limit() {
        let clock = SimClock::new();
        clock.advance_ms(DST_TIME_ADVANCE_MS_MAX + 1);
    }

    #[tokio::test]
    async fn test_sleep_completes_after_advance() {
        let clock = SimClock::new();
        let sleeper = clock.clone();

        let handle = tokio::spawn(async move {
            sleeper.sleep_ms(1000).await;
            sleeper.now_ms()
        });

        // Give the sleeper a chance to park before advancing.
        tokio::task::yield_now().await;
        clock.advance_ms(1000);

        let woke_at = handle.await.unwrap();
        assert!(woke_at >= 1000);
    }
}
