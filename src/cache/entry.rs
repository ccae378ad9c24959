//! Cache entry and tier identity types.
//!
//! An entry's lifecycle: created on `set` (or preload fulfillment), metadata
//! mutated on hits and on promotion/demotion, destroyed on remove, clear,
//! expiry, or eviction. The value itself is immutable once stored. Ownership
//! by a tier is structural: exactly one `TierStore` map contains the entry,
//! and only the façade moves it.

use crate::dst::SimClock;

/// Identity of one tier in the fast→slow chain (index into the tier list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TierId(pub usize);

impl std::fmt::Display for TierId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tier{}", self.0)
    }
}

/// How an entry came to be in the cache.
///
/// Preload-originated entries are tracked separately in statistics so that
/// preload accuracy is never conflated with organic hit rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOrigin {
    /// Stored by a direct caller `set`.
    Direct,
    /// Staged by preload-hint fulfillment.
    Preload,
}

/// A single cached value with its access metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached value (opaque to the cache)
    pub value: V,
    /// Caller-supplied size estimate in bytes
    pub size_bytes: usize,
    /// Creation timestamp (ms)
    pub created_at_ms: u64,
    /// Last successful-hit timestamp (ms); equals `created_at_ms` until hit
    pub last_accessed_ms: u64,
    /// Number of successful hits (never incremented by `set`)
    pub access_count: u64,
    /// Absolute expiry timestamp (ms); `None` means no TTL
    pub expires_at_ms: Option<u64>,
    /// Whether the entry was stored directly or staged by preload
    pub origin: EntryOrigin,
}

impl<V> CacheEntry<V> {
    /// Create a fresh entry at the clock's current time.
    #[must_use]
    pub fn new(value: V, size_bytes: usize, ttl_ms: Option<u64>, clock: &SimClock) -> Self {
        let now_ms = clock.now_ms();
        Self {
            value,
            size_bytes,
            created_at_ms: now_ms,
            last_accessed_ms: now_ms,
            access_count: 0,
            expires_at_ms: ttl_ms.map(|ttl| now_ms.saturating_add(ttl)),
            origin: EntryOrigin::Direct,
        }
    }

    /// Whether the entry has expired at the given time.
    #[must_use]
    pub fn is_expired(&self, now_ms: u64) -> bool {
        match self.expires_at_ms {
            Some(expires_at) => expires_at <= now_ms,
            None => false,
        }
    }

    /// Record a successful hit.
    pub fn touch(&mut self, now_ms: u64) {
        self.last_accessed_ms = now_ms;
        self.access_count += 1;

        // Postconditions
        assert!(self.access_count > 0, "access_count must be positive after touch");
    }

    /// Reset the expiry deadline from a new TTL (used on promotion/demotion).
    pub fn reset_ttl(&mut self, ttl_ms: Option<u64>, now_ms: u64) {
        self.expires_at_ms = ttl_ms.map(|ttl| now_ms.saturating_add(ttl));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_metadata() {
        let clock = SimClock::at_ms(1_000);
        let entry = CacheEntry::new("v".to_string(), 10, Some(500), &clock);

        assert_eq!(entry.created_at_ms, 1_000);
        assert_eq!(entry.last_accessed_ms, 1_000);
        assert_eq!(entry.access_count, 0);
        assert_eq!(entry.expires_at_ms, Some(1_500));
        assert_eq!(entry.origin, EntryOrigin::Direct);
    }

    #[test]
    fn test_no_ttl_never_expires() {
        let clock = SimClock::new();
        let entry = CacheEntry::new((), 1, None, &clock);
        assert!(!entry.is_expired(u64::MAX));
    }

    #[test]
    fn test_expiry_boundary_inclusive() {
        let clock = SimClock::at_ms(0);
        let entry = CacheEntry::new((), 1, Some(100), &clock);
        assert!(!entry.is_expired(99));
        assert!(entry.is_expired(100));
        assert!(entry.is_expired(101));
    }

    #[test]
    fn test_touch_updates_metadata() {
        let clock = SimClock::at_ms(0);
        let mut entry = CacheEntry::new((), 1, None, &clock);
        entry.touch(42);
        assert_eq!(entry.last_accessed_ms, 42);
        assert_eq!(entry.access_count, 1);
    }

    #[test]
    fn test_reset_ttl() {
        let clock = SimClock::at_ms(0);
        let mut entry = CacheEntry::new((), 1, Some(100), &clock);
        entry.reset_ttl(Some(1_000), 50);
        assert_eq!(entry.expires_at_ms, Some(1_050));
        entry.reset_ttl(None, 60);
        assert_eq!(entry.expires_at_ms, None);
    }

    #[test]
    fn test_tier_id_display() {
        assert_eq!(TierId(0).to_string(), "tier0");
        assert_eq!(TierId(2).to_string(), "tier2");
    }
}
