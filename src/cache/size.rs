//! `SizeAccountant` - Per-tier byte budget bookkeeping.
//!
//! `TigerStyle`: Explicit limits, incremental accounting. An underflow on
//! decrement indicates a caller-side accounting bug: it is fatal in debug
//! builds and clamped to zero (with an error log) in release builds rather
//! than propagated.

/// Tracks the current and maximum byte budget of one tier.
#[derive(Debug, Clone)]
pub struct SizeAccountant {
    current_bytes: usize,
    max_bytes: usize,
}

impl SizeAccountant {
    /// Create an accountant with the given budget.
    ///
    /// # Preconditions
    /// - `max_bytes` must be > 0
    #[must_use]
    pub fn new(max_bytes: usize) -> Self {
        // Preconditions
        assert!(max_bytes > 0, "max_bytes must be > 0");

        Self {
            current_bytes: 0,
            max_bytes,
        }
    }

    /// Record bytes added to the tier.
    pub fn add(&mut self, bytes: usize) {
        self.current_bytes = self.current_bytes.saturating_add(bytes);
    }

    /// Record bytes removed from the tier.
    pub fn subtract(&mut self, bytes: usize) {
        debug_assert!(
            bytes <= self.current_bytes,
            "size accounting underflow: subtracting {} from {}",
            bytes,
            self.current_bytes
        );
        if bytes > self.current_bytes {
            tracing::error!(
                subtract = bytes,
                current = self.current_bytes,
                "size accounting underflow, clamping to zero"
            );
        }
        self.current_bytes = self.current_bytes.saturating_sub(bytes);
    }

    /// Current occupancy in bytes.
    #[must_use]
    pub fn current_bytes(&self) -> usize {
        self.current_bytes
    }

    /// Configured budget in bytes.
    #[must_use]
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Whether adding `bytes` would exceed the budget.
    #[must_use]
    pub fn would_overflow(&self, bytes: usize) -> bool {
        self.current_bytes.saturating_add(bytes) > self.max_bytes
    }

    /// Whether the tier is currently over budget.
    #[must_use]
    pub fn is_over_budget(&self) -> bool {
        self.current_bytes > self.max_bytes
    }

    /// Reset to empty.
    pub fn reset(&mut self) {
        self.current_bytes = 0;
    }
}
