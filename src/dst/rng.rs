//! `DeterministicRng` - Seeded random number generation.
//!
//! `TigerStyle`: Single seed controls all randomness; same seed reproduces
//! the same operation sequence exactly.
//!
//! Uses splitmix64 for seeding and xorshift64* for the stream. Not
//! cryptographic; deterministic test input generation only.

/// Seeded RNG for deterministic test input generation.
#[derive(Debug, Clone)]
pub struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    /// Create an RNG from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        // splitmix64 scramble so that small seeds diverge immediately
        let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        Self {
            state: (z ^ (z >> 31)) | 1,
        }
    }

    /// Next raw 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform float in `[0.0, 1.0)`.
    pub fn next_float(&mut self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let f = (self.next_u64() >> 11) as f64;
        f / (1u64 << 53) as f64
    }

    /// Uniform integer in `[min, max]` (inclusive on both ends).
    ///
    /// # Preconditions
    /// - `min <= max`
    pub fn next_usize(&mut self, min: usize, max: usize) -> usize {
        // Preconditions
        assert!(min <= max, "min {} must be <= max {}", min, max);

        let span = (max - min) as u64 + 1;
        min + (self.next_u64() % span) as usize
    }

    /// Biased coin flip; returns `true` with the given probability.
    ///
    /// # Preconditions
    /// - `probability` must be in `[0.0, 1.0]`
    pub fn next_bool(&mut self, probability: f64) -> bool {
        // Preconditions
        assert!(
            (0.0..=1.0).contains(&probability),
            "probability {} outside [0.0, 1.0]",
            probability
        );

        self.next_float() < probability
    }

    /// Fork an independent RNG whose stream does not overlap this one.
    pub fn fork(&mut self) -> Self {
        Self::new(self.next_u64())
    }
}

/// Canonical seeds used by multi-seed test sweeps.
#[must_use]
pub fn test_seeds() -> [u64; 5] {
    [0, 1, 42, 12_345, 99_999]
}
