//! Property-based testing over deterministic operation sequences.
//!
//! `TigerStyle`: A `PropertyTestable` subject generates its own operations
//! from a seeded RNG, applies them against a `SimClock`, and checks its
//! invariants after every step. Same seed = same sequence = reproducible
//! failures.

use crate::constants::DST_PROPERTY_OPERATIONS_COUNT_MAX;
use crate::dst::{DeterministicRng, SimClock};

/// A stateful subject that can be driven by generated operations.
pub trait PropertyTestable {
    /// Operation type the subject understands.
    type Operation: std::fmt::Debug;

    /// Generate the next operation from the RNG.
    fn generate_operation(&self, rng: &mut DeterministicRng) -> Self::Operation;

    /// Apply an operation at the current clock time.
    fn apply_operation(&mut self, op: &Self::Operation, clock: &SimClock);

    /// Check all invariants; returns a description of the first violation.
    ///
    /// # Errors
    /// Returns a human-readable violation message.
    fn check_invariants(&self) -> Result<(), String>;

    /// One-line state description for failure reports.
    fn describe_state(&self) -> String;
}

/// How simulated time advances between operations.
#[derive(Debug, Clone, Copy)]
pub enum TimeAdvanceConfig {
    /// Time never advances.
    None,
    /// Advance a fixed amount before every operation.
    Fixed(u64),
    /// With the given probability, advance a uniform amount in `[min, max]`.
    Random {
        /// Minimum advance in milliseconds
        min_ms: u64,
        /// Maximum advance in milliseconds
        max_ms: u64,
        /// Probability of advancing at each step
        probability: f64,
    },
}

impl TimeAdvanceConfig {
    /// Random time advance configuration.
    ///
    /// # Preconditions
    /// - `min_ms <= max_ms`
    /// - `probability` in `[0.0, 1.0]`
    #[must_use]
    pub fn random(min_ms: u64, max_ms: u64, probability: f64) -> Self {
        // Preconditions
        assert!(min_ms <= max_ms, "min_ms {} > max_ms {}", min_ms, max_ms);
        assert!(
            (0.0..=1.0).contains(&probability),
            "probability {} outside [0.0, 1.0]",
            probability
        );

        Self::Random {
            min_ms,
            max_ms,
            probability,
        }
    }
}

/// Failure report from a property test run.
#[derive(Debug, Clone)]
pub struct PropertyTestFailure {
    /// Seed that reproduces the failure
    pub seed: u64,
    /// Zero-based index of the operation after which the invariant broke
    pub operation_index: usize,
    /// The invariant violation message
    pub violation: String,
    /// Subject state at the point of failure
    pub state: String,
    /// The last operations applied, most recent last
    pub recent_operations: Vec<String>,
}

impl std::fmt::Display for PropertyTestFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "property violated at op {} (seed {}): {}",
            self.operation_index, self.seed, self.violation
        )?;
        writeln!(f, "state: {}", self.state)?;
        for op in &self.recent_operations {
            writeln!(f, "  {}", op)?;
        }
        Ok(())
    }
}

/// Result of a property test run.
pub type PropertyTestResult = Result<(), PropertyTestFailure>;

/// Driver that runs generated operations against a subject.
#[derive(Debug, Clone)]
pub struct PropertyTest {
    seed: u64,
    max_operations: usize,
    time_advance: TimeAdvanceConfig,
}

impl PropertyTest {
    /// Create a property test with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_operations: 100,
            time_advance: TimeAdvanceConfig::None,
        }
    }

    /// Set the number of operations to run.
    ///
    /// # Preconditions
    /// - `count` must be in `(0, DST_PROPERTY_OPERATIONS_COUNT_MAX]`
    #[must_use]
    pub fn with_max_operations(mut self, count: usize) -> Self {
        // Preconditions
        assert!(count > 0, "count must be > 0");
        assert!(
            count <= DST_PROPERTY_OPERATIONS_COUNT_MAX,
            "count {} exceeds maximum {}",
            count,
            DST_PROPERTY_OPERATIONS_COUNT_MAX
        );

        self.max_operations = count;
        self
    }

    /// Set how time advances between operations.
    #[must_use]
    pub fn with_time_advance(mut self, config: TimeAdvanceConfig) -> Self {
        self.time_advance = config;
        self
    }

    /// Run the test; returns the first invariant violation, if any.
    ///
    /// # Errors
    /// Returns a `PropertyTestFailure` describing the violation.
    pub fn run<S: PropertyTestable>(&self, mut subject: S) -> PropertyTestResult {
        const HISTORY_LEN: usize = 10;

        let mut rng = DeterministicRng::new(self.seed);
        let clock = SimClock::new();
        let mut history: Vec<String> = Vec::with_capacity(HISTORY_LEN);

        for index in 0..self.max_operations {
            self.maybe_advance_time(&clock, &mut rng);

            let op = subject.generate_operation(&mut rng);
            if history.len() == HISTORY_LEN {
                history.remove(0);
            }
            history.push(format!("[{}] {:?} @ {}ms", index, op, clock.now_ms()));

            subject.apply_operation(&op, &clock);

            if let Err(violation) = subject.check_invariants() {
                return Err(PropertyTestFailure {
                    seed: self.seed,
                    operation_index: index,
                    violation,
                    state: subject.describe_state(),
                    recent_operations: history,
                });
            }
        }

        Ok(())
    }

    /// Run the test and panic with a reproducible report on failure.
    pub fn run_and_assert<S: PropertyTestable>(&self, subject: S) {
        if let Err(failure) = self.run(subject) {
            panic!("{}", failure);
        }
    }

    fn maybe_advance_time(&self, clock: &SimClock, rng: &mut DeterministicRng) {
        match self.time_advance {
            TimeAdvanceConfig::None => {}
            TimeAdvanceConfig::Fixed(ms) => {
                clock.advance_ms(ms);
            }
            TimeAdvanceConfig::Random {
                min_ms,
                max_ms,
                probability,
            } => {
                if rng.next_bool(probability) {
                    let ms = rng.next_usize(min_ms as usize, max_ms as usize) as u64;
                    clock.advance_ms(ms);
                }
            }
        }
    }
}
