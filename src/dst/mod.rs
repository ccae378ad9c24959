//! Deterministic Simulation Testing (DST) primitives.
//!
//! `TigerStyle`: If you're not testing with controlled time, you're not
//! testing TTL behavior. Every time-dependent component takes a [`SimClock`];
//! tests advance it explicitly and property tests drive whole operation
//! sequences from a single seed.

pub mod clock;
pub mod property;
pub mod rng;

pub use clock::SimClock;
pub use property::{
    PropertyTest, PropertyTestFailure, PropertyTestResult, PropertyTestable, TimeAdvanceConfig,
};
pub use rng::{test_seeds, DeterministicRng};
