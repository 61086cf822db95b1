//! Shared primitives: geometry and canvas types, errors, hashing and the seeded RNGs.

pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod math;
pub(crate) mod rng;
