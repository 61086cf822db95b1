//! Deterministic pseudo-random sources.
//!
//! Neither generator is suitable where unpredictability matters; both exist so that a given
//! seed always reproduces the same pattern.

const LCG_MUL: f64 = 1_664_525.0;
const LCG_INC: f64 = 1_013_904_223.0;
const LCG_MOD: f64 = 4_294_967_296.0;

/// Stateless sine hash of `seed` into `[0, 1)`.
///
/// The same seed always yields the same value; callers thread the seed explicitly.
pub fn hash01(seed: f64) -> f64 {
    let x = seed.sin() * 10_000.0;
    let v = x - x.floor();
    // `x - floor(x)` can round up to exactly 1.0 for tiny negative x.
    if v >= 1.0 { 0.0 } else { v }
}

/// Linear congruential generator over a real-valued state.
///
/// The state is kept as `f64` so fractional seeds (the pattern seed is a real number) advance
/// exactly the way the integer recurrence would for whole seeds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeededRandom {
    seed: f64,
}

impl SeededRandom {
    pub fn new(seed: f64) -> Self {
        Self { seed }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.seed = (self.seed * LCG_MUL + LCG_INC).rem_euclid(LCG_MOD);
        let v = self.seed / LCG_MOD;
        if v >= 1.0 { 0.0 } else { v }
    }

    /// Uniform value in `[min, max)`.
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Uniform index in `0..len`. `len` must be > 0.
    pub fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        ((self.next_f64() * len as f64).floor() as usize).min(len.saturating_sub(1))
    }

    /// Reinitialize to `seed`; the sequence that follows is identical to `SeededRandom::new(seed)`.
    pub fn reset(&mut self, seed: f64) {
        self.seed = seed;
    }

    /// Fisher-Yates shuffle driven by this generator.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/rng.rs"]
mod tests;
