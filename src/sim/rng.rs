//! Seeded randomness for world generation
//!
//! Every random decision in the simulation goes through [`RandomSource`], so a
//! session is fully reproducible from its seed and tests can script outcomes.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Bounded-integer and uniform-float generator
pub trait RandomSource {
    /// Uniform integer in `[min, max]` (both inclusive)
    fn int_between(&mut self, min: i32, max: i32) -> i32;

    /// Uniform float in `[0, 1)`
    fn unit(&mut self) -> f32;

    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }

    /// Uniform float in `[min, max)`
    fn float_between(&mut self, min: f32, max: f32) -> f32 {
        let v = min + self.unit() * (max - min);
        // f32 rounding can land exactly on `max`
        if v < max { v } else { min }
    }
}

/// Default generator: PCG32 seeded from the run seed
#[derive(Debug, Clone)]
pub struct GameRng {
    seed: u64,
    inner: Pcg32,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

impl RandomSource for GameRng {
    fn int_between(&mut self, min: i32, max: i32) -> i32 {
        debug_assert!(min <= max, "int_between({min}, {max})");
        if min >= max {
            return min;
        }
        self.inner.random_range(min..=max)
    }

    fn unit(&mut self) -> f32 {
        self.inner.random::<f32>()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn int_between(&mut self, min: i32, max: i32) -> i32 {
        (**self).int_between(min, max)
    }

    fn unit(&mut self) -> f32 {
        (**self).unit()
    }
}
