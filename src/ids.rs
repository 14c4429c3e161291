//! Synthetic ten-digit identifiers for per-image documents.
//!
//! An id is `random * 1000 + epoch_seconds % 1000` where `random` is drawn
//! uniformly from `[1_000_000, 9_999_999]`. The result always has ten decimal
//! digits and its last three digits give a coarse hint of when it was made.
//! Nothing checks for collisions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Smallest value [`generate_unique_id`] can return.
pub const MIN_ID: u64 = 1_000_000_000;
/// Largest value [`generate_unique_id`] can return.
pub const MAX_ID: u64 = 9_999_999_999;

const RANDOM_MIN: u64 = 1_000_000;
const RANDOM_MAX: u64 = 9_999_999;

/// Build one id from the current epoch seconds and a random source.
pub fn generate_unique_id<R: Rng + ?Sized>(epoch_seconds: u64, rng: &mut R) -> u64 {
    let random_part = rng.gen_range(RANDOM_MIN..=RANDOM_MAX);
    random_part * 1000 + epoch_seconds % 1000
}

/// Whether `id` has the ten-digit shape produced by [`generate_unique_id`].
pub fn is_valid_id(id: u64) -> bool {
    (MIN_ID..=MAX_ID).contains(&id)
}

/// Source of the current time in whole seconds since the Unix epoch.
pub trait Clock {
    fn epoch_seconds(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_seconds(&self) -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn epoch_seconds(&self) -> u64 {
        self.0
    }
}

/// Hands out ids from an owned random source and clock.
pub struct IdGenerator<R = StdRng, C = SystemClock> {
    rng: R,
    clock: C,
}

impl IdGenerator {
    /// Entropy-seeded generator on the wall clock.
    pub fn new() -> Self {
        Self::with_parts(StdRng::from_entropy(), SystemClock)
    }

    /// Reproducible id sequence for a seed, still stamped by the wall clock.
    pub fn seeded(seed: u64) -> Self {
        Self::with_parts(StdRng::seed_from_u64(seed), SystemClock)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng, C: Clock> IdGenerator<R, C> {
    pub fn with_parts(rng: R, clock: C) -> Self {
        Self { rng, clock }
    }

    pub fn next_id(&mut self) -> u64 {
        generate_unique_id(self.clock.epoch_seconds(), &mut self.rng)
    }
}
