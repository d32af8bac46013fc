//! Seeded randomness.
//!
//! Every random decision in a duel draws from a [`DuelRng`] derived from the
//! duel seed: one independent stream per brain and one for the resolver.
//! There is no ambient randomness anywhere in the kernel.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Random source used throughout the kernel.
pub type DuelRng = ChaCha8Rng;

/// Stream index for the resolver's crit and evasion rolls.
pub const RESOLVER_STREAM: u64 = 0;

/// Stream index for the brain of the fighter with the given id.
#[must_use]
pub const fn brain_stream(fighter: u32) -> u64 {
    1 + fighter as u64
}

/// Root generator for a seed.
#[must_use]
pub fn seeded(seed: u64) -> DuelRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Independent stream `stream` of the generator for `seed`.
#[must_use]
pub fn child_stream(seed: u64, stream: u64) -> DuelRng {
    let mut rng = seeded(seed);
    rng.set_stream(stream);
    rng
}

/// Bernoulli roll. Non-positive chances never succeed and consume nothing.
pub fn roll(rng: &mut DuelRng, chance: f32) -> bool {
    chance > 0.0 && rng.gen::<f32>() < chance
}
