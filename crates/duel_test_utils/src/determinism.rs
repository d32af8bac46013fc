//! Determinism testing utilities.
//!
//! Provides a harness for verifying that duels produce identical results
//! given identical inputs.
//!
//! # Testing Strategy
//!
//! A seeded duel must replay exactly on the same machine. Sources of
//! non-determinism include:
//!
//! - **Ambient randomness**: every roll must come from a stream derived
//!   from the duel seed, never from `thread_rng`.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Cooldowns live in a `BTreeMap` and effects in spawn order.
//!
//! - **Variable step length**: the harness always steps at the fixed rate.
//!
//! Bit-exact results across platforms are not required; floating point
//! differences between CPUs are tolerated.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual systems (damage, awareness, resolution)
//! 2. **Property tests**: random inputs still respect invariants
//! 3. **Integration tests**: full duels are reproducible
//! 4. **Parallel tests**: N duels on scoped threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use duel_core::simulation::Duel;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic duel).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the duel was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Duel is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance by one tick
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use duel_test_utils::determinism::verify_determinism;
/// use duel_test_utils::fixtures::standard_duel;
///
/// let result = verify_determinism(
///     3,
///     120,
///     || standard_duel(7),
///     |duel| {
///         duel.step(1.0 / 60.0);
///     },
///     |duel| duel.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a duel twice with identical setup and compare final hashes.
pub fn verify_duel_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Duel,
{
    let result = verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |duel| {
            let dt = duel.config().fixed_dt();
            duel.step(dt);
        },
        |duel| duel.state_hash(),
    );
    result.is_deterministic
}

/// Result of parallel duel runs.
#[derive(Debug, Clone)]
pub struct ParallelRunResult {
    /// Final state hash from each duel.
    pub hashes: Vec<u64>,
    /// Number of ticks each duel ran.
    pub ticks: u64,
}

impl ParallelRunResult {
    /// Check if all duels produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }
}

/// Run N copies of a duel on scoped threads and collect final hashes.
///
/// Catches state accidentally shared between duels.
pub fn run_parallel_duels<F>(setup_fn: F, num_duels: usize, num_ticks: u64) -> ParallelRunResult
where
    F: Fn() -> Duel + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_duels)
            .map(|_| {
                s.spawn(|| {
                    let mut duel = setup_fn();
                    let dt = duel.config().fixed_dt();
                    for _ in 0..num_ticks {
                        duel.step(dt);
                    }
                    duel.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("duel thread panicked"))
            .collect()
    });

    ParallelRunResult {
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two duels tick-by-tick, finding the first divergence.
///
/// # Returns
///
/// `None` if the duels stay identical, `Some(tick)` if they diverge at
/// that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Duel,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    let dt = a.config().fixed_dt();
    for tick in 1..=num_ticks {
        a.step(dt);
        b.step(dt);

        if a.state_hash() != b.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for kernel property tests.
pub mod strategies {
    use proptest::prelude::*;

    use duel_core::config::{WeaponConfig, WeaponShape, WeaponWeight};
    use duel_core::math::Vec2;
    use duel_core::skills::EffectTag;

    /// A coordinate inside the default test arena.
    pub fn arb_coordinate() -> impl Strategy<Value = f32> {
        -9.0f32..9.0f32
    }

    /// A point inside the default test arena.
    pub fn arb_position() -> impl Strategy<Value = Vec2> {
        (arb_coordinate(), arb_coordinate()).prop_map(|(x, y)| Vec2::new(x, y))
    }

    /// Any bearing.
    pub fn arb_bearing() -> impl Strategy<Value = f32> {
        -std::f32::consts::PI..std::f32::consts::PI
    }

    /// A damage amount, including zero and negative garbage.
    pub fn arb_damage() -> impl Strategy<Value = f32> {
        prop_oneof![
            Just(0.0f32),
            -50.0f32..0.0f32,
            0.0f32..200.0f32,
        ]
    }

    /// A sequence of damage amounts.
    pub fn arb_damage_sequence(max_len: usize) -> impl Strategy<Value = Vec<f32>> {
        proptest::collection::vec(arb_damage(), 0..max_len)
    }

    /// An optional on-hit status tag.
    pub fn arb_effect_tag() -> impl Strategy<Value = Option<EffectTag>> {
        prop_oneof![
            Just(None),
            Just(Some(EffectTag::Stun)),
            Just(Some(EffectTag::Freeze)),
            Just(Some(EffectTag::Poison)),
            Just(Some(EffectTag::Bleed)),
            Just(Some(EffectTag::Burn)),
        ]
    }

    /// A step length between a fast and a slow frame.
    pub fn arb_dt() -> impl Strategy<Value = f32> {
        0.001f32..0.1f32
    }

    /// A weapon with random shape, weight and geometry.
    pub fn arb_weapon() -> impl Strategy<Value = WeaponConfig> {
        (
            prop_oneof![
                Just(WeaponShape::Line),
                Just(WeaponShape::Orbital),
                Just(WeaponShape::Arc)
            ],
            prop_oneof![
                Just(WeaponWeight::Light),
                Just(WeaponWeight::Medium),
                Just(WeaponWeight::Heavy)
            ],
            0.3f32..2.5f32,
            30.0f32..180.0f32,
        )
            .prop_map(|(shape, weight, blade_length, arc_width_deg)| WeaponConfig {
                shape,
                weight,
                blade_length,
                arc_width_deg,
                ..WeaponConfig::default()
            })
    }

    /// A duel seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }
}
