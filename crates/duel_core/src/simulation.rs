//! Duel orchestrator: the per-tick simulation loop.
//!
//! A [`Duel`] owns both fighters, their brains, the resolver and the effect
//! pool. Each [`Duel::step`] runs, in order:
//!
//! 1. **Hit-stop** - while the countdown is positive the step is skipped.
//! 2. **Slow motion** - scales the simulated `dt`.
//! 3. **Fighter A**, then **fighter B** - timers, AI, movement, casts.
//! 4. **Effects** - advance geometry and lifetimes.
//! 5. **Resolution** - clashes, melee, effects, bodies.
//! 6. **Pruning** and event draining.
//! 7. **Outcome** - the first death in event order decides the winner.
//!
//! Fighter A always updates before fighter B. The small first-mover bias
//! this introduces is accepted.
//!
//! # Determinism
//!
//! All randomness comes from streams derived from the duel seed: one per
//! brain and one for the resolver. Two duels built from the same inputs
//! and stepped with the same `dt` sequence produce the same
//! [`Duel::state_hash`] at every tick.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use duel_core::prelude::*;
//!
//! let red = FighterConfig::new("Red", "Warrior");
//! let blue = FighterConfig::new("Blue", "Rogue");
//! let arena = Arc::new(BoxArena::open(20.0, 20.0));
//! let mut duel = Duel::new(&red, &blue, arena, SkillCatalog::builtin(), DuelConfig::default(), 7);
//! duel.run(600);
//! assert!(duel.tick() > 0);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::f32::consts::PI;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ai::Brain;
use crate::arena::Arena;
use crate::combat::CombatResolver;
use crate::config::{DuelConfig, FighterConfig};
use crate::entities::EffectPool;
use crate::events::{CombatEvent, CombatEventKind, FighterId};
use crate::fighter::{Fighter, Pilot};
use crate::math::Vec2;
use crate::rng::{brain_stream, child_stream, RESOLVER_STREAM};
use crate::skills::SkillCatalog;

/// Identifier of the first fighter.
pub const RED: FighterId = 0;
/// Identifier of the second fighter.
pub const BLUE: FighterId = 1;

/// How a duel ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DuelOutcome {
    /// One fighter died.
    Knockout {
        /// Surviving fighter.
        winner: FighterId,
    },
    /// Time ran out; the higher health fraction wins, equal fractions draw.
    Timeout {
        /// Winner, if any.
        winner: Option<FighterId>,
    },
}

impl DuelOutcome {
    /// The winning fighter, if any.
    #[must_use]
    pub const fn winner(&self) -> Option<FighterId> {
        match *self {
            Self::Knockout { winner } => Some(winner),
            Self::Timeout { winner } => winner,
        }
    }

    /// Whether nobody won.
    #[must_use]
    pub const fn is_draw(&self) -> bool {
        self.winner().is_none()
    }
}

/// Events generated during a single step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEvents {
    /// Tick counter after the step.
    pub tick: u64,
    /// Whether the simulation advanced (false during hit-stop).
    pub simulated: bool,
    /// Simulated seconds advanced.
    pub dt: f32,
    /// Combat events in the order they happened.
    pub events: Vec<CombatEvent>,
    /// Set on the step that decided the duel.
    pub outcome: Option<DuelOutcome>,
}

/// A 1v1 duel.
#[derive(Debug, Clone)]
pub struct Duel {
    configs: [FighterConfig; 2],
    catalog: SkillCatalog,
    arena: Arc<dyn Arena>,
    config: DuelConfig,
    seed: u64,

    fighters: [Fighter; 2],
    brains: [Brain; 2],
    resolver: CombatResolver,
    effects: EffectPool,

    tick: u64,
    time: f32,
    hit_stop: f32,
    slow_motion: f32,
    outcome: Option<DuelOutcome>,
}

impl Duel {
    /// Build a duel. Fighters spawn `spawn_separation` apart across the
    /// arena centre, facing each other.
    #[must_use]
    pub fn new(
        red: &FighterConfig,
        blue: &FighterConfig,
        arena: Arc<dyn Arena>,
        catalog: SkillCatalog,
        config: DuelConfig,
        seed: u64,
    ) -> Self {
        let center = arena.bounds().center();
        let offset = Vec2::new(config.spawn_separation * 0.5, 0.0);
        let fighters = [
            Fighter::new(RED, red, &catalog).at(center - offset, 0.0),
            Fighter::new(BLUE, blue, &catalog).at(center + offset, PI),
        ];
        let brains = [
            Brain::new(&fighters[0], Arc::clone(&arena), child_stream(seed, brain_stream(RED))),
            Brain::new(&fighters[1], Arc::clone(&arena), child_stream(seed, brain_stream(BLUE))),
        ];
        let resolver = CombatResolver::new(Arc::clone(&arena), child_stream(seed, RESOLVER_STREAM))
            .with_heavy_hit_threshold(config.heavy_hit_threshold);

        tracing::debug!(
            red = %red.name,
            blue = %blue.name,
            seed,
            "Duel created"
        );

        Self {
            configs: [red.clone(), blue.clone()],
            catalog,
            arena,
            config,
            seed,
            fighters,
            brains,
            resolver,
            effects: EffectPool::new(),
            tick: 0,
            time: 0.0,
            hit_stop: 0.0,
            slow_motion: 0.0,
            outcome: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current tick.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds elapsed.
    #[must_use]
    pub const fn time(&self) -> f32 {
        self.time
    }

    /// Seed the duel was built with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Both fighters, red first.
    #[must_use]
    pub const fn fighters(&self) -> &[Fighter; 2] {
        &self.fighters
    }

    /// Mutable access to both fighters, for scenario setup.
    pub fn fighters_mut(&mut self) -> &mut [Fighter; 2] {
        &mut self.fighters
    }

    /// Fighter by identifier.
    #[must_use]
    pub fn fighter(&self, id: FighterId) -> Option<&Fighter> {
        self.fighters.iter().find(|f| f.id == id)
    }

    /// Both brains, red first.
    #[must_use]
    pub const fn brains(&self) -> &[Brain; 2] {
        &self.brains
    }

    /// Active effects.
    #[must_use]
    pub const fn effects(&self) -> &EffectPool {
        &self.effects
    }

    /// The arena.
    #[must_use]
    pub fn arena(&self) -> &dyn Arena {
        self.arena.as_ref()
    }

    /// Tuning.
    #[must_use]
    pub const fn config(&self) -> &DuelConfig {
        &self.config
    }

    /// Outcome, once decided.
    #[must_use]
    pub const fn outcome(&self) -> Option<DuelOutcome> {
        self.outcome
    }

    /// Whether the duel has been decided.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Remaining hit-stop, in real seconds.
    #[must_use]
    pub const fn hit_stop_remaining(&self) -> f32 {
        self.hit_stop
    }

    /// Remaining slow motion, in real seconds.
    #[must_use]
    pub const fn slow_motion_remaining(&self) -> f32 {
        self.slow_motion
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Advance by `real_dt` seconds of wall-clock time.
    pub fn step(&mut self, real_dt: f32) -> TickEvents {
        let mut out = TickEvents {
            tick: self.tick,
            ..TickEvents::default()
        };
        if !real_dt.is_finite() || real_dt <= 0.0 {
            return out;
        }
        if self.hit_stop > 0.0 {
            self.hit_stop = (self.hit_stop - real_dt).max(0.0);
            return out;
        }

        let mut dt = real_dt;
        if self.slow_motion > 0.0 {
            self.slow_motion = (self.slow_motion - real_dt).max(0.0);
            dt *= self.config.slow_motion_scale;
        }
        self.advance(dt, &mut out);
        out.tick = self.tick;
        out
    }

    /// Step at the fixed rate until the duel ends or `max_ticks` steps ran.
    pub fn run(&mut self, max_ticks: u64) -> Option<DuelOutcome> {
        let dt = self.config.fixed_dt();
        for _ in 0..max_ticks {
            if self.is_finished() {
                break;
            }
            self.step(dt);
        }
        self.outcome
    }

    /// Restore the initial state. The same seed replays the same duel.
    pub fn reset(&mut self) {
        let [red, blue] = &self.configs;
        *self = Self::new(
            red,
            blue,
            Arc::clone(&self.arena),
            self.catalog.clone(),
            self.config.clone(),
            self.seed,
        );
    }

    fn advance(&mut self, dt: f32, out: &mut TickEvents) {
        let active = self.outcome.is_none();
        {
            let [red, blue] = &mut self.fighters;
            let [red_brain, blue_brain] = &mut self.brains;
            let arena = self.arena.as_ref();
            red.update(
                dt,
                blue,
                active.then_some(red_brain as &mut dyn Pilot),
                &mut self.effects,
                arena,
            );
            blue.update(
                dt,
                red,
                active.then_some(blue_brain as &mut dyn Pilot),
                &mut self.effects,
                arena,
            );
        }
        self.effects.advance(dt, self.arena.as_ref());
        self.drain_fighter_events(out);
        self.credit_dots();

        if active {
            let resolution = self.resolver.resolve(&mut self.fighters, &mut self.effects);
            out.events.extend(resolution.events);
            if resolution.clash {
                self.trigger_hit_stop(self.config.hit_stop_clash);
            }
            if resolution.heavy_hit {
                self.trigger_hit_stop(self.config.hit_stop_heavy);
            }
        } else {
            let [red, blue] = &mut self.fighters;
            self.resolver.separate_bodies(red, blue);
        }
        self.drain_fighter_events(out);
        self.effects.prune();

        self.tick += 1;
        self.time += dt;
        out.simulated = true;
        out.dt = dt;

        if active {
            if let Some(outcome) = self.decide(&out.events) {
                self.finish(outcome);
                out.outcome = Some(outcome);
            }
        }

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::trace!(tick = self.tick, state_hash = hash, "Duel state hash");
        }
    }

    fn drain_fighter_events(&mut self, out: &mut TickEvents) {
        for fighter in &mut self.fighters {
            out.events.extend(fighter.drain_events());
        }
    }

    /// DoT damage is credited to the opponent.
    fn credit_dots(&mut self) {
        let [red, blue] = &mut self.fighters;
        blue.stats.damage_dealt += red.take_dot_credit();
        red.stats.damage_dealt += blue.take_dot_credit();
    }

    fn trigger_hit_stop(&mut self, duration: f32) {
        if duration > self.hit_stop {
            self.hit_stop = duration;
            tracing::debug!(tick = self.tick, duration, "Hit-stop");
        }
    }

    fn decide(&self, events: &[CombatEvent]) -> Option<DuelOutcome> {
        let first_death = events
            .iter()
            .find(|e| e.kind == CombatEventKind::Death)
            .and_then(|e| e.defender);
        if let Some(loser) = first_death {
            let winner = if loser == RED { BLUE } else { RED };
            return Some(DuelOutcome::Knockout { winner });
        }
        if self.time >= self.config.max_duration {
            let [red, blue] = &self.fighters;
            let (r, b) = (red.health_fraction(), blue.health_fraction());
            let winner = if r > b {
                Some(RED)
            } else if b > r {
                Some(BLUE)
            } else {
                None
            };
            return Some(DuelOutcome::Timeout { winner });
        }
        None
    }

    fn finish(&mut self, outcome: DuelOutcome) {
        self.outcome = Some(outcome);
        if matches!(outcome, DuelOutcome::Knockout { .. }) {
            self.trigger_hit_stop(self.config.hit_stop_lethal);
            self.slow_motion = self.config.slow_motion_duration;
        }
        tracing::debug!(
            tick = self.tick,
            time = self.time,
            ?outcome,
            "Duel finished"
        );
    }

    // ========================================================================
    // Hashing
    // ========================================================================

    /// Hash of the simulation state, for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);
        self.time.to_bits().hash(&mut hasher);
        for fighter in &self.fighters {
            fighter.hash_state(&mut hasher);
        }
        self.effects.len().hash(&mut hasher);
        for effect in self.effects.iter() {
            effect.hash_state(&mut hasher);
        }
        self.outcome.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::BoxArena;
    use crate::fighter::DotEffect;
    use crate::skills::EffectTag;

    fn duel(seed: u64) -> Duel {
        let red = FighterConfig::new("Red", "Warrior");
        let blue = FighterConfig::new("Blue", "Berserker");
        Duel::new(
            &red,
            &blue,
            Arc::new(BoxArena::open(20.0, 20.0)),
            SkillCatalog::builtin(),
            DuelConfig::default(),
            seed,
        )
    }

    #[test]
    fn test_spawn_positions() {
        let duel = duel(1);
        let [red, blue] = duel.fighters();
        assert!((red.position.distance(blue.position) - 8.0).abs() < 1e-5);
        assert_eq!(red.facing, 0.0);
        assert!((blue.facing.abs() - PI).abs() < 1e-5);
    }

    #[test]
    fn test_step_advances_tick() {
        let mut duel = duel(1);
        let events = duel.step(1.0 / 60.0);
        assert!(events.simulated);
        assert_eq!(duel.tick(), 1);
        assert_eq!(events.tick, 1);
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let mut duel = duel(1);
        for dt in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(!duel.step(dt).simulated);
        }
        assert_eq!(duel.tick(), 0);
    }

    #[test]
    fn test_hit_stop_skips_simulation() {
        let mut duel = duel(1);
        duel.trigger_hit_stop(0.1);
        let hash = duel.state_hash();
        let events = duel.step(0.05);
        assert!(!events.simulated);
        assert_eq!(duel.state_hash(), hash);
        duel.step(0.05);
        assert!(duel.step(0.05).simulated);
    }

    #[test]
    fn test_hit_stop_never_stacks() {
        let mut duel = duel(1);
        duel.trigger_hit_stop(0.1);
        duel.trigger_hit_stop(0.06);
        assert_eq!(duel.hit_stop_remaining(), 0.1);
        duel.trigger_hit_stop(0.2);
        assert_eq!(duel.hit_stop_remaining(), 0.2);
    }

    #[test]
    fn test_slow_motion_scales_dt() {
        let mut duel = duel(1);
        duel.slow_motion = 1.0;
        let events = duel.step(0.1);
        assert!((events.dt - 0.1 * duel.config().slow_motion_scale).abs() < 1e-6);
    }

    #[test]
    fn test_same_seed_same_hash() {
        let mut a = duel(42);
        let mut b = duel(42);
        for _ in 0..300 {
            a.step(1.0 / 60.0);
            b.step(1.0 / 60.0);
            assert_eq!(a.state_hash(), b.state_hash());
        }
    }

    #[test]
    fn test_reset_replays() {
        let mut duel = duel(9);
        duel.run(200);
        let hash = duel.state_hash();
        duel.reset();
        assert_eq!(duel.tick(), 0);
        duel.run(200);
        assert_eq!(duel.state_hash(), hash);
    }

    #[test]
    fn test_knockout_decides_winner() {
        let mut duel = duel(3);
        duel.fighters_mut()[1].health = 1.0;
        let burn = DotEffect::for_tag(EffectTag::Burn, Some(RED)).unwrap();
        duel.fighters_mut()[1].dots.push(burn);
        let mut outcome = None;
        for _ in 0..120 {
            if let Some(o) = duel.step(1.0 / 60.0).outcome {
                outcome = Some(o);
                break;
            }
        }
        assert_eq!(outcome, Some(DuelOutcome::Knockout { winner: RED }));
        assert!(duel.hit_stop_remaining() > 0.0);
        assert!(duel.slow_motion_remaining() > 0.0);
    }

    #[test]
    fn test_timeout_decided_on_health() {
        let mut duel = Duel::new(
            &FighterConfig::new("Red", "Warrior"),
            &FighterConfig::new("Blue", "Warrior"),
            Arc::new(BoxArena::open(20.0, 20.0)),
            SkillCatalog::builtin(),
            DuelConfig {
                max_duration: 0.05,
                ..DuelConfig::default()
            },
            1,
        );
        duel.fighters_mut()[0].health = 50.0;
        let outcome = duel.run(10);
        assert_eq!(outcome, Some(DuelOutcome::Timeout { winner: Some(BLUE) }));
        assert_eq!(duel.fighters()[1].stats.damage_dealt, 0.0);
    }

    #[test]
    fn test_finished_duel_stops_offense() {
        let mut duel = duel(5);
        duel.outcome = Some(DuelOutcome::Timeout { winner: None });
        let health = [duel.fighters()[0].health, duel.fighters()[1].health];
        for _ in 0..600 {
            duel.step(1.0 / 60.0);
        }
        assert_eq!(duel.fighters()[0].health, health[0]);
        assert_eq!(duel.fighters()[1].health, health[1]);
    }
}
