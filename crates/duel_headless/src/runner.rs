//! Single-duel runner.
//!
//! Resolves fighter arguments (preset names or `.ron` files), loads the
//! optional arena, duel and skill files, and drives one seeded duel to
//! completion.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use duel_core::arena::{ArenaShape, ArenaSpec};
use duel_core::config::{DuelConfig, FighterConfig};
use duel_core::events::CombatEvent;
use duel_core::simulation::Duel;
use duel_core::skills::SkillCatalog;

use crate::error::{HeadlessError, Result};
use crate::metrics::DuelMetrics;
use crate::presets;

/// Width of the default arena.
pub const DEFAULT_ARENA_WIDTH: f32 = 24.0;
/// Height of the default arena.
pub const DEFAULT_ARENA_HEIGHT: f32 = 16.0;

/// Open rectangular arena used when no arena file is given.
#[must_use]
pub fn default_arena() -> ArenaSpec {
    ArenaSpec {
        shape: ArenaShape::centered_rect(DEFAULT_ARENA_WIDTH, DEFAULT_ARENA_HEIGHT),
        obstacles: Vec::new(),
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| HeadlessError::io(path, e))
}

/// Resolve a fighter argument: a preset name, or a path to a RON file.
pub fn load_fighter(arg: &str) -> Result<FighterConfig> {
    if let Some(config) = presets::preset(arg) {
        return Ok(config);
    }
    let path = Path::new(arg);
    if !path.is_file() {
        return Err(HeadlessError::UnknownFighter(arg.to_string()));
    }
    FighterConfig::from_ron_str(&read(path)?).map_err(|e| HeadlessError::config(path, e))
}

/// Load an arena description.
pub fn load_arena(path: &Path) -> Result<ArenaSpec> {
    ArenaSpec::from_ron_str(&read(path)?).map_err(|e| HeadlessError::config(path, e))
}

/// Load duel tuning.
pub fn load_duel_config(path: &Path) -> Result<DuelConfig> {
    DuelConfig::from_ron_str(&read(path)?).map_err(|e| HeadlessError::config(path, e))
}

/// Load a skill catalog.
pub fn load_skills(path: &Path) -> Result<SkillCatalog> {
    SkillCatalog::from_ron_str(&read(path)?).map_err(|e| HeadlessError::config(path, e))
}

/// Everything needed to build a duel.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Red fighter.
    pub red: FighterConfig,
    /// Blue fighter.
    pub blue: FighterConfig,
    /// Arena description.
    pub arena: ArenaSpec,
    /// Skill catalog.
    pub skills: SkillCatalog,
    /// Duel tuning.
    pub duel: DuelConfig,
    /// Duel seed.
    pub seed: u64,
    /// Step budget (0 = derived from the duel's maximum duration).
    pub max_steps: u64,
}

impl RunConfig {
    /// Red vs blue in the default arena with the built-in skills.
    #[must_use]
    pub fn new(red: FighterConfig, blue: FighterConfig) -> Self {
        Self {
            red,
            blue,
            arena: default_arena(),
            skills: SkillCatalog::builtin(),
            duel: DuelConfig::default(),
            seed: 0,
            max_steps: 0,
        }
    }

    /// Set the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the arena.
    #[must_use]
    pub fn with_arena(mut self, arena: ArenaSpec) -> Self {
        self.arena = arena;
        self
    }

    /// Set the duel tuning.
    #[must_use]
    pub fn with_duel_config(mut self, duel: DuelConfig) -> Self {
        self.duel = duel;
        self
    }

    /// Set the skill catalog.
    #[must_use]
    pub fn with_skills(mut self, skills: SkillCatalog) -> Self {
        self.skills = skills;
        self
    }

    /// Set the step budget.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Step budget actually used: twice the fixed steps in the maximum
    /// duration, leaving room for hit-stop.
    #[must_use]
    pub fn step_budget(&self) -> u64 {
        if self.max_steps > 0 {
            return self.max_steps;
        }
        let steps = self.duel.max_duration.max(0.0) * self.duel.tick_rate.max(1) as f32;
        (steps.ceil() as u64).saturating_mul(2)
    }

    /// Build a fresh duel.
    #[must_use]
    pub fn build_duel(&self) -> Duel {
        Duel::new(
            &self.red,
            &self.blue,
            Arc::new(self.arena.build()),
            self.skills.clone(),
            self.duel.clone(),
            self.seed,
        )
    }
}

/// One event as printed by `run --events`.
#[derive(Debug, Serialize)]
pub struct EventLine<'a> {
    /// Tick the event happened on.
    pub tick: u64,
    /// The event.
    pub event: &'a CombatEvent,
}

/// Run one duel at the fixed rate, passing every event to `on_event`.
pub fn run_duel(config: &RunConfig, mut on_event: impl FnMut(u64, &CombatEvent)) -> DuelMetrics {
    let mut duel = config.build_duel();
    let dt = duel.config().fixed_dt();
    let budget = config.step_budget();

    tracing::info!(
        red = %config.red.name,
        blue = %config.blue.name,
        seed = config.seed,
        budget,
        "Starting duel"
    );

    for _ in 0..budget {
        let tick = duel.step(dt);
        for event in &tick.events {
            on_event(tick.tick, event);
        }
        if duel.is_finished() {
            break;
        }
    }

    let metrics = DuelMetrics::collect(&duel);
    tracing::info!(
        ticks = metrics.ticks,
        end = ?metrics.end,
        winner = ?metrics.winner,
        "Duel finished"
    );
    metrics
}
