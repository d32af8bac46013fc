//! Batch duel runner for balance testing.
//!
//! Runs many seeded duels in parallel using rayon and aggregates their
//! metrics. Each duel owns all of its state, so results do not depend on
//! scheduling.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use duel_core::arena::ArenaSpec;
use duel_core::config::{DuelConfig, FighterConfig};
use duel_core::skills::SkillCatalog;

use crate::error::{HeadlessError, Result};
use crate::metrics::{BatchSummary, DuelMetrics};
use crate::runner::{default_arena, run_duel, RunConfig};

/// Configuration for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Red fighter.
    pub red: FighterConfig,
    /// Blue fighter.
    pub blue: FighterConfig,
    /// Arena description.
    pub arena: ArenaSpec,
    /// Duel tuning.
    pub duel: DuelConfig,
    /// Skill catalog. Not saved with results.
    #[serde(skip, default = "SkillCatalog::builtin")]
    pub skills: SkillCatalog,
    /// Number of duels to run.
    pub duel_count: u32,
    /// Maximum parallel duels (0 = use rayon default).
    pub parallel: u32,
    /// Seed of the first duel; duel `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Step budget per duel (0 = derived from the duel's maximum duration).
    pub max_steps: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            red: FighterConfig::default(),
            blue: FighterConfig::default(),
            arena: default_arena(),
            duel: DuelConfig::default(),
            skills: SkillCatalog::builtin(),
            duel_count: 100,
            parallel: 0,
            seed_start: 0,
            max_steps: 0,
        }
    }
}

impl BatchConfig {
    /// Create config for a matchup.
    #[must_use]
    pub fn new(red: FighterConfig, blue: FighterConfig, duel_count: u32) -> Self {
        Self {
            red,
            blue,
            duel_count,
            ..Default::default()
        }
    }

    /// Set seed start.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the number of worker threads.
    #[must_use]
    pub fn with_parallel(mut self, parallel: u32) -> Self {
        self.parallel = parallel;
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

    /// Set the per-duel step budget.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    fn run_config(&self, seed: u64) -> RunConfig {
        RunConfig::new(self.red.clone(), self.blue.clone())
            .with_arena(self.arena.clone())
            .with_duel_config(self.duel.clone())
            .with_skills(self.skills.clone())
            .with_max_steps(self.max_steps)
            .with_seed(seed)
    }
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Individual duel metrics, in seed order.
    pub duels: Vec<DuelMetrics>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Total runtime.
    pub duration_seconds: f64,
}

impl BatchResults {
    /// Save results to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| HeadlessError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| HeadlessError::io(path, e))
    }

    /// Load results from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| HeadlessError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Progress tracking for batch runs.
#[derive(Debug)]
pub struct BatchProgress {
    /// Total duels.
    pub total: u32,
    completed: AtomicU32,
    start_time: Instant,
}

impl BatchProgress {
    /// Create new progress tracker.
    #[must_use]
    pub fn new(total: u32) -> Self {
        Self {
            total,
            completed: AtomicU32::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a completed duel and return the new count.
    pub fn record_completion(&self) -> u32 {
        self.completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Current completion count.
    pub fn current(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Completion percentage.
    pub fn percentage(&self) -> f64 {
        f64::from(self.current()) / f64::from(self.total.max(1)) * 100.0
    }

    /// Estimated time remaining.
    pub fn eta(&self) -> Duration {
        let completed = self.current();
        if completed == 0 {
            return Duration::from_secs(0);
        }
        let per_duel = self.start_time.elapsed().as_secs_f64() / f64::from(completed);
        let remaining = self.total.saturating_sub(completed);
        Duration::from_secs_f64(per_duel * f64::from(remaining))
    }
}

/// Run a batch of duels.
pub fn run_batch(config: BatchConfig) -> Result<BatchResults> {
    let start = Instant::now();
    let progress = BatchProgress::new(config.duel_count);

    info!(
        red = %config.red.name,
        blue = %config.blue.name,
        count = config.duel_count,
        seed_start = config.seed_start,
        "Starting batch run"
    );

    let run_all = || -> Vec<DuelMetrics> {
        (0..config.duel_count)
            .into_par_iter()
            .map(|i| {
                let seed = config.seed_start.wrapping_add(u64::from(i));
                let metrics = run_duel(&config.run_config(seed), |_, _| {});
                let completed = progress.record_completion();
                if completed % 50 == 0 {
                    debug!(
                        completed,
                        total = config.duel_count,
                        percent = progress.percentage(),
                        eta_secs = progress.eta().as_secs(),
                        "Batch progress"
                    );
                }
                metrics
            })
            .collect()
    };

    // A local pool keeps the global rayon pool untouched
    let duels = if config.parallel > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel as usize)
            .build()?
            .install(run_all)
    } else {
        run_all()
    };

    let summary = BatchSummary::from_duels(&duels);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        duels = duels.len(),
        duration_secs = duration_seconds,
        win_rate_red = summary.win_rate_red,
        win_rate_blue = summary.win_rate_blue,
        "Batch complete"
    );

    Ok(BatchResults {
        config,
        duels,
        summary,
        duration_seconds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::preset;

    fn small(count: u32) -> BatchConfig {
        BatchConfig::new(preset("warrior").unwrap(), preset("assassin").unwrap(), count)
            .with_max_steps(600)
    }

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert_eq!(config.duel_count, 100);
        assert_eq!(config.parallel, 0);
    }

    #[test]
    fn test_batch_config_builder() {
        let config = small(5).with_seed(12345).with_parallel(2);
        assert_eq!(config.duel_count, 5);
        assert_eq!(config.seed_start, 12345);
        assert_eq!(config.parallel, 2);
        assert_eq!(config.run_config(7).seed, 7);
    }

    #[test]
    fn test_progress_tracking() {
        let progress = BatchProgress::new(4);
        assert_eq!(progress.current(), 0);
        assert_eq!(progress.eta(), Duration::from_secs(0));
        assert_eq!(progress.record_completion(), 1);
        assert_eq!(progress.record_completion(), 2);
        assert!((progress.percentage() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_run_batch_small() {
        let results = run_batch(small(6).with_seed(100)).unwrap();

        assert_eq!(results.duels.len(), 6);
        assert_eq!(results.summary.total_duels, 6);
        let seeds: Vec<u64> = results.duels.iter().map(|d| d.seed).collect();
        assert_eq!(seeds, (100..106).collect::<Vec<_>>());
    }

    #[test]
    fn test_batch_matches_across_pool_sizes() {
        let serial = run_batch(small(4).with_parallel(1)).unwrap();
        let parallel = run_batch(small(4).with_parallel(3)).unwrap();
        assert_eq!(serial.duels, parallel.duels);
    }

    #[test]
    fn test_batch_results_save_load() {
        let results = run_batch(small(3)).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("results.json");

        results.save(&path).unwrap();
        assert!(path.exists());

        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.duels.len(), 3);
        assert_eq!(loaded.summary.total_duels, results.summary.total_duels);
        assert_eq!(loaded.summary.wins_red, results.summary.wins_red);
        assert_eq!(loaded.config.red.name, "Aldric");
    }
}
