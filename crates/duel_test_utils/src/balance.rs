//! Matchup statistics for balance tests.
//!
//! Runs a configuration pair over a range of seeds and tallies the
//! outcomes, so tests can assert that no preset is hopelessly dominant.

use duel_core::config::FighterConfig;
use duel_core::simulation::{Duel, DuelOutcome, BLUE, RED};

use crate::fixtures::duel_between;

/// Result of one seeded duel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuelResult {
    /// How it ended, or `None` if the tick budget ran out first.
    pub outcome: Option<DuelOutcome>,
    /// Ticks elapsed.
    pub ticks: u64,
    /// Red's remaining health fraction.
    pub red_health: f32,
    /// Blue's remaining health fraction.
    pub blue_health: f32,
}

impl DuelResult {
    /// Summarize a finished (or abandoned) duel.
    #[must_use]
    pub fn from_duel(duel: &Duel) -> Self {
        let [red, blue] = duel.fighters();
        Self {
            outcome: duel.outcome(),
            ticks: duel.tick(),
            red_health: red.health_fraction(),
            blue_health: blue.health_fraction(),
        }
    }
}

/// Statistics for a set of duels.
#[derive(Debug, Clone, Default)]
pub struct MatchupStats {
    /// Total duels run.
    pub total: u32,
    /// Wins for red.
    pub wins_red: u32,
    /// Wins for blue.
    pub wins_blue: u32,
    /// Draws and unfinished duels.
    pub draws: u32,
    /// Average ticks to resolution.
    pub avg_ticks: f64,
}

impl MatchupStats {
    /// Tally a list of results.
    #[must_use]
    pub fn from_results(results: &[DuelResult]) -> Self {
        let mut stats = Self {
            total: results.len() as u32,
            ..Self::default()
        };
        for result in results {
            match result.outcome.and_then(|o| o.winner()) {
                Some(RED) => stats.wins_red += 1,
                Some(BLUE) => stats.wins_blue += 1,
                _ => stats.draws += 1,
            }
        }
        if !results.is_empty() {
            let ticks: u64 = results.iter().map(|r| r.ticks).sum();
            stats.avg_ticks = ticks as f64 / results.len() as f64;
        }
        stats
    }

    /// Win rate for red (0.0 to 1.0).
    pub fn win_rate_red(&self) -> f64 {
        if self.total == 0 {
            return 0.5;
        }
        self.wins_red as f64 / self.total as f64
    }

    /// Win rate for blue (0.0 to 1.0).
    pub fn win_rate_blue(&self) -> f64 {
        if self.total == 0 {
            return 0.5;
        }
        self.wins_blue as f64 / self.total as f64
    }

    /// Check if the matchup is within an acceptable range for red.
    pub fn is_balanced(&self, min_rate: f64, max_rate: f64) -> bool {
        let rate = self.win_rate_red();
        rate >= min_rate && rate <= max_rate
    }
}

/// Run `red` vs `blue` once per seed in `seeds`, each for at most
/// `max_ticks` fixed steps.
pub fn run_matchup(
    red: &FighterConfig,
    blue: &FighterConfig,
    seeds: impl IntoIterator<Item = u64>,
    max_ticks: u64,
) -> MatchupStats {
    let results: Vec<DuelResult> = seeds
        .into_iter()
        .map(|seed| {
            let mut duel = duel_between(red, blue, seed);
            duel.run(max_ticks);
            DuelResult::from_duel(&duel)
        })
        .collect();
    MatchupStats::from_results(&results)
}
