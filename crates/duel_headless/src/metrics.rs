//! Duel metrics collection for balance analysis.
//!
//! One [`DuelMetrics`] per duel, aggregated into a [`BatchSummary`].

use serde::{Deserialize, Serialize};

use duel_core::fighter::Fighter;
use duel_core::simulation::{Duel, DuelOutcome, BLUE, RED};

/// Which corner of the duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// First fighter.
    Red,
    /// Second fighter.
    Blue,
}

impl Side {
    /// Side of a fighter id.
    #[must_use]
    pub const fn of(id: u32) -> Option<Self> {
        match id {
            RED => Some(Self::Red),
            BLUE => Some(Self::Blue),
            _ => None,
        }
    }
}

/// How a duel ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    /// A fighter died.
    Knockout,
    /// Time ran out.
    Timeout,
    /// The tick budget ran out first.
    Unfinished,
}

/// Per-fighter metrics at the end of a duel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FighterMetrics {
    /// Display name.
    pub name: String,
    /// Class name.
    pub class_name: String,
    /// Derived archetype.
    pub archetype: String,
    /// Health left.
    pub health: f32,
    /// Health left as a fraction of maximum.
    pub health_fraction: f32,
    /// Total damage dealt, including DoT.
    pub damage_dealt: f32,
    /// Total damage taken.
    pub damage_taken: f32,
    /// Successful hits.
    pub hits_landed: u32,
    /// Critical hits.
    pub crits: u32,
    /// Skills cast.
    pub skills_cast: u32,
    /// Weapon clashes.
    pub clashes: u32,
    /// Hits evaded.
    pub evasions: u32,
    /// Damage soaked by shields.
    pub shield_absorbed: f32,
    /// Health restored.
    pub healed: f32,
}

impl FighterMetrics {
    fn collect(fighter: &Fighter, archetype: String) -> Self {
        let stats = &fighter.stats;
        Self {
            name: fighter.name.clone(),
            class_name: fighter.class_name.clone(),
            archetype,
            health: fighter.health,
            health_fraction: fighter.health_fraction(),
            damage_dealt: stats.damage_dealt,
            damage_taken: stats.damage_taken,
            hits_landed: stats.hits_landed,
            crits: stats.crits,
            skills_cast: stats.skills_cast,
            clashes: stats.clashes,
            evasions: stats.evasions,
            shield_absorbed: stats.shield_absorbed,
            healed: stats.healed,
        }
    }
}

/// Complete metrics for a single duel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuelMetrics {
    /// Seed used.
    pub seed: u64,
    /// Ticks simulated.
    pub ticks: u64,
    /// Simulated seconds.
    pub duration_secs: f32,
    /// How the duel ended.
    pub end: EndReason,
    /// Winning side (None = draw or unfinished).
    pub winner: Option<Side>,
    /// Red then blue.
    pub fighters: [FighterMetrics; 2],
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl DuelMetrics {
    /// Collect metrics from a duel in its current state.
    #[must_use]
    pub fn collect(duel: &Duel) -> Self {
        let outcome = duel.outcome();
        let end = match outcome {
            Some(DuelOutcome::Knockout { .. }) => EndReason::Knockout,
            Some(DuelOutcome::Timeout { .. }) => EndReason::Timeout,
            None => EndReason::Unfinished,
        };
        let [red, blue] = duel.fighters();
        let [red_brain, blue_brain] = duel.brains();
        Self {
            seed: duel.seed(),
            ticks: duel.tick(),
            duration_secs: duel.time(),
            end,
            winner: outcome.and_then(|o| o.winner()).and_then(Side::of),
            fighters: [
                FighterMetrics::collect(red, format!("{:?}", red_brain.persona().archetype)),
                FighterMetrics::collect(blue, format!("{:?}", blue_brain.persona().archetype)),
            ],
            final_state_hash: duel.state_hash(),
        }
    }

    /// Metrics for one side.
    #[must_use]
    pub const fn fighter(&self, side: Side) -> &FighterMetrics {
        match side {
            Side::Red => &self.fighters[0],
            Side::Blue => &self.fighters[1],
        }
    }
}

/// Aggregate statistics for a batch of duels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total duels played.
    pub total_duels: u32,
    /// Duels won by red.
    pub wins_red: u32,
    /// Duels won by blue.
    pub wins_blue: u32,
    /// Draws and unfinished duels.
    pub draws: u32,
    /// Red's win rate.
    pub win_rate_red: f64,
    /// Blue's win rate.
    pub win_rate_blue: f64,
    /// Duels ended by knockout.
    pub knockouts: u32,
    /// Average duel duration in ticks.
    pub avg_duration_ticks: f64,
    /// Shortest duel.
    pub min_duration_ticks: u64,
    /// Longest duel.
    pub max_duration_ticks: u64,
    /// Average damage dealt by red.
    pub avg_damage_red: f64,
    /// Average damage dealt by blue.
    pub avg_damage_blue: f64,
}

impl BatchSummary {
    /// Calculate summary from a list of duel metrics.
    #[must_use]
    pub fn from_duels(duels: &[DuelMetrics]) -> Self {
        if duels.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            total_duels: duels.len() as u32,
            min_duration_ticks: u64::MAX,
            ..Default::default()
        };

        let mut duration_sum = 0u64;
        let mut damage_red = 0.0f64;
        let mut damage_blue = 0.0f64;

        for duel in duels {
            duration_sum += duel.ticks;
            summary.min_duration_ticks = summary.min_duration_ticks.min(duel.ticks);
            summary.max_duration_ticks = summary.max_duration_ticks.max(duel.ticks);

            match duel.winner {
                Some(Side::Red) => summary.wins_red += 1,
                Some(Side::Blue) => summary.wins_blue += 1,
                None => summary.draws += 1,
            }
            if duel.end == EndReason::Knockout {
                summary.knockouts += 1;
            }

            damage_red += f64::from(duel.fighter(Side::Red).damage_dealt);
            damage_blue += f64::from(duel.fighter(Side::Blue).damage_dealt);
        }

        let count = duels.len() as f64;
        summary.win_rate_red = f64::from(summary.wins_red) / count;
        summary.win_rate_blue = f64::from(summary.wins_blue) / count;
        summary.avg_duration_ticks = duration_sum as f64 / count;
        summary.avg_damage_red = damage_red / count;
        summary.avg_damage_blue = damage_blue / count;
        summary
    }
}
