//! Spatial awareness: per-fighter perception of walls, obstacles and free
//! paths, recomputed on a fixed cadence.
//!
//! The arena is injected at construction and only ever queried. Each
//! recomputation runs five pure steps:
//!
//! 1. Nearest wall distance and side.
//! 2. Nearest obstacle by edge distance.
//! 3. Four point probes (front/back/left/right relative to the opponent).
//! 4. Cornered and opponent-cornered flags.
//! 5. Tactical posture.

use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::arena::{Arena, ObstacleId, WallSide};
use crate::math::Vec2;

/// Seconds between recomputations.
pub const RECOMPUTE_INTERVAL: f32 = 0.2;
/// Look-ahead distance of the four probes.
pub const PROBE_DISTANCE: f32 = 1.5;
/// Wall distance under which two blocked probes mean cornered.
pub const CORNER_WALL_DISTANCE: f32 = 1.5;
/// Opponent wall distance under which the opponent counts as cornered.
pub const OPPONENT_CORNERED_DISTANCE: f32 = 2.0;
/// Wall distance under which the posture is near-wall.
pub const NEAR_WALL_DISTANCE: f32 = 2.5;
/// Distance under which a cornered opponent gives the advantage posture.
pub const ADVANTAGE_DISTANCE: f32 = 4.0;
/// Extra clearance a steered direction must keep from the bounds.
pub const INTERIOR_MARGIN: f32 = 0.5;

const ADJUST_OFFSETS_DEG: [f32; 8] = [30.0, -30.0, 60.0, -60.0, 90.0, -90.0, 120.0, -120.0];

/// Probe direction relative to the opponent bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeDir {
    /// Towards the opponent.
    Front,
    /// Away from the opponent.
    Back,
    /// Counter-clockwise of the opponent bearing.
    Left,
    /// Clockwise of the opponent bearing.
    Right,
}

impl ProbeDir {
    /// All directions in probe order.
    pub const ALL: [Self; 4] = [Self::Front, Self::Back, Self::Left, Self::Right];

    /// Offset from the opponent bearing.
    #[must_use]
    pub const fn offset(self) -> f32 {
        match self {
            Self::Front => 0.0,
            Self::Back => PI,
            Self::Left => FRAC_PI_2,
            Self::Right => -FRAC_PI_2,
        }
    }
}

/// Free-path probe results (`true` = free).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Probes {
    /// Towards the opponent.
    pub front: bool,
    /// Away from the opponent.
    pub back: bool,
    /// Left of the opponent bearing.
    pub left: bool,
    /// Right of the opponent bearing.
    pub right: bool,
}

impl Default for Probes {
    fn default() -> Self {
        Self {
            front: true,
            back: true,
            left: true,
            right: true,
        }
    }
}

impl Probes {
    /// Whether the probe in `dir` is free.
    #[must_use]
    pub const fn is_free(&self, dir: ProbeDir) -> bool {
        match dir {
            ProbeDir::Front => self.front,
            ProbeDir::Back => self.back,
            ProbeDir::Left => self.left,
            ProbeDir::Right => self.right,
        }
    }

    /// Number of blocked probes.
    #[must_use]
    pub fn blocked_count(&self) -> usize {
        ProbeDir::ALL.iter().filter(|d| !self.is_free(**d)).count()
    }

    /// First free direction in probe order.
    #[must_use]
    pub fn first_free(&self) -> Option<ProbeDir> {
        ProbeDir::ALL.into_iter().find(|d| self.is_free(*d))
    }
}

/// Coarse tactical situation, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Posture {
    /// Too few escape routes.
    Cornered,
    /// Close to a wall.
    NearWall,
    /// The opponent is cornered and close.
    Advantage,
    /// Nothing notable.
    #[default]
    Neutral,
}

/// Whether a fighter is cornered.
///
/// Cornered when close to a wall with at least two blocked probes, or with
/// three or more blocked probes anywhere.
#[must_use]
pub fn is_cornered(wall_distance: f32, blocked: usize) -> bool {
    (wall_distance < CORNER_WALL_DISTANCE && blocked >= 2) || blocked >= 3
}

/// Posture in priority order: cornered, near-wall, advantage, neutral.
#[must_use]
pub fn classify_posture(
    cornered: bool,
    wall_distance: f32,
    opponent_cornered: bool,
    opponent_distance: f32,
) -> Posture {
    if cornered {
        Posture::Cornered
    } else if wall_distance < NEAR_WALL_DISTANCE {
        Posture::NearWall
    } else if opponent_cornered && opponent_distance < ADVANTAGE_DISTANCE {
        Posture::Advantage
    } else {
        Posture::Neutral
    }
}

/// Last perception snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AwarenessState {
    /// Distance to the nearest boundary.
    pub wall_distance: f32,
    /// Which boundary.
    pub wall_side: WallSide,
    /// Nearest obstacle and its edge distance.
    pub nearest_obstacle: Option<(ObstacleId, f32)>,
    /// Probe results.
    pub probes: Probes,
    /// Bearing the probes were cast relative to.
    pub opponent_bearing: f32,
    /// Distance to the opponent.
    pub opponent_distance: f32,
    /// This fighter is cornered.
    pub cornered: bool,
    /// The opponent is cornered.
    pub opponent_cornered: bool,
    /// Derived posture.
    pub posture: Posture,
}

impl Default for AwarenessState {
    fn default() -> Self {
        Self {
            wall_distance: f32::INFINITY,
            wall_side: WallSide::default(),
            nearest_obstacle: None,
            probes: Probes::default(),
            opponent_bearing: 0.0,
            opponent_distance: f32::INFINITY,
            cornered: false,
            opponent_cornered: false,
            posture: Posture::Neutral,
        }
    }
}

/// Modifiers consumed by the movement layer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TacticalModifiers {
    /// Prefer sideways movement.
    pub force_lateral: bool,
    /// Do not back away.
    pub avoid_retreat: bool,
    /// Extra aggression in `[0, 1]`.
    pub pressure_bonus: f32,
    /// Preferred escape bearing when cornered.
    pub escape_bearing: Option<f32>,
}

/// Per-fighter perception of the arena.
#[derive(Debug, Clone)]
pub struct SpatialAwareness {
    arena: Arc<dyn Arena>,
    timer: f32,
    state: AwarenessState,
}

impl SpatialAwareness {
    /// Create with an injected arena. The first update recomputes immediately.
    #[must_use]
    pub fn new(arena: Arc<dyn Arena>) -> Self {
        Self {
            arena,
            timer: 0.0,
            state: AwarenessState::default(),
        }
    }

    /// The arena being perceived.
    #[must_use]
    pub fn arena(&self) -> &dyn Arena {
        self.arena.as_ref()
    }

    /// Last snapshot.
    #[must_use]
    pub const fn state(&self) -> &AwarenessState {
        &self.state
    }

    /// Count the cadence timer down and recompute when it expires.
    /// Returns whether a recomputation happened.
    pub fn update(&mut self, dt: f32, me: Vec2, radius: f32, opponent: Vec2) -> bool {
        self.timer -= dt;
        if self.timer > 0.0 {
            return false;
        }
        self.timer = RECOMPUTE_INTERVAL;
        self.recompute(me, radius, opponent);
        true
    }

    /// Recompute the snapshot now.
    pub fn recompute(&mut self, me: Vec2, radius: f32, opponent: Vec2) {
        let bounds = self.arena.bounds();
        let (wall_distance, wall_side) = bounds.nearest_wall(me);

        let nearest_obstacle = self
            .arena
            .obstacles()
            .iter()
            .map(|o| (o.id, o.edge_distance(me)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let opponent_bearing = me.bearing_to(opponent);
        let probe = |dir: ProbeDir| {
            let point = me + Vec2::from_angle(opponent_bearing + dir.offset()) * PROBE_DISTANCE;
            !self.arena.is_blocked(point, radius)
        };
        let probes = Probes {
            front: probe(ProbeDir::Front),
            back: probe(ProbeDir::Back),
            left: probe(ProbeDir::Left),
            right: probe(ProbeDir::Right),
        };

        let cornered = is_cornered(wall_distance, probes.blocked_count());
        let opponent_cornered = bounds.nearest_wall(opponent).0 < OPPONENT_CORNERED_DISTANCE;
        let opponent_distance = me.distance(opponent);
        let posture = classify_posture(cornered, wall_distance, opponent_cornered, opponent_distance);

        self.state = AwarenessState {
            wall_distance,
            wall_side,
            nearest_obstacle,
            probes,
            opponent_bearing,
            opponent_distance,
            cornered,
            opponent_cornered,
            posture,
        };
        tracing::trace!(
            wall_distance,
            blocked = probes.blocked_count(),
            cornered,
            opponent_cornered,
            ?posture,
            "Awareness recomputed"
        );
    }

    /// Tactical modifiers from the current snapshot.
    #[must_use]
    pub fn evaluate_tactics(&self, predator: bool) -> TacticalModifiers {
        let state = &self.state;
        let boxed_in = state.cornered || !state.probes.back;
        let pressure_bonus = match (state.opponent_cornered, predator) {
            (true, true) => 0.5,
            (true, false) => 0.25,
            (false, _) => 0.0,
        };
        let escape_bearing = if state.cornered {
            state
                .probes
                .first_free()
                .map(|dir| state.opponent_bearing + dir.offset())
        } else {
            None
        };
        TacticalModifiers {
            force_lateral: boxed_in,
            avoid_retreat: boxed_in,
            pressure_bonus,
            escape_bearing,
        }
    }

    /// Steer a movement bearing around obstacles and walls.
    ///
    /// Keeps `target_bearing` if its probe is clear, otherwise tries offsets
    /// of ±30°, ±60°, ±90°, ±120° in order. If nothing clears, returns the
    /// original bearing unchanged.
    #[must_use]
    pub fn adjust_direction(&self, target_bearing: f32, position: Vec2, radius: f32) -> f32 {
        if self.is_clear(target_bearing, position, radius) {
            return target_bearing;
        }
        ADJUST_OFFSETS_DEG
            .iter()
            .map(|deg| target_bearing + deg.to_radians())
            .find(|bearing| self.is_clear(*bearing, position, radius))
            .unwrap_or(target_bearing)
    }

    fn is_clear(&self, bearing: f32, position: Vec2, radius: f32) -> bool {
        let point = position + Vec2::from_angle(bearing) * PROBE_DISTANCE;
        !self.arena.is_blocked(point, radius)
            && self.arena.bounds().contains(point, radius + INTERIOR_MARGIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::BoxArena;
    use crate::math::angle_difference;

    #[test]
    fn test_cornered_rule() {
        assert!(is_cornered(1.0, 2));
        assert!(is_cornered(10.0, 3));
        assert!(!is_cornered(3.0, 1));
        assert!(!is_cornered(3.0, 2));
        assert!(!is_cornered(1.0, 1));
    }

    #[test]
    fn test_posture_priority() {
        assert_eq!(classify_posture(true, 0.5, true, 1.0), Posture::Cornered);
        assert_eq!(classify_posture(false, 2.0, true, 1.0), Posture::NearWall);
        assert_eq!(classify_posture(false, 5.0, true, 3.0), Posture::Advantage);
        assert_eq!(classify_posture(false, 5.0, true, 6.0), Posture::Neutral);
    }

    #[test]
    fn test_open_centre_is_neutral() {
        let mut awareness = SpatialAwareness::new(Arc::new(BoxArena::open(30.0, 30.0)));
        assert!(awareness.update(0.016, Vec2::ZERO, 0.5, Vec2::new(3.0, 0.0)));
        let state = awareness.state();
        assert_eq!(state.probes.blocked_count(), 0);
        assert!(!state.cornered);
        assert_eq!(state.posture, Posture::Neutral);
    }

    #[test]
    fn test_corner_is_detected() {
        let mut awareness = SpatialAwareness::new(Arc::new(BoxArena::open(10.0, 10.0)));
        // Backed into the north-east corner, opponent to the south-west
        awareness.recompute(Vec2::new(4.2, 4.2), 0.5, Vec2::new(0.0, 0.0));
        let state = *awareness.state();
        assert!(state.cornered);
        assert_eq!(state.posture, Posture::Cornered);

        let tactics = awareness.evaluate_tactics(false);
        assert!(tactics.force_lateral);
        assert!(tactics.avoid_retreat);
        let escape = tactics.escape_bearing.unwrap();
        assert!(angle_difference(escape, state.opponent_bearing).abs() < 1e-4);
    }

    #[test]
    fn test_cadence_gates_recompute() {
        let mut awareness = SpatialAwareness::new(Arc::new(BoxArena::open(30.0, 30.0)));
        assert!(awareness.update(0.05, Vec2::ZERO, 0.5, Vec2::new(2.0, 0.0)));
        assert!(!awareness.update(0.05, Vec2::ZERO, 0.5, Vec2::new(2.0, 0.0)));
        assert!(!awareness.update(0.05, Vec2::ZERO, 0.5, Vec2::new(2.0, 0.0)));
        assert!(!awareness.update(0.05, Vec2::ZERO, 0.5, Vec2::new(2.0, 0.0)));
        assert!(awareness.update(0.06, Vec2::ZERO, 0.5, Vec2::new(2.0, 0.0)));
    }

    #[test]
    fn test_predator_pressure() {
        let mut awareness = SpatialAwareness::new(Arc::new(BoxArena::open(20.0, 20.0)));
        awareness.recompute(Vec2::new(6.0, 0.0), 0.5, Vec2::new(9.0, 0.0));
        assert!(awareness.state().opponent_cornered);
        assert_eq!(awareness.state().posture, Posture::Advantage);
        assert!(awareness.evaluate_tactics(true).pressure_bonus > awareness.evaluate_tactics(false).pressure_bonus);
    }

    #[test]
    fn test_adjust_direction_steers_around_obstacle() {
        let arena = BoxArena::open(30.0, 30.0).with_obstacle(Vec2::new(1.5, 0.0), 0.6);
        let awareness = SpatialAwareness::new(Arc::new(arena));
        let bearing = awareness.adjust_direction(0.0, Vec2::ZERO, 0.5);
        assert!(bearing.abs() > 0.1);
        // Clear bearings are kept
        assert_eq!(awareness.adjust_direction(PI / 2.0, Vec2::ZERO, 0.5), PI / 2.0);
    }

    #[test]
    fn test_adjust_direction_gives_up_unchanged() {
        // Arena barely larger than the fighter: nothing clears
        let awareness = SpatialAwareness::new(Arc::new(BoxArena::open(1.2, 1.2)));
        assert_eq!(awareness.adjust_direction(0.7, Vec2::ZERO, 0.5), 0.7);
    }
}
