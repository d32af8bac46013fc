//! Movement decisions: the tactical action state machine and steering.
//!
//! [`decide_action`] runs whenever the brain's re-decision timer expires.
//! Global overrides come first, then the archetype's rules, then trait and
//! emotion conversions. [`steer`] turns the current action into an
//! [`Intent`] every tick.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, PI};

use serde::{Deserialize, Serialize};

use crate::awareness::{SpatialAwareness, TacticalModifiers};
use crate::fighter::{Fighter, Intent};
use crate::math::Vec2;
use crate::rng::{roll, DuelRng};

use super::archetype::{Archetype, Trait};
use super::{Persona, Situation};

/// Stamina below which the fighter backs off to recover.
pub const STAMINA_FLOOR: f32 = 15.0;
/// Fear above which the fighter flees.
pub const FEAR_FLEE_THRESHOLD: f32 = 70.0;
/// Rage above which passive actions become approaches.
pub const RAGE_THRESHOLD: f32 = 60.0;

const AGGRESSIVE_TRAIT_CONVERSION: f32 = 0.4;
const CALCULATING_CONVERSION: f32 = 0.3;

/// Closed set of tactical actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Action {
    /// Close in at full speed.
    #[default]
    Approach,
    /// Close in carefully.
    ApproachSlow,
    /// Back away.
    Retreat,
    /// Run.
    Flee,
    /// Strafe around the opponent at ideal range.
    Circle,
    /// Close in on a diagonal.
    Flank,
    /// Hold the ideal range and jab.
    Poke,
    /// Guard and give ground slowly.
    Block,
    /// Heavy advance.
    Crush,
    /// All-out attack.
    Kill,
    /// Standard melee exchange at ideal range.
    Combat,
    /// Stand still.
    Hold,
    /// Move towards open space.
    Reposition,
}

impl Action {
    /// Actions aggressive traits may convert into an approach.
    #[must_use]
    pub const fn is_passive(self) -> bool {
        matches!(self, Self::Circle | Self::Block | Self::Hold)
    }

    /// Actions calculating fighters may temper.
    #[must_use]
    pub const fn is_all_out(self) -> bool {
        matches!(self, Self::Kill | Self::Crush)
    }

    const fn is_pressing(self) -> bool {
        matches!(
            self,
            Self::Approach | Self::Flank | Self::Crush | Self::Kill
        )
    }
}

/// Overrides that beat every archetype rule, in priority order:
/// exhaustion, fear, adrenaline.
#[must_use]
pub fn global_override(s: &Situation) -> Option<Action> {
    if s.stamina < STAMINA_FLOOR {
        Some(Action::Retreat)
    } else if s.fear > FEAR_FLEE_THRESHOLD {
        Some(Action::Flee)
    } else if s.adrenaline {
        Some(Action::Kill)
    } else {
        None
    }
}

/// Archetype-specific transition rules.
pub fn archetype_action(persona: &Persona, s: &Situation, rng: &mut DuelRng) -> Action {
    let ideal = persona.ideal_range.max(0.1);
    let d = s.distance;
    match persona.archetype {
        Archetype::Mage => {
            if d < ideal * 0.45 {
                Action::Flee
            } else if d < ideal * 0.8 {
                Action::Retreat
            } else if d <= ideal * 1.15 {
                Action::Circle
            } else if d <= ideal * 1.6 {
                Action::Hold
            } else {
                Action::ApproachSlow
            }
        }
        Archetype::Assassin => {
            if d > ideal * 3.0 {
                Action::Flank
            } else if d > ideal * 1.2 {
                Action::Approach
            } else if s.health_fraction < 0.5 && roll(rng, 0.3) {
                Action::Circle
            } else {
                Action::Combat
            }
        }
        Archetype::Sentinel => {
            if d > ideal * 1.8 {
                Action::ApproachSlow
            } else if d < ideal * 0.6 || roll(rng, 0.25) {
                Action::Block
            } else {
                Action::Combat
            }
        }
        Archetype::Colossus => {
            if d > ideal * 1.3 {
                Action::ApproachSlow
            } else {
                Action::Crush
            }
        }
        Archetype::Spearman => {
            if d > ideal * 1.3 {
                Action::Approach
            } else if d < ideal * 0.7 {
                Action::Retreat
            } else if roll(rng, 0.6) {
                Action::Poke
            } else {
                Action::Circle
            }
        }
        Archetype::Warrior => {
            if d > ideal * 1.5 {
                Action::Approach
            } else if roll(rng, 0.6) {
                Action::Combat
            } else if roll(rng, 0.6) {
                Action::Circle
            } else {
                Action::Flank
            }
        }
        Archetype::Berserker => {
            if d > ideal * 1.2 {
                Action::Approach
            } else if s.health_fraction < 0.4 {
                Action::Kill
            } else if s.health_fraction < 0.7 {
                Action::Crush
            } else {
                Action::Combat
            }
        }
        Archetype::Brawler => {
            if d > ideal * 1.5 {
                Action::Approach
            } else {
                Action::Combat
            }
        }
    }
}

/// Trait, emotion and posture conversions applied after the archetype rules.
pub fn apply_modifiers(
    action: Action,
    persona: &Persona,
    s: &Situation,
    tactics: &TacticalModifiers,
    rng: &mut DuelRng,
) -> Action {
    let mut action = action;
    let aggressive_trait = persona.traits.iter().any(|t| t.is_aggressive());

    if action.is_passive()
        && (s.rage > RAGE_THRESHOLD
            || (aggressive_trait && roll(rng, AGGRESSIVE_TRAIT_CONVERSION))
            || roll(rng, tactics.pressure_bonus))
    {
        action = Action::Approach;
    }
    if action.is_all_out()
        && persona.has_trait(Trait::Calculating)
        && roll(rng, CALCULATING_CONVERSION)
    {
        action = Action::Circle;
    }
    if tactics.escape_bearing.is_some()
        && matches!(action, Action::Retreat | Action::Hold | Action::Block)
    {
        action = Action::Reposition;
    }
    action
}

/// Full decision: overrides, then archetype rules, then modifiers.
pub fn decide_action(
    persona: &Persona,
    s: &Situation,
    tactics: &TacticalModifiers,
    rng: &mut DuelRng,
) -> Action {
    if let Some(action) = global_override(s) {
        return action;
    }
    let action = archetype_action(persona, s, rng);
    apply_modifiers(action, persona, s, tactics, rng)
}

/// Turn an action into this tick's intent.
#[must_use]
pub fn steer(
    action: Action,
    persona: &Persona,
    s: &Situation,
    tactics: &TacticalModifiers,
    me: &Fighter,
    awareness: &SpatialAwareness,
    strafe_sign: f32,
) -> Intent {
    let ideal = persona.ideal_range.max(0.1);
    let d = s.distance;
    let toward = s.bearing;
    let lateral = s.bearing + strafe_sign * FRAC_PI_2;
    // With the back probe blocked every backing move slides sideways instead
    let away = if tactics.force_lateral {
        lateral
    } else {
        s.bearing + PI
    };
    let in_reach = s.in_reach();

    let (bearing, mut speed, attack) = match action {
        Action::Approach => (Some(toward), 1.0, in_reach),
        Action::ApproachSlow => (Some(toward), 0.5, in_reach),
        Action::Retreat if tactics.avoid_retreat => (Some(lateral), 0.8, in_reach),
        Action::Retreat => (Some(away), 0.8, in_reach),
        Action::Flee => (Some(tactics.escape_bearing.unwrap_or(away)), 1.2, false),
        Action::Circle => {
            let heading = if d > ideal * 1.2 {
                s.bearing + strafe_sign * FRAC_PI_3
            } else if d < ideal * 0.8 {
                s.bearing + strafe_sign * 2.0 * FRAC_PI_3
            } else {
                lateral
            };
            (Some(heading), 0.7, in_reach)
        }
        Action::Flank => (Some(s.bearing + strafe_sign * FRAC_PI_3), 1.0, in_reach),
        Action::Poke => {
            if d > ideal {
                (Some(toward), 0.8, in_reach)
            } else if d < ideal * 0.8 {
                (Some(away), 0.6, in_reach)
            } else {
                (None, 0.0, in_reach)
            }
        }
        Action::Block => (Some(away), 0.25, false),
        Action::Crush => (Some(toward), 1.1, in_reach),
        Action::Kill => (Some(toward), 1.3, d <= s.melee_reach * 1.1),
        Action::Combat => {
            if d > ideal * 1.1 {
                (Some(toward), 0.9, in_reach)
            } else if d < ideal * 0.7 {
                (Some(away), 0.6, in_reach)
            } else {
                (Some(lateral), 0.4, in_reach)
            }
        }
        Action::Hold => (None, 0.0, in_reach),
        Action::Reposition => (
            Some(tactics.escape_bearing.unwrap_or(s.center_bearing)),
            1.0,
            false,
        ),
    };

    if action.is_pressing() {
        speed *= 1.0 + tactics.pressure_bonus;
    }
    let movement = bearing.map_or(Vec2::ZERO, |b| {
        Vec2::from_angle(awareness.adjust_direction(b, me.position, me.radius))
    });

    Intent {
        movement,
        speed_factor: speed,
        face: Some(s.bearing),
        attack,
        hop: false,
        cast: None,
    }
}
