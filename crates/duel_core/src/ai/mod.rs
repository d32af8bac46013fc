//! Decision engine: a per-fighter [`Brain`] that reads both fighters and the
//! arena and emits an [`Intent`] every step.
//!
//! A brain owns a fixed persona (archetype, two traits, ideal range), a set
//! of emotions (fear and rage that decay over time, adrenaline that latches
//! once), a current tactical [`Action`] re-decided on a randomized cadence,
//! and its own [`SpatialAwareness`]. All randomness comes from the brain's
//! own seeded stream.

mod archetype;
mod movement;
mod skill_usage;

pub use archetype::{
    derive_archetype, sample_traits, Archetype, Trait, CASTER_IDEAL_RANGE, UNARMED_IDEAL_RANGE,
};
pub use movement::{
    apply_modifiers, archetype_action, decide_action, global_override, steer, Action,
    FEAR_FLEE_THRESHOLD, RAGE_THRESHOLD, STAMINA_FLOOR,
};
pub use skill_usage::{choose_skill, SkillChoice};

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::awareness::{SpatialAwareness, TacticalModifiers};
use crate::fighter::{Fighter, Intent, Pilot};
use crate::math::decay_towards_zero;
use crate::rng::{roll, DuelRng};

// ============================================================================
// Constants
// ============================================================================

/// Emotion ceiling.
pub const MAX_EMOTION: f32 = 100.0;
/// Fear lost per second.
pub const FEAR_DECAY: f32 = 8.0;
/// Rage lost per second.
pub const RAGE_DECAY: f32 = 6.0;
/// Health fraction under which damage also builds fear.
pub const FEAR_HEALTH: f32 = 0.5;
/// Health fraction under which adrenaline latches.
pub const ADRENALINE_HEALTH: f32 = 0.3;
/// Bounds of the randomized re-decision interval, in seconds.
pub const DECISION_INTERVAL: (f32, f32) = (0.2, 0.6);

const RAGE_PER_DAMAGE: f32 = 1.0;
const FEAR_PER_DAMAGE: f32 = 1.5;
const POST_CAST_RETREAT: f32 = 0.4;
const ERRATIC_FLIP_CHANCE: f32 = 0.3;
const ERRATIC_HOP_CHANCE: f32 = 0.01;

// ============================================================================
// Persona and situation
// ============================================================================

/// Fixed personality chosen at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    /// Coarse tactical persona.
    pub archetype: Archetype,
    /// Two distinct traits.
    pub traits: [Trait; 2],
    /// Preferred fighting distance.
    pub ideal_range: f32,
}

impl Persona {
    /// Whether the persona carries `t`.
    #[must_use]
    pub fn has_trait(&self, t: Trait) -> bool {
        self.traits.contains(&t)
    }
}

/// What a brain sees this step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Situation {
    /// Distance to the opponent.
    pub distance: f32,
    /// Bearing to the opponent.
    pub bearing: f32,
    /// Bearing to the arena centre.
    pub center_bearing: f32,
    /// Centre distance at which the weapon reaches the opponent's body.
    pub melee_reach: f32,
    /// Own health fraction.
    pub health_fraction: f32,
    /// Opponent health fraction.
    pub opponent_health_fraction: f32,
    /// Own stamina.
    pub stamina: f32,
    /// Current fear.
    pub fear: f32,
    /// Current rage.
    pub rage: f32,
    /// Adrenaline has latched.
    pub adrenaline: bool,
    /// Escape bearing when cornered.
    pub escape_bearing: Option<f32>,
}

impl Default for Situation {
    fn default() -> Self {
        Self {
            distance: 0.0,
            bearing: 0.0,
            center_bearing: 0.0,
            melee_reach: 0.0,
            health_fraction: 1.0,
            opponent_health_fraction: 1.0,
            stamina: 100.0,
            fear: 0.0,
            rage: 0.0,
            adrenaline: false,
            escape_bearing: None,
        }
    }
}

impl Situation {
    /// Whether the opponent is within weapon reach.
    #[must_use]
    pub fn in_reach(&self) -> bool {
        self.distance <= self.melee_reach
    }
}

// ============================================================================
// Brain
// ============================================================================

/// Per-fighter decision engine.
#[derive(Debug, Clone)]
pub struct Brain {
    awareness: SpatialAwareness,
    rng: DuelRng,
    persona: Persona,
    fear: f32,
    rage: f32,
    adrenaline: bool,
    decision_timer: f32,
    action: Action,
    strafe_sign: f32,
    last_health: Option<f32>,
}

impl Brain {
    /// Build a brain for `fighter`, deriving its persona from class and
    /// weapon and sampling traits from `rng`.
    #[must_use]
    pub fn new(fighter: &Fighter, arena: Arc<dyn Arena>, mut rng: DuelRng) -> Self {
        let (archetype, base_range) = derive_archetype(
            &fighter.class_name,
            fighter.weapon.as_ref(),
            fighter.scale,
            fighter.radius,
        );
        let traits = sample_traits(&mut rng);
        let ideal_range = traits
            .iter()
            .fold(base_range, |range, t| range * t.range_multiplier());
        let strafe_sign = if rng.gen::<bool>() { 1.0 } else { -1.0 };

        tracing::debug!(
            fighter = fighter.id,
            ?archetype,
            ?traits,
            ideal_range,
            "Brain created"
        );

        Self {
            awareness: SpatialAwareness::new(arena),
            rng,
            persona: Persona {
                archetype,
                traits,
                ideal_range,
            },
            fear: 0.0,
            rage: 0.0,
            adrenaline: false,
            decision_timer: 0.0,
            action: Action::default(),
            strafe_sign,
            last_health: None,
        }
    }

    /// Fixed personality.
    #[must_use]
    pub const fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Current tactical action.
    #[must_use]
    pub const fn action(&self) -> Action {
        self.action
    }

    /// Current fear.
    #[must_use]
    pub const fn fear(&self) -> f32 {
        self.fear
    }

    /// Current rage.
    #[must_use]
    pub const fn rage(&self) -> f32 {
        self.rage
    }

    /// Whether adrenaline has latched.
    #[must_use]
    pub const fn adrenaline(&self) -> bool {
        self.adrenaline
    }

    /// Spatial perception.
    #[must_use]
    pub const fn awareness(&self) -> &SpatialAwareness {
        &self.awareness
    }

    /// Feed damage taken into the emotions.
    pub fn register_damage(&mut self, amount: f32, health_fraction: f32) {
        if amount.is_nan() || amount <= 0.0 {
            return;
        }
        let rage_gain: f32 = self.persona.traits.iter().map(|t| t.rage_gain()).product();
        self.rage = (self.rage + amount * RAGE_PER_DAMAGE * rage_gain).min(MAX_EMOTION);
        if health_fraction < FEAR_HEALTH {
            let fear_gain: f32 = self.persona.traits.iter().map(|t| t.fear_gain()).product();
            self.fear = (self.fear + amount * FEAR_PER_DAMAGE * fear_gain).min(MAX_EMOTION);
        }
    }

    fn update_emotions(&mut self, dt: f32, me: &Fighter) {
        self.fear = decay_towards_zero(self.fear, FEAR_DECAY * dt);
        self.rage = decay_towards_zero(self.rage, RAGE_DECAY * dt);

        if let Some(last) = self.last_health {
            let lost = last - me.health;
            if lost > 0.0 {
                self.register_damage(lost, me.health_fraction());
            }
        }
        self.last_health = Some(me.health);

        if !self.adrenaline && me.health_fraction() < ADRENALINE_HEALTH {
            self.adrenaline = true;
            tracing::debug!(fighter = me.id, "Adrenaline latched");
        }
    }

    fn situation(&self, me: &Fighter, opponent: &Fighter, tactics: &TacticalModifiers) -> Situation {
        let center = self.awareness.arena().bounds().center();
        Situation {
            distance: me.position.distance(opponent.position),
            bearing: me.position.bearing_to(opponent.position),
            center_bearing: me.position.bearing_to(center),
            melee_reach: me.weapon_reach().max(me.radius) + opponent.radius,
            health_fraction: me.health_fraction(),
            opponent_health_fraction: opponent.health_fraction(),
            stamina: me.stamina,
            fear: self.fear,
            rage: self.rage,
            adrenaline: self.adrenaline,
            escape_bearing: tactics.escape_bearing,
        }
    }

    fn redecide(&mut self, me: &Fighter, situation: &Situation, tactics: &TacticalModifiers) {
        let next = decide_action(&self.persona, situation, tactics, &mut self.rng);
        if next != self.action {
            tracing::trace!(fighter = me.id, from = ?self.action, to = ?next, "Action changed");
        }
        self.action = next;
        let (low, high) = DECISION_INTERVAL;
        self.decision_timer = self.rng.gen_range(low..=high);
        if self.persona.has_trait(Trait::Erratic) && roll(&mut self.rng, ERRATIC_FLIP_CHANCE) {
            self.strafe_sign = -self.strafe_sign;
        }
    }
}

impl Pilot for Brain {
    fn observe(&mut self, dt: f32, me: &Fighter) {
        self.update_emotions(dt, me);
    }

    fn think(&mut self, dt: f32, me: &Fighter, opponent: &Fighter) -> Intent {
        self.awareness
            .update(dt, me.position, me.radius, opponent.position);
        let tactics = self
            .awareness
            .evaluate_tactics(self.persona.has_trait(Trait::Predator));
        let situation = self.situation(me, opponent, &tactics);

        let skill = choose_skill(&self.persona, &situation, me, &mut self.rng);

        self.decision_timer -= dt;
        if self.decision_timer <= 0.0 {
            self.redecide(me, &situation, &tactics);
        }

        let mut intent = steer(
            self.action,
            &self.persona,
            &situation,
            &tactics,
            me,
            &self.awareness,
            self.strafe_sign,
        );
        if self.persona.has_trait(Trait::Erratic) && roll(&mut self.rng, ERRATIC_HOP_CHANCE) {
            intent.hop = true;
        }
        if let Some(choice) = skill {
            intent.cast = Some(choice.slot);
            intent.face = Some(choice.bearing);
        }
        intent
    }

    fn on_cast_result(&mut self, _slot: usize, success: bool) {
        if success && self.persona.archetype == Archetype::Mage {
            self.action = Action::Retreat;
            self.decision_timer = POST_CAST_RETREAT;
        }
    }
}
