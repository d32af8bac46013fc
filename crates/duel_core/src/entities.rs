//! Transient effect entities spawned by skills.
//!
//! Effects live in the duel's [`EffectPool`], not on any fighter. Each one
//! carries a non-owning reference (the owner's [`FighterId`]) for
//! attribution. Lifecycle per tick:
//!
//! 1. [`EffectPool::advance`] moves projectiles, expands areas and counts
//!    lifetimes down. Projectiles that leave the arena or hit an obstacle
//!    are deactivated here.
//! 2. The combat resolver tests active effects against fighters.
//! 3. [`EffectPool::prune`] drops inactive and expired effects.
//!
//! An effect whose lifetime runs out during a tick still gets that tick's
//! resolution, so a beam always fires at least once.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::events::FighterId;
use crate::math::Vec2;
use crate::skills::{EffectTag, SkillDefinition};

/// Unique identifier for an effect within a duel.
pub type EffectId = u32;

/// Who cast an effect and what it does on hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// Fighter credited with the effect.
    pub owner: FighterId,
    /// Originating skill name.
    pub skill: String,
    /// Base damage before the owner's outgoing modifiers.
    pub damage: f32,
    /// Status tag applied on hit.
    pub effect_tag: Option<EffectTag>,
}

impl Payload {
    /// Payload for a skill cast by `owner`.
    #[must_use]
    pub fn from_skill(owner: FighterId, skill: &SkillDefinition) -> Self {
        Self {
            owner,
            skill: skill.name.clone(),
            damage: skill.damage,
            effect_tag: skill.effect_tag,
        }
    }
}

/// Geometry and per-type state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectShape {
    /// Travelling circle consumed on first hit.
    Projectile {
        /// Current position.
        position: Vec2,
        /// Velocity (units/s).
        velocity: Vec2,
        /// Collision radius.
        radius: f32,
        /// Distance travelled so far.
        traveled: f32,
        /// Maximum travel distance.
        range: f32,
    },
    /// Expanding ring that hits each target at most once.
    Area {
        /// Centre.
        center: Vec2,
        /// Current radius.
        radius: f32,
        /// Final radius.
        max_radius: f32,
        /// Seconds to reach the final radius.
        expand_time: f32,
        /// Seconds since spawn.
        elapsed: f32,
        /// Targets already damaged.
        hit: BTreeSet<FighterId>,
    },
    /// Instant line tested once on the tick it fires.
    Beam {
        /// Start point.
        origin: Vec2,
        /// Unit direction.
        direction: Vec2,
        /// Length.
        range: f32,
        /// Thickness.
        width: f32,
        /// Whether the single hit test has run.
        fired: bool,
        /// Whether damage was applied.
        hit_applied: bool,
    },
}

/// An active effect entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    /// Identifier assigned by the pool.
    pub id: EffectId,
    /// Owner and on-hit payload.
    pub payload: Payload,
    /// Seconds until expiry.
    pub lifetime: f32,
    /// Cleared on consumption or when leaving the arena.
    pub active: bool,
    /// Geometry.
    pub shape: EffectShape,
}

impl Effect {
    fn with_shape(payload: Payload, lifetime: f32, shape: EffectShape) -> Self {
        Self {
            id: 0,
            payload,
            lifetime: lifetime.max(0.0),
            active: true,
            shape,
        }
    }

    /// A projectile launched from `origin` with `velocity`.
    #[must_use]
    pub fn projectile(
        payload: Payload,
        origin: Vec2,
        velocity: Vec2,
        radius: f32,
        range: f32,
    ) -> Self {
        let speed = velocity.length();
        let lifetime = if speed > f32::EPSILON {
            range / speed
        } else {
            0.0
        };
        Self::with_shape(
            payload,
            lifetime,
            EffectShape::Projectile {
                position: origin,
                velocity,
                radius,
                traveled: 0.0,
                range,
            },
        )
    }

    /// An area expanding around `center`.
    #[must_use]
    pub fn area(
        payload: Payload,
        center: Vec2,
        max_radius: f32,
        expand_time: f32,
        duration: f32,
    ) -> Self {
        let radius = if expand_time > 0.0 { 0.0 } else { max_radius };
        Self::with_shape(
            payload,
            duration,
            EffectShape::Area {
                center,
                radius,
                max_radius,
                expand_time,
                elapsed: 0.0,
                hit: BTreeSet::new(),
            },
        )
    }

    /// A beam from `origin` along `direction`.
    #[must_use]
    pub fn beam(
        payload: Payload,
        origin: Vec2,
        direction: Vec2,
        range: f32,
        width: f32,
        duration: f32,
    ) -> Self {
        Self::with_shape(
            payload,
            duration,
            EffectShape::Beam {
                origin,
                direction: direction.normalize(),
                range,
                width,
                fired: false,
                hit_applied: false,
            },
        )
    }

    /// Owner of the effect.
    #[must_use]
    pub fn owner(&self) -> FighterId {
        self.payload.owner
    }

    /// Representative position for events.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        match &self.shape {
            EffectShape::Projectile { position, .. } => *position,
            EffectShape::Area { center, .. } => *center,
            EffectShape::Beam { origin, .. } => *origin,
        }
    }

    /// Whether the effect should be removed.
    #[must_use]
    pub fn is_spent(&self) -> bool {
        !self.active || self.lifetime <= 0.0
    }

    /// Advance geometry and lifetime by `dt`.
    pub fn advance(&mut self, dt: f32, arena: &dyn Arena) {
        if !self.active {
            return;
        }
        self.lifetime = (self.lifetime - dt).max(0.0);
        match &mut self.shape {
            EffectShape::Projectile {
                position,
                velocity,
                traveled,
                range,
                ..
            } => {
                let step = *velocity * dt;
                *position += step;
                *traveled += step.length();
                let left_bounds = !arena.bounds().contains(*position, 0.0);
                if *traveled >= *range || left_bounds || arena.is_blocked(*position, 0.0) {
                    self.active = false;
                }
            }
            EffectShape::Area {
                radius,
                max_radius,
                expand_time,
                elapsed,
                ..
            } => {
                *elapsed += dt;
                *radius = if *expand_time > 0.0 {
                    *max_radius * (*elapsed / *expand_time).min(1.0)
                } else {
                    *max_radius
                };
            }
            EffectShape::Beam { .. } => {}
        }
    }

    /// Feed the effect's state into a hasher.
    pub fn hash_state<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.payload.owner.hash(state);
        self.lifetime.to_bits().hash(state);
        self.active.hash(state);
        let position = self.position();
        position.x.to_bits().hash(state);
        position.y.to_bits().hash(state);
    }
}

/// The duel-wide pool of active effects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectPool {
    effects: Vec<Effect>,
    next_id: EffectId,
}

impl EffectPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an effect, assigning its id.
    pub fn spawn(&mut self, mut effect: Effect) -> EffectId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        effect.id = id;
        self.effects.push(effect);
        id
    }

    /// Advance every effect.
    pub fn advance(&mut self, dt: f32, arena: &dyn Arena) {
        for effect in &mut self.effects {
            effect.advance(dt, arena);
        }
    }

    /// Drop spent effects. Returns how many were removed.
    pub fn prune(&mut self) -> usize {
        let before = self.effects.len();
        self.effects.retain(|e| !e.is_spent());
        before - self.effects.len()
    }

    /// Iterate effects in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    /// Iterate effects mutably in spawn order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Effect> {
        self.effects.iter_mut()
    }

    /// Look up an effect.
    #[must_use]
    pub fn get(&self, id: EffectId) -> Option<&Effect> {
        self.effects.iter().find(|e| e.id == id)
    }

    /// Number of effects (including not-yet-pruned spent ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Whether the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.effects.clear();
    }
}
