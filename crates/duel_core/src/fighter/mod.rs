//! Fighter state machine and resource/status model.
//!
//! A [`Fighter`] exclusively owns its position, resources, cooldowns, buffs,
//! damage-over-time effects and status timers. It exposes three operations:
//!
//! - [`Fighter::apply_damage`]: the defensive damage pipeline.
//! - [`Fighter::use_skill`]: resource/cooldown-gated skill casting.
//! - [`Fighter::update`]: timers, regeneration, buffs, DoTs, AI delegation
//!   and physics for one step.
//!
//! Decision making is delegated through the [`Pilot`] trait so this module
//! never depends on the AI.

mod class;
mod status;

pub use class::{ClassFamily, ClassProfile, LOW_HP_FRACTION};
pub use status::{
    absorb_with_shields, Buff, BuffKind, DotEffect, StatusTimers, DOT_TICK_INTERVAL,
    FREEZE_DURATION, FREEZE_SLOW_FACTOR, STUN_DURATION,
};

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::config::{FighterConfig, WeaponConfig, WeaponShape, WeaponWeight};
use crate::entities::{Effect, EffectPool, Payload};
use crate::events::{CombatEvent, FighterId};
use crate::math::{normalize_angle, Vec2};
use crate::rng::{roll, DuelRng};
use crate::skills::{EffectTag, ResourceKind, SkillCatalog, SkillDefinition, SkillEffect};

// ============================================================================
// Constants
// ============================================================================

/// Cap on flat resistance, in percent.
pub const MAX_RESISTANCE: f32 = 75.0;
/// Collision radius of a size-1.0 fighter.
pub const BASE_RADIUS: f32 = 0.5;
/// Force stat that yields a 1.0 melee multiplier.
pub const BASE_FORCE: f32 = 10.0;
/// Start of the swing's active window, as a fraction of the swing.
pub const ACTIVE_WINDOW_START: f32 = 0.3;
/// End of the swing's active window.
pub const ACTIVE_WINDOW_END: f32 = 0.7;
/// Stamina spent per swing.
pub const ATTACK_STAMINA_COST: f32 = 8.0;
/// Pause after a swing before the next one may start.
pub const ATTACK_RECOVERY: f32 = 0.25;

const MANA_REGEN: f32 = 4.0;
const STAMINA_REGEN: f32 = 12.0;
const FRICTION: f32 = 6.0;
const GRAVITY: f32 = 20.0;
const HOP_SPEED: f32 = 5.0;
const WALL_SKIN: f32 = 0.01;
const MIN_VELOCITY: f32 = 0.01;
const INVULNERABILITY_PER_DAMAGE: f32 = 0.01;
const MAX_INVULNERABILITY: f32 = 0.3;
const FLASH_PER_DAMAGE: f32 = 0.01;
const MAX_FLASH: f32 = 0.25;
const KNOCKBACK_BASE: f32 = 4.0;
const KNOCKBACK_PER_DAMAGE: f32 = 0.15;
const DASH_STEP_BACK: f32 = 0.5;
const DASH_IMPACT_RADIUS_SCALE: f32 = 1.5;
const DASH_IMPACT_EXPAND: f32 = 0.05;
const DASH_IMPACT_DURATION: f32 = 0.2;

// ============================================================================
// Supporting types
// ============================================================================

/// An incoming hit, as seen by the defender.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Damage after the attacker's outgoing modifiers.
    pub amount: f32,
    /// Direction to push the defender.
    pub knockback_dir: Vec2,
    /// Status tag applied on landing.
    pub effect: Option<EffectTag>,
    /// Attacker, for DoT attribution.
    pub source: Option<FighterId>,
}

impl Hit {
    /// A plain hit.
    #[must_use]
    pub const fn new(amount: f32, knockback_dir: Vec2) -> Self {
        Self {
            amount,
            knockback_dir,
            effect: None,
            source: None,
        }
    }

    /// Builder method to set the status tag.
    #[must_use]
    pub const fn with_effect(mut self, effect: Option<EffectTag>) -> Self {
        self.effect = effect;
        self
    }

    /// Builder method to set the attacker.
    #[must_use]
    pub const fn with_source(mut self, source: FighterId) -> Self {
        self.source = Some(source);
        self
    }
}

/// What a pilot wants the fighter to do this step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Intent {
    /// Desired movement direction; zero holds position.
    pub movement: Vec2,
    /// Fraction of base speed, clamped to `[0, 1.5]`.
    pub speed_factor: f32,
    /// Bearing to face.
    pub face: Option<f32>,
    /// Start a melee swing if possible.
    pub attack: bool,
    /// Hop if grounded.
    pub hop: bool,
    /// Skill slot to cast.
    pub cast: Option<usize>,
}

impl Intent {
    /// Do nothing.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }
}

/// Decision maker driving a fighter.
pub trait Pilot {
    /// Decide this step's intent.
    fn think(&mut self, dt: f32, me: &Fighter, opponent: &Fighter) -> Intent;

    /// Called every step, even while stunned or with the opponent down.
    fn observe(&mut self, _dt: f32, _me: &Fighter) {}

    /// Told whether the cast requested by the last intent succeeded.
    fn on_cast_result(&mut self, _slot: usize, _success: bool) {}
}

/// Melee swing state. At most one swing is ever in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AttackState {
    /// A swing is in progress.
    pub attacking: bool,
    /// Seconds since the swing started.
    pub timer: f32,
    /// Length of the swing.
    pub duration: f32,
    /// This swing already landed.
    pub hit_registered: bool,
    /// Seconds before another swing may start.
    pub recovery: f32,
}

impl AttackState {
    /// Swing progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            (self.timer / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Whether the swing is inside its damaging window.
    #[must_use]
    pub fn in_active_window(&self) -> bool {
        self.attacking && (ACTIVE_WINDOW_START..=ACTIVE_WINDOW_END).contains(&self.progress())
    }

    /// Stop the swing without refunding anything.
    pub fn cancel(&mut self) {
        self.attacking = false;
        self.timer = 0.0;
        self.hit_registered = false;
    }
}

/// Running combat statistics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FighterStats {
    /// Health damage dealt to the opponent.
    pub damage_dealt: f32,
    /// Health damage taken.
    pub damage_taken: f32,
    /// Hits landed.
    pub hits_landed: u32,
    /// Crits landed.
    pub crits: u32,
    /// Skills cast.
    pub skills_cast: u32,
    /// Clashes.
    pub clashes: u32,
    /// Hits evaded.
    pub evasions: u32,
    /// Damage absorbed by shields.
    pub shield_absorbed: f32,
    /// Health restored by regen buffs and lifesteal.
    pub healed: f32,
}

// ============================================================================
// Fighter
// ============================================================================

/// One combatant.
#[derive(Debug, Clone, PartialEq)]
pub struct Fighter {
    /// Identifier within the duel.
    pub id: FighterId,
    /// Display name.
    pub name: String,
    /// Class name as configured.
    pub class_name: String,
    /// Class modifiers.
    pub profile: ClassProfile,
    /// Equipped weapon.
    pub weapon: Option<WeaponConfig>,

    /// Floor position.
    pub position: Vec2,
    /// Height above the floor.
    pub z: f32,
    /// Vertical velocity.
    pub vz: f32,
    /// Knockback velocity, damped by friction.
    pub velocity: Vec2,
    /// Velocity from the current movement intent.
    pub move_velocity: Vec2,
    /// Facing bearing.
    pub facing: f32,
    /// Current weapon bearing.
    pub weapon_angle: f32,
    /// Collision radius.
    pub radius: f32,
    /// Body scale.
    pub scale: f32,

    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Current mana.
    pub mana: f32,
    /// Maximum mana.
    pub max_mana: f32,
    /// Current stamina.
    pub stamina: f32,
    /// Maximum stamina.
    pub max_stamina: f32,
    /// Strength stat.
    pub force: f32,
    /// Flat resistance percentage.
    pub resistance: f32,
    /// Base movement speed.
    pub speed: f32,

    /// Equipped skills in slot order.
    pub skills: Vec<Arc<SkillDefinition>>,
    /// Remaining cooldown per skill name.
    pub cooldowns: BTreeMap<String, f32>,
    /// Active buffs.
    pub buffs: Vec<Buff>,
    /// Active damage-over-time effects.
    pub dots: Vec<DotEffect>,
    /// Status timers.
    pub status: StatusTimers,
    /// Melee swing.
    pub attack: AttackState,
    /// Dead fighters ignore damage and skill use.
    pub dead: bool,
    /// Combat statistics.
    pub stats: FighterStats,

    events: Vec<CombatEvent>,
    dot_credit: f32,
}

impl Fighter {
    /// Build a fighter from configuration, resolving skills through `catalog`.
    #[must_use]
    pub fn new(id: FighterId, config: &FighterConfig, catalog: &SkillCatalog) -> Self {
        let scale = config.size.max(0.1);
        let skills = config
            .weapon
            .iter()
            .flat_map(|w| w.skills.iter())
            .map(|name| catalog.get_skill(name))
            .collect();

        Self {
            id,
            name: config.name.clone(),
            class_name: config.class_name.clone(),
            profile: ClassProfile::from_class_name(&config.class_name),
            weapon: config.weapon.clone(),
            position: Vec2::ZERO,
            z: 0.0,
            vz: 0.0,
            velocity: Vec2::ZERO,
            move_velocity: Vec2::ZERO,
            facing: 0.0,
            weapon_angle: 0.0,
            radius: BASE_RADIUS * scale,
            scale,
            health: config.health,
            max_health: config.health,
            mana: config.mana,
            max_mana: config.mana,
            stamina: config.stamina,
            max_stamina: config.stamina,
            force: config.force,
            resistance: config.resistance.clamp(0.0, MAX_RESISTANCE),
            speed: config.speed,
            skills,
            cooldowns: BTreeMap::new(),
            buffs: Vec::new(),
            dots: Vec::new(),
            status: StatusTimers::default(),
            attack: AttackState::default(),
            dead: false,
            stats: FighterStats::default(),
            events: Vec::new(),
            dot_credit: 0.0,
        }
    }

    /// Builder method to place the fighter.
    #[must_use]
    pub fn at(mut self, position: Vec2, facing: f32) -> Self {
        self.position = position;
        self.facing = normalize_angle(facing);
        self.weapon_angle = self.facing;
        self
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Whether the fighter is still in the fight.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Health as a fraction of maximum.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    /// Unit vector along the facing.
    #[must_use]
    pub fn facing_dir(&self) -> Vec2 {
        Vec2::from_angle(self.facing)
    }

    /// Total remaining shield absorption.
    #[must_use]
    pub fn shield_total(&self) -> f32 {
        self.buffs.iter().map(Buff::shield_value).sum()
    }

    /// Whether any buff of the same variant as `kind` is active.
    #[must_use]
    pub fn has_buff(&self, kind: &BuffKind) -> bool {
        self.buffs
            .iter()
            .any(|b| std::mem::discriminant(&b.kind) == std::mem::discriminant(kind))
    }

    /// Remaining cooldown for a skill (zero if never used).
    #[must_use]
    pub fn cooldown_remaining(&self, skill: &str) -> f32 {
        self.cooldowns.get(skill).copied().unwrap_or(0.0)
    }

    /// Cost after class discounts.
    #[must_use]
    pub fn effective_cost(&self, skill: &SkillDefinition) -> f32 {
        match skill.resource {
            ResourceKind::Mana => skill.cost * (1.0 - self.profile.mana_discount).max(0.0),
            ResourceKind::Stamina => skill.cost,
        }
    }

    fn pool(&self, resource: ResourceKind) -> f32 {
        match resource {
            ResourceKind::Mana => self.mana,
            ResourceKind::Stamina => self.stamina,
        }
    }

    fn pool_mut(&mut self, resource: ResourceKind) -> &mut f32 {
        match resource {
            ResourceKind::Mana => &mut self.mana,
            ResourceKind::Stamina => &mut self.stamina,
        }
    }

    /// Whether the skill in `slot` could be cast right now.
    #[must_use]
    pub fn can_use_skill(&self, slot: usize) -> bool {
        let Some(skill) = self.skills.get(slot) else {
            return false;
        };
        !self.dead
            && !matches!(skill.effect, SkillEffect::None)
            && self.cooldown_remaining(&skill.name) <= 0.0
            && self.pool(skill.resource) >= self.effective_cost(skill)
    }

    /// Multiplier on every outgoing hit: damage buffs and low-HP bonus.
    #[must_use]
    pub fn outgoing_multiplier(&self) -> f32 {
        let buff = self
            .buffs
            .iter()
            .filter_map(|b| match b.kind {
                BuffKind::Damage { multiplier } => Some(multiplier),
                _ => None,
            })
            .fold(1.0_f32, f32::max);
        buff * self.profile.low_hp_factor(self.health_fraction())
    }

    /// Base melee damage of the equipped weapon scaled by force.
    #[must_use]
    pub fn melee_damage(&self) -> f32 {
        let Some(weapon) = &self.weapon else {
            return 0.0;
        };
        weapon.damage * (self.force / BASE_FORCE).clamp(0.5, 2.5)
    }

    /// Movement speed after slows and speed buffs.
    #[must_use]
    pub fn current_speed(&self) -> f32 {
        let haste = self
            .buffs
            .iter()
            .filter_map(|b| match b.kind {
                BuffKind::Speed { multiplier } => Some(multiplier),
                _ => None,
            })
            .fold(1.0_f32, f32::max);
        self.speed * haste * self.status.movement_factor()
    }

    /// Weapon reach from the fighter's centre.
    #[must_use]
    pub fn weapon_reach(&self) -> f32 {
        self.weapon
            .as_ref()
            .map_or(0.0, |w| w.reach(self.scale) + self.radius)
    }

    // ------------------------------------------------------------------------
    // Damage pipeline
    // ------------------------------------------------------------------------

    /// Apply an incoming hit. Returns `true` if this hit killed the fighter.
    ///
    /// Order: class defense and resistance, evasion roll, shields, health.
    /// Dead or invulnerable fighters and non-positive amounts are no-ops.
    pub fn apply_damage(&mut self, hit: &Hit, rng: &mut DuelRng) -> bool {
        if self.dead || self.status.invulnerable > 0.0 || hit.amount.is_nan() || hit.amount <= 0.0 {
            return false;
        }

        let mut amount =
            hit.amount * self.profile.defense_multiplier * (1.0 - self.resistance / 100.0);

        if roll(rng, self.profile.evasion_chance) {
            self.stats.evasions += 1;
            tracing::trace!(fighter = self.id, amount, "Hit evaded");
            return false;
        }

        let absorbed = absorb_with_shields(&mut self.buffs, amount);
        self.stats.shield_absorbed += absorbed;
        amount -= absorbed;

        if amount > 0.0 {
            self.health = (self.health - amount).max(0.0);
            self.stats.damage_taken += amount;
            self.status.invulnerable = (amount * INVULNERABILITY_PER_DAMAGE).min(MAX_INVULNERABILITY);
            self.status.flash = (amount * FLASH_PER_DAMAGE).min(MAX_FLASH);
        }

        let magnitude =
            KNOCKBACK_BASE * (1.0 - self.health_fraction()) + hit.amount * KNOCKBACK_PER_DAMAGE;
        self.velocity += hit.knockback_dir.normalize() * (magnitude / self.scale);

        if let Some(tag) = hit.effect {
            self.apply_status(tag, hit.source);
        }

        if self.health <= 0.0 {
            self.die(hit.source);
            return true;
        }
        false
    }

    /// Land the status of a strike that carries no damage.
    ///
    /// Passes the same gate as [`Fighter::apply_damage`]: nothing lands while
    /// invulnerable, and the evasion roll applies. Returns whether it landed.
    pub fn apply_status_hit(
        &mut self,
        tag: EffectTag,
        source: Option<FighterId>,
        rng: &mut DuelRng,
    ) -> bool {
        if self.dead || self.status.invulnerable > 0.0 {
            return false;
        }
        if roll(rng, self.profile.evasion_chance) {
            self.stats.evasions += 1;
            tracing::trace!(fighter = self.id, ?tag, "Status evaded");
            return false;
        }
        self.apply_status(tag, source);
        true
    }

    /// Apply the status side of an effect tag.
    pub fn apply_status(&mut self, tag: EffectTag, source: Option<FighterId>) {
        if self.dead {
            return;
        }
        match tag {
            EffectTag::Stun => {
                self.status.stun = self.status.stun.max(STUN_DURATION);
                self.attack.cancel();
            }
            EffectTag::Freeze => {
                self.status.slow = self.status.slow.max(FREEZE_DURATION);
                self.status.slow_factor = FREEZE_SLOW_FACTOR;
            }
            EffectTag::Poison | EffectTag::Bleed | EffectTag::Burn => {
                if let Some(dot) = DotEffect::for_tag(tag, source) {
                    // Reapplying the same DoT from the same source refreshes it
                    match self
                        .dots
                        .iter_mut()
                        .find(|d| d.tag == tag && d.source == source)
                    {
                        Some(existing) => existing.ticks_left = dot.ticks_left,
                        None => self.dots.push(dot),
                    }
                }
            }
            EffectTag::Shield
            | EffectTag::Heal
            | EffectTag::SpeedBuff
            | EffectTag::DamageBuff => {}
        }
    }

    /// Stun for `duration` and cancel any swing.
    pub fn stun(&mut self, duration: f32) {
        if self.dead {
            return;
        }
        self.status.stun = self.status.stun.max(duration);
        self.attack.cancel();
    }

    /// Restore health, never above maximum. Returns the amount restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if self.dead || amount.is_nan() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        let restored = self.health - before;
        self.stats.healed += restored;
        restored
    }

    /// The single death transition shared by direct hits and DoTs.
    fn die(&mut self, killer: Option<FighterId>) {
        if self.dead {
            return;
        }
        self.dead = true;
        self.health = 0.0;
        self.attack.cancel();
        self.move_velocity = Vec2::ZERO;
        self.dots.clear();
        self.events.push(CombatEvent::death(self.id, killer, self.position));
        tracing::debug!(fighter = self.id, name = %self.name, "Fighter died");
    }

    // ------------------------------------------------------------------------
    // Skills and attacks
    // ------------------------------------------------------------------------

    /// Cast the skill in `slot`. Returns `false` (no state change) if it is
    /// unknown, on cooldown or unaffordable.
    pub fn use_skill(&mut self, slot: usize, effects: &mut EffectPool, arena: &dyn Arena) -> bool {
        if !self.can_use_skill(slot) {
            return false;
        }
        let Some(skill) = self.skills.get(slot).map(Arc::clone) else {
            return false;
        };

        let cost = self.effective_cost(&skill);
        *self.pool_mut(skill.resource) -= cost;
        self.cooldowns.insert(skill.name.clone(), skill.cooldown);

        let dir = self.facing_dir();
        let payload = Payload::from_skill(self.id, &skill);
        match skill.effect {
            SkillEffect::Projectile {
                speed,
                radius,
                range,
                recoil,
            } => {
                let origin = self.position + dir * (self.radius + radius);
                effects.spawn(Effect::projectile(payload, origin, dir * speed, radius, range));
                if recoil > 0.0 {
                    self.velocity -= dir * (recoil / self.scale);
                }
            }
            SkillEffect::Beam {
                range,
                width,
                duration,
            } => {
                let origin = self.position + dir * self.radius;
                effects.spawn(Effect::beam(payload, origin, dir, range, width, duration));
            }
            SkillEffect::Area {
                radius,
                expand_time,
                duration,
            } => {
                effects.spawn(Effect::area(
                    payload,
                    self.position,
                    radius,
                    expand_time,
                    duration,
                ));
            }
            SkillEffect::Dash {
                distance,
                invulnerability,
            } => {
                self.dash(dir, distance, arena);
                self.status.invulnerable = self.status.invulnerable.max(invulnerability);
                if skill.damage > 0.0 {
                    effects.spawn(Effect::area(
                        payload,
                        self.position,
                        self.radius * DASH_IMPACT_RADIUS_SCALE,
                        DASH_IMPACT_EXPAND,
                        DASH_IMPACT_DURATION,
                    ));
                }
            }
            SkillEffect::Buff { duration, potency } => {
                self.buffs
                    .push(Buff::from_tag(skill.effect_tag, potency, duration));
            }
            SkillEffect::None => {}
        }

        self.stats.skills_cast += 1;
        self.events
            .push(CombatEvent::skill_cast(self.id, &skill.name, self.position));
        tracing::trace!(fighter = self.id, skill = %skill.name, "Skill cast");
        true
    }

    /// Teleport along `dir`, stopping short of walls and obstacles.
    fn dash(&mut self, dir: Vec2, distance: f32, arena: &dyn Arena) {
        let bounds = arena.bounds();
        let mut reach = distance.max(0.0);
        while reach > 0.0 {
            let target = bounds.clamp(self.position + dir * reach, self.radius + WALL_SKIN);
            if !arena.is_blocked(target, self.radius) {
                self.position = target;
                return;
            }
            reach -= DASH_STEP_BACK;
        }
    }

    /// Start a melee swing. Fails while swinging, recovering, unarmed or tired.
    pub fn start_attack(&mut self) -> bool {
        let Some(weapon) = &self.weapon else {
            return false;
        };
        if self.dead
            || self.attack.attacking
            || self.attack.recovery > 0.0
            || self.status.stun > 0.0
            || self.stamina < ATTACK_STAMINA_COST
        {
            return false;
        }
        let weight_factor = match weapon.weight {
            WeaponWeight::Light => 0.8,
            WeaponWeight::Medium => 1.0,
            WeaponWeight::Heavy => 1.4,
        };
        self.attack = AttackState {
            attacking: true,
            timer: 0.0,
            duration: weapon.swing_time * weight_factor,
            hit_registered: false,
            recovery: 0.0,
        };
        self.stamina -= ATTACK_STAMINA_COST;
        true
    }

    // ------------------------------------------------------------------------
    // Per-step update
    // ------------------------------------------------------------------------

    /// Advance one step. `pilot` observes every step but is asked to think
    /// only when the fighter is alive, not stunned and the opponent is alive.
    pub fn update(
        &mut self,
        dt: f32,
        opponent: &Fighter,
        mut pilot: Option<&mut dyn Pilot>,
        effects: &mut EffectPool,
        arena: &dyn Arena,
    ) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }

        self.tick_timers(dt);
        if !self.dead {
            self.regenerate(dt);
            self.update_buffs(dt);
            self.update_dots(dt);
        }
        if let Some(pilot) = pilot.as_mut() {
            pilot.observe(dt, self);
        }
        if !self.dead {
            self.update_weapon(dt);
            self.move_velocity = Vec2::ZERO;
            if self.status.stun <= 0.0 && opponent.is_alive() {
                if let Some(pilot) = pilot {
                    let intent = pilot.think(dt, self, opponent);
                    if let Some((slot, success)) = self.execute(&intent, effects, arena) {
                        pilot.on_cast_result(slot, success);
                    }
                }
            }
        }
        self.integrate_physics(dt, arena);
    }

    /// Apply an intent. Returns the cast slot and whether it succeeded.
    fn execute(
        &mut self,
        intent: &Intent,
        effects: &mut EffectPool,
        arena: &dyn Arena,
    ) -> Option<(usize, bool)> {
        if let Some(bearing) = intent.face {
            self.facing = normalize_angle(bearing);
        }
        let cast = intent
            .cast
            .map(|slot| (slot, self.use_skill(slot, effects, arena)));
        if intent.attack {
            self.start_attack();
        }
        if intent.hop && self.z <= 0.0 {
            self.vz = HOP_SPEED;
        }
        let factor = intent.speed_factor.clamp(0.0, 1.5);
        self.move_velocity = intent.movement.normalize() * (self.current_speed() * factor);
        cast
    }

    fn tick_timers(&mut self, dt: f32) {
        for remaining in self.cooldowns.values_mut() {
            *remaining = (*remaining - dt).max(0.0);
        }
        self.status.tick(dt);
        self.attack.recovery = (self.attack.recovery - dt).max(0.0);
    }

    fn regenerate(&mut self, dt: f32) {
        self.mana = (self.mana + MANA_REGEN * dt).min(self.max_mana);
        self.stamina = (self.stamina + STAMINA_REGEN * dt).min(self.max_stamina);
    }

    fn update_buffs(&mut self, dt: f32) {
        let mut regen = 0.0;
        for buff in &mut self.buffs {
            let active = buff.remaining.min(dt);
            buff.remaining = (buff.remaining - dt).max(0.0);
            if let BuffKind::Regen { per_second } = buff.kind {
                regen += per_second * active;
            }
        }
        self.heal(regen);
        self.buffs.retain(|b| !b.is_expired());
    }

    fn update_dots(&mut self, dt: f32) {
        let mut index = 0;
        while index < self.dots.len() && !self.dead {
            let dot = &mut self.dots[index];
            let ticks = dot.advance(dt);
            let (tag, source) = (dot.tag, dot.source);
            let damage = dot.damage_per_tick * ticks as f32;
            if damage > 0.0 {
                let dealt = damage.min(self.health);
                self.health -= dealt;
                self.stats.damage_taken += dealt;
                self.dot_credit += dealt;
                if let Some(source) = source {
                    self.events.push(
                        CombatEvent::hit(source, self.id, dealt, false, self.position)
                            .with_effect(Some(tag)),
                    );
                }
                if self.health <= 0.0 {
                    self.die(source);
                    return;
                }
            }
            index += 1;
        }
        self.dots.retain(|d| !d.is_finished());
    }

    fn update_weapon(&mut self, dt: f32) {
        let Some(weapon) = &self.weapon else {
            return;
        };
        if self.attack.attacking {
            self.attack.timer += dt;
            if self.attack.timer >= self.attack.duration {
                self.attack.cancel();
                self.attack.recovery = ATTACK_RECOVERY;
            }
        }
        let arc = weapon.arc_width_deg.to_radians();
        self.weapon_angle = match weapon.shape {
            WeaponShape::Orbital => {
                normalize_angle(self.weapon_angle + weapon.orbit_speed_deg.to_radians() * dt)
            }
            WeaponShape::Line | WeaponShape::Arc if self.attack.attacking => {
                normalize_angle(self.facing - arc * 0.5 + arc * self.attack.progress())
            }
            WeaponShape::Line | WeaponShape::Arc => self.facing,
        };
    }

    fn integrate_physics(&mut self, dt: f32, arena: &dyn Arena) {
        let previous = self.position;
        let delta = (self.move_velocity + self.velocity) * dt;
        let bounds = arena.bounds();
        let next = bounds.clamp(self.position + delta, self.radius + WALL_SKIN);

        // Slide along obstacles one axis at a time before giving up
        self.position = [next, Vec2::new(next.x, previous.y), Vec2::new(previous.x, next.y)]
            .into_iter()
            .find(|candidate| !arena.is_blocked(*candidate, self.radius))
            .unwrap_or(previous);

        self.velocity = self.velocity * (1.0 - FRICTION * dt).max(0.0);
        if self.velocity.length_squared() < MIN_VELOCITY * MIN_VELOCITY {
            self.velocity = Vec2::ZERO;
        }

        if self.z > 0.0 || self.vz > 0.0 {
            self.vz -= GRAVITY * dt;
            self.z += self.vz * dt;
            if self.z <= 0.0 {
                self.z = 0.0;
                self.vz = 0.0;
            }
        }
    }

    // ------------------------------------------------------------------------
    // Outbox
    // ------------------------------------------------------------------------

    /// Take events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Take DoT damage dealt to this fighter since the last call.
    pub fn take_dot_credit(&mut self) -> f32 {
        std::mem::take(&mut self.dot_credit)
    }

    /// Feed the fighter's simulation state into a hasher.
    pub fn hash_state<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        for value in [
            self.position.x,
            self.position.y,
            self.z,
            self.velocity.x,
            self.velocity.y,
            self.facing,
            self.health,
            self.mana,
            self.stamina,
            self.status.stun,
            self.status.invulnerable,
            self.attack.timer,
        ] {
            value.to_bits().hash(state);
        }
        self.dead.hash(state);
        self.attack.attacking.hash(state);
        self.buffs.len().hash(state);
        self.dots.len().hash(state);
        for (name, remaining) in &self.cooldowns {
            name.hash(state);
            remaining.to_bits().hash(state);
        }
    }
}
