//! Per-tick combat resolution.
//!
//! [`CombatResolver::resolve`] runs once per tick, after both fighters have
//! moved, in a fixed order:
//!
//! 1. **Clash** - weapons meeting stun and separate both fighters and cancel
//!    all damage for the tick. Effects are left untouched and may land on a
//!    later tick.
//! 2. **Melee** - each fighter's swing is tested against the other.
//! 3. **Effects** - projectiles, areas and beams are tested against the
//!    owner's opponent.
//! 4. **Bodies** - overlapping collision circles are pushed apart.
//! 5. **Death** - the first fighter killed this tick is the lethal event.
//!
//! Outgoing modifiers (damage buffs, low-HP bonus, crits) are applied here,
//! at the attacker side; [`Fighter::apply_damage`] only applies the
//! defender's own mitigation.

use std::sync::Arc;

use crate::arena::Arena;
use crate::entities::{EffectPool, EffectShape};
use crate::events::{CombatEvent, FighterId};
use crate::fighter::{Fighter, Hit};
use crate::geometry::{circles_overlap, segment_intersects_circle};
use crate::hitbox::{melee_hits, weapon_hitbox, weapons_clash};
use crate::math::Vec2;
use crate::rng::{roll, DuelRng};
use crate::skills::EffectTag;

/// Stun applied to both fighters by a clash.
pub const CLASH_STUN: f32 = 0.4;
/// Separation speed applied by a clash.
pub const CLASH_PUSH: f32 = 6.0;
/// Damage at or above which a hit counts as heavy.
pub const DEFAULT_HEAVY_HIT: f32 = 25.0;
/// Vertical separation under which bodies collide.
pub const BODY_Z_TOLERANCE: f32 = 0.5;

const SOFT_PUSH: f32 = 0.5;
const DEEP_PENETRATION: f32 = 0.5;

/// Everything one resolution pass produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Hit, crit and clash events in resolution order.
    pub events: Vec<CombatEvent>,
    /// A clash fired.
    pub clash: bool,
    /// At least one heavy hit landed.
    pub heavy_hit: bool,
    /// First fighter killed during the pass.
    pub lethal: Option<FighterId>,
}

impl Resolution {
    fn record_kill(&mut self, fighter: FighterId) {
        if self.lethal.is_none() {
            self.lethal = Some(fighter);
        }
    }
}

/// An outgoing strike before the defender's mitigation.
struct Strike<'a> {
    base: f32,
    knockback_dir: Vec2,
    effect: Option<EffectTag>,
    skill: Option<&'a str>,
}

/// Resolves interactions between two fighters and the effect pool.
#[derive(Debug, Clone)]
pub struct CombatResolver {
    arena: Arc<dyn Arena>,
    rng: DuelRng,
    heavy_hit_threshold: f32,
}

impl CombatResolver {
    /// Create a resolver over an injected arena and its own random stream.
    #[must_use]
    pub fn new(arena: Arc<dyn Arena>, rng: DuelRng) -> Self {
        Self {
            arena,
            rng,
            heavy_hit_threshold: DEFAULT_HEAVY_HIT,
        }
    }

    /// Builder method to set the heavy-hit threshold.
    #[must_use]
    pub fn with_heavy_hit_threshold(mut self, threshold: f32) -> Self {
        self.heavy_hit_threshold = threshold;
        self
    }

    /// Run the full resolution pass.
    pub fn resolve(&mut self, fighters: &mut [Fighter; 2], effects: &mut EffectPool) -> Resolution {
        let mut out = Resolution::default();
        let [a, b] = fighters;

        if weapons_clash(a, b) {
            self.clash(a, b, &mut out);
        } else {
            self.melee(a, b, &mut out);
            self.melee(b, a, &mut out);
            self.resolve_effects(a, b, effects, &mut out);
        }
        self.separate_bodies(a, b);

        if let Some(fighter) = out.lethal {
            tracing::debug!(fighter, "Lethal hit");
        }
        out
    }

    fn clash(&mut self, a: &mut Fighter, b: &mut Fighter, out: &mut Resolution) {
        let axis = (b.position - a.position).normalize();
        for (fighter, dir) in [(&mut *a, -axis), (&mut *b, axis)] {
            fighter.stun(CLASH_STUN);
            fighter.velocity += dir * (CLASH_PUSH / fighter.scale);
            fighter.stats.clashes += 1;
        }
        let position = (a.position + b.position) * 0.5;
        out.events.push(CombatEvent::clash(a.id, b.id, position));
        out.clash = true;
        tracing::debug!(a = a.id, b = b.id, "Weapons clashed");
    }

    fn melee(&mut self, attacker: &mut Fighter, defender: &mut Fighter, out: &mut Resolution) {
        if !melee_hits(attacker, defender) {
            return;
        }
        attacker.attack.hit_registered = true;
        let strike = Strike {
            base: attacker.melee_damage(),
            knockback_dir: defender.position - attacker.position,
            effect: attacker.weapon.as_ref().and_then(|w| w.effect),
            skill: None,
        };
        let position = weapon_hitbox(attacker).map_or(defender.position, |h| h.focus());
        self.strike(attacker, defender, &strike, position, out);
    }

    fn resolve_effects(
        &mut self,
        a: &mut Fighter,
        b: &mut Fighter,
        effects: &mut EffectPool,
        out: &mut Resolution,
    ) {
        for effect in effects.iter_mut() {
            if !effect.active {
                continue;
            }
            let (owner, target) = if effect.owner() == a.id {
                (&mut *a, &mut *b)
            } else if effect.owner() == b.id {
                (&mut *b, &mut *a)
            } else {
                continue;
            };
            if target.dead {
                continue;
            }

            let payload = &effect.payload;
            let knockback_dir = match &mut effect.shape {
                EffectShape::Projectile {
                    position,
                    velocity,
                    radius,
                    ..
                } => {
                    if !circles_overlap(*position, *radius, target.position, target.radius) {
                        continue;
                    }
                    effect.active = false;
                    *velocity
                }
                EffectShape::Area {
                    center,
                    radius,
                    hit,
                    ..
                } => {
                    if hit.contains(&target.id)
                        || !circles_overlap(*center, *radius, target.position, target.radius)
                    {
                        continue;
                    }
                    hit.insert(target.id);
                    target.position - *center
                }
                EffectShape::Beam {
                    origin,
                    direction,
                    range,
                    width,
                    fired,
                    hit_applied,
                } => {
                    if *fired {
                        continue;
                    }
                    *fired = true;
                    let end = *origin + *direction * *range;
                    if !segment_intersects_circle(
                        *origin,
                        end,
                        target.position,
                        target.radius + *width * 0.5,
                    ) {
                        continue;
                    }
                    *hit_applied = true;
                    *direction
                }
            };

            let strike = Strike {
                base: payload.damage,
                knockback_dir,
                effect: payload.effect_tag,
                skill: Some(payload.skill.as_str()),
            };
            let position = target.position;
            self.strike(owner, target, &strike, position, out);
        }
    }

    /// Apply one strike: crit roll, outgoing modifiers, mitigation, lifesteal.
    fn strike(
        &mut self,
        attacker: &mut Fighter,
        defender: &mut Fighter,
        strike: &Strike<'_>,
        position: Vec2,
        out: &mut Resolution,
    ) {
        let crit = roll(&mut self.rng, attacker.profile.crit_chance);
        let mut amount = strike.base * attacker.outgoing_multiplier();
        if crit {
            amount *= attacker.profile.crit_multiplier;
        }

        if amount.is_nan() || amount <= 0.0 {
            // Pure status skills still land their tag
            if let Some(tag) = strike.effect {
                defender.apply_status_hit(tag, Some(attacker.id), &mut self.rng);
            }
            return;
        }

        let health_before = defender.health;
        let absorbed_before = defender.stats.shield_absorbed;
        let hit = Hit::new(amount, strike.knockback_dir)
            .with_effect(strike.effect)
            .with_source(attacker.id);
        let killed = defender.apply_damage(&hit, &mut self.rng);
        let dealt = health_before - defender.health;
        let absorbed = defender.stats.shield_absorbed - absorbed_before;
        if dealt <= 0.0 && absorbed <= 0.0 {
            return;
        }

        attacker.stats.hits_landed += 1;
        attacker.stats.damage_dealt += dealt;
        if crit {
            attacker.stats.crits += 1;
        }
        if attacker.profile.lifesteal > 0.0 {
            attacker.heal(dealt * attacker.profile.lifesteal);
        }
        if dealt >= self.heavy_hit_threshold {
            out.heavy_hit = true;
        }
        out.events.push(
            CombatEvent::hit(attacker.id, defender.id, dealt, crit, position)
                .with_effect(strike.effect)
                .with_skill(strike.skill),
        );
        tracing::trace!(
            attacker = attacker.id,
            defender = defender.id,
            dealt,
            absorbed,
            crit,
            "Hit landed"
        );
        if killed {
            out.record_kill(defender.id);
        }
    }

    /// Soft-push overlapping bodies apart.
    ///
    /// Each fighter moves half the penetration depth, or the full depth once
    /// the overlap is deep, then is clamped back inside the arena.
    pub fn separate_bodies(&self, a: &mut Fighter, b: &mut Fighter) {
        if a.dead || b.dead || (a.z - b.z).abs() > BODY_Z_TOLERANCE {
            return;
        }
        let offset = b.position - a.position;
        let distance = offset.length();
        let overlap = a.radius + b.radius - distance;
        if overlap <= 0.0 {
            return;
        }
        let axis = if distance > f32::EPSILON {
            offset * (1.0 / distance)
        } else {
            Vec2::new(1.0, 0.0)
        };
        let deep = overlap > DEEP_PENETRATION * a.radius.min(b.radius);
        let push = overlap * 0.5 * if deep { 1.0 } else { SOFT_PUSH };

        let bounds = self.arena.bounds();
        a.position = bounds.clamp(a.position - axis * push, a.radius);
        b.position = bounds.clamp(b.position + axis * push, b.radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::BoxArena;
    use crate::config::{FighterConfig, WeaponConfig};
    use crate::entities::{Effect, Payload};
    use crate::events::CombatEventKind;
    use crate::fighter::Buff;
    use crate::rng::seeded;
    use crate::skills::SkillCatalog;
    use std::f32::consts::PI;

    fn arena() -> Arc<dyn Arena> {
        Arc::new(BoxArena::open(30.0, 30.0))
    }

    fn resolver() -> CombatResolver {
        CombatResolver::new(arena(), seeded(5))
    }

    /// A fighter with no crits, evasion or mitigation.
    fn plain(id: u32, weapon: Option<WeaponConfig>, x: f32, facing: f32) -> Fighter {
        let config = FighterConfig::new("F", "Farmer").with_weapon(weapon);
        let mut fighter =
            Fighter::new(id, &config, &SkillCatalog::new()).at(Vec2::new(x, 0.0), facing);
        fighter.profile.crit_chance = 0.0;
        fighter
    }

    fn swing(fighter: &mut Fighter) {
        fighter.attack.attacking = true;
        fighter.attack.duration = 1.0;
        fighter.attack.timer = 0.5;
    }

    fn payload(owner: u32, damage: f32) -> Payload {
        Payload {
            owner,
            skill: "Test".to_string(),
            damage,
            effect_tag: None,
        }
    }

    #[test]
    fn test_melee_hit_registers_once() {
        let mut fighters = [
            plain(0, Some(WeaponConfig::default()), 0.0, 0.0),
            plain(1, None, 1.5, PI),
        ];
        swing(&mut fighters[0]);
        let mut effects = EffectPool::new();
        let mut resolver = resolver();

        let first = resolver.resolve(&mut fighters, &mut effects);
        assert_eq!(first.events.len(), 1);
        assert_eq!(first.events[0].kind, CombatEventKind::Hit);
        assert!(fighters[1].health < 100.0);
        assert_eq!(fighters[0].stats.hits_landed, 1);

        let health = fighters[1].health;
        fighters[1].status.invulnerable = 0.0;
        let second = resolver.resolve(&mut fighters, &mut effects);
        assert!(second.events.is_empty());
        assert_eq!(fighters[1].health, health);
    }

    #[test]
    fn test_clash_cancels_damage() {
        let mut fighters = [
            plain(0, Some(WeaponConfig::default()), 0.0, PI / 4.0),
            plain(1, Some(WeaponConfig::default()), 2.0, 3.0 * PI / 4.0),
        ];
        swing(&mut fighters[0]);
        swing(&mut fighters[1]);
        fighters[0].weapon_angle = PI / 4.0;
        fighters[1].weapon_angle = 3.0 * PI / 4.0;

        let result = resolver().resolve(&mut fighters, &mut EffectPool::new());
        assert!(result.clash);
        for fighter in &fighters {
            assert_eq!(fighter.health, 100.0);
            assert!(fighter.status.stun > 0.0);
            assert!(!fighter.attack.attacking);
            assert_eq!(fighter.stats.clashes, 1);
        }
        assert!(fighters[0].velocity.x < 0.0);
        assert!(fighters[1].velocity.x > 0.0);
    }

    #[test]
    fn test_clash_cancels_effect_damage() {
        let mut fighters = [
            plain(0, Some(WeaponConfig::default()), 0.0, PI / 4.0),
            plain(1, Some(WeaponConfig::default()), 2.0, 3.0 * PI / 4.0),
        ];
        swing(&mut fighters[0]);
        swing(&mut fighters[1]);
        fighters[0].weapon_angle = PI / 4.0;
        fighters[1].weapon_angle = 3.0 * PI / 4.0;
        let mut effects = EffectPool::new();
        let id = effects.spawn(Effect::area(payload(0, 20.0), Vec2::new(2.0, 0.0), 1.5, 0.0, 1.0));

        let result = resolver().resolve(&mut fighters, &mut effects);
        assert!(result.clash);
        assert_eq!(fighters[1].health, 100.0);
        assert!(result.events.iter().all(|e| e.kind == CombatEventKind::Clash));
        match &effects.get(id).unwrap().shape {
            EffectShape::Area { hit, .. } => assert!(hit.is_empty()),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_status_only_strike_respects_invulnerability() {
        let mut fighters = [plain(0, None, 0.0, 0.0), plain(1, None, 3.0, PI)];
        fighters[1].status.invulnerable = 0.3;
        let mut effects = EffectPool::new();
        let stun = Payload {
            effect_tag: Some(EffectTag::Stun),
            ..payload(0, 0.0)
        };
        effects.spawn(Effect::area(stun, Vec2::new(3.0, 0.0), 1.0, 0.0, 1.0));

        resolver().resolve(&mut fighters, &mut effects);
        assert_eq!(fighters[1].status.stun, 0.0);
    }

    #[test]
    fn test_status_only_strike_can_be_evaded() {
        let mut fighters = [plain(0, None, 0.0, 0.0), plain(1, None, 3.0, PI)];
        fighters[1].profile.evasion_chance = 1.0;
        let mut effects = EffectPool::new();
        let freeze = Payload {
            effect_tag: Some(EffectTag::Freeze),
            ..payload(0, 0.0)
        };
        effects.spawn(Effect::area(freeze, Vec2::new(3.0, 0.0), 1.0, 0.0, 1.0));

        resolver().resolve(&mut fighters, &mut effects);
        assert_eq!(fighters[1].status.slow, 0.0);
        assert_eq!(fighters[1].stats.evasions, 1);
    }

    #[test]
    fn test_status_only_strike_lands() {
        let mut fighters = [plain(0, None, 0.0, 0.0), plain(1, None, 3.0, PI)];
        let mut effects = EffectPool::new();
        let stun = Payload {
            effect_tag: Some(EffectTag::Stun),
            ..payload(0, 0.0)
        };
        effects.spawn(Effect::area(stun, Vec2::new(3.0, 0.0), 1.0, 0.0, 1.0));

        resolver().resolve(&mut fighters, &mut effects);
        assert!(fighters[1].status.stun > 0.0);
        assert_eq!(fighters[1].health, 100.0);
    }

    #[test]
    fn test_projectile_consumed_on_hit() {
        let mut fighters = [plain(0, None, 0.0, 0.0), plain(1, None, 3.0, PI)];
        let mut effects = EffectPool::new();
        let id = effects.spawn(Effect::projectile(
            payload(0, 10.0),
            Vec2::new(2.8, 0.0),
            Vec2::new(10.0, 0.0),
            0.3,
            10.0,
        ));
        let result = resolver().resolve(&mut fighters, &mut effects);
        assert_eq!(fighters[1].health, 90.0);
        assert_eq!(result.events[0].skill.as_deref(), Some("Test"));
        assert!(!effects.get(id).unwrap().active);
        assert_eq!(fighters[0].stats.damage_dealt, 10.0);
    }

    #[test]
    fn test_owner_is_never_hit_by_own_effect() {
        let mut fighters = [plain(0, None, 0.0, 0.0), plain(1, None, 10.0, PI)];
        let mut effects = EffectPool::new();
        effects.spawn(Effect::area(payload(0, 10.0), Vec2::ZERO, 2.0, 0.0, 1.0));
        resolver().resolve(&mut fighters, &mut effects);
        assert_eq!(fighters[0].health, 100.0);
        assert_eq!(fighters[1].health, 100.0);
    }

    #[test]
    fn test_area_hits_each_target_once() {
        let mut fighters = [plain(0, None, -10.0, 0.0), plain(1, None, 0.5, PI)];
        let mut effects = EffectPool::new();
        effects.spawn(Effect::area(payload(0, 10.0), Vec2::ZERO, 2.0, 0.0, 1.0));
        let mut resolver = resolver();
        for _ in 0..3 {
            fighters[1].status.invulnerable = 0.0;
            resolver.resolve(&mut fighters, &mut effects);
        }
        assert_eq!(fighters[1].health, 90.0);
    }

    #[test]
    fn test_beam_tests_once() {
        let mut fighters = [plain(0, None, 0.0, 0.0), plain(1, None, 20.0, PI)];
        let mut effects = EffectPool::new();
        let id = effects.spawn(Effect::beam(
            payload(0, 10.0),
            Vec2::ZERO,
            Vec2::new(1.0, 0.0),
            8.0,
            0.4,
            0.3,
        ));
        let mut resolver = resolver();
        resolver.resolve(&mut fighters, &mut effects);
        // Target walks into the beam after it fired
        fighters[1].position = Vec2::new(4.0, 0.0);
        resolver.resolve(&mut fighters, &mut effects);
        assert_eq!(fighters[1].health, 100.0);
        match &effects.get(id).unwrap().shape {
            EffectShape::Beam {
                fired, hit_applied, ..
            } => {
                assert!(*fired);
                assert!(!*hit_applied);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_lifesteal_heals_attacker() {
        let mut fighters = [plain(0, None, 0.0, 0.0), plain(1, None, 3.0, PI)];
        fighters[0].profile.lifesteal = 0.5;
        fighters[0].health = 50.0;
        let mut effects = EffectPool::new();
        effects.spawn(Effect::area(payload(0, 20.0), Vec2::new(3.0, 0.0), 1.0, 0.0, 1.0));
        resolver().resolve(&mut fighters, &mut effects);
        assert_eq!(fighters[1].health, 80.0);
        assert_eq!(fighters[0].health, 60.0);
    }

    #[test]
    fn test_guaranteed_crit() {
        let mut fighters = [plain(0, None, 0.0, 0.0), plain(1, None, 3.0, PI)];
        fighters[0].profile.crit_chance = 1.0;
        fighters[0].profile.crit_multiplier = 2.0;
        let mut effects = EffectPool::new();
        effects.spawn(Effect::area(payload(0, 10.0), Vec2::new(3.0, 0.0), 1.0, 0.0, 1.0));
        let result = resolver().resolve(&mut fighters, &mut effects);
        assert_eq!(result.events[0].kind, CombatEventKind::Crit);
        assert_eq!(fighters[1].health, 80.0);
        assert_eq!(fighters[0].stats.crits, 1);
    }

    #[test]
    fn test_shielded_hit_still_counts() {
        let mut fighters = [plain(0, None, 0.0, 0.0), plain(1, None, 3.0, PI)];
        fighters[1].buffs.push(Buff::shield(20.0, 5.0));
        let mut effects = EffectPool::new();
        effects.spawn(Effect::area(payload(0, 15.0), Vec2::new(3.0, 0.0), 1.0, 0.0, 1.0));
        let result = resolver().resolve(&mut fighters, &mut effects);
        assert_eq!(fighters[1].health, 100.0);
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].amount, Some(0.0));
    }

    #[test]
    fn test_first_lethal_is_recorded() {
        let mut fighters = [plain(0, None, 0.0, 0.0), plain(1, None, 3.0, PI)];
        fighters[1].health = 5.0;
        let mut effects = EffectPool::new();
        effects.spawn(Effect::area(payload(0, 30.0), Vec2::new(3.0, 0.0), 1.0, 0.0, 1.0));
        effects.spawn(Effect::area(payload(1, 30.0), Vec2::ZERO, 1.0, 0.0, 1.0));
        let result = resolver().resolve(&mut fighters, &mut effects);
        assert_eq!(result.lethal, Some(1));
        assert!(result.heavy_hit);
        // The dead fighter's effect is still resolved against the living one
        assert!(fighters[1].dead);
        assert_eq!(fighters[0].health, 70.0);
    }

    #[test]
    fn test_bodies_pushed_apart() {
        let mut a = plain(0, None, 0.0, 0.0);
        let mut b = plain(1, None, 0.6, PI);
        let resolver = resolver();
        resolver.separate_bodies(&mut a, &mut b);
        assert!(b.position.x - a.position.x > 0.6);

        // Airborne fighters pass over each other
        let mut c = plain(0, None, 0.0, 0.0);
        let mut d = plain(1, None, 0.6, PI);
        d.z = 2.0;
        resolver.separate_bodies(&mut c, &mut d);
        assert_eq!(d.position.x, 0.6);
    }
}
