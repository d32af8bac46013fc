//! Per-tick skill heuristics.
//!
//! Every equipped skill is checked in slot order; the first one that is
//! castable and whose type-specific condition holds is chosen, along with
//! the bearing to cast it on.

use std::f32::consts::PI;

use crate::fighter::{BuffKind, Fighter};
use crate::rng::{roll, DuelRng};
use crate::skills::{EffectTag, SkillDefinition, SkillEffect};

use super::archetype::{Archetype, Trait};
use super::{Persona, Situation};

/// Fear above which a dash is used to escape.
pub const FEAR_DASH_THRESHOLD: f32 = 40.0;
/// Health fraction below which a dash is used to escape.
pub const DEFENSIVE_DASH_HEALTH: f32 = 0.3;
/// Health fraction below which heals and emergency shields are cast.
pub const HEAL_HEALTH: f32 = 0.5;
/// Per-tick chance a spammer throws a projectile outside its band.
pub const SPAMMER_CHANCE: f32 = 0.02;
/// Distance within which assassins throw projectiles.
pub const ASSASSIN_PROJECTILE_RANGE: f32 = 4.0;
/// Distance under which a full-health fighter counts as entering combat.
pub const ENGAGE_DISTANCE: f32 = 5.0;
/// Distance beyond which speed buffs are worth casting.
pub const SPEED_BUFF_DISTANCE: f32 = 6.0;

const AREA_MARGIN: f32 = 0.5;
const AGGRESSIVE_AREA_MARGIN: f32 = 1.2;

/// A skill to cast and where to aim it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillChoice {
    /// Skill slot.
    pub slot: usize,
    /// Bearing to face while casting.
    pub bearing: f32,
}

/// Pick a skill to cast this tick, if any.
pub fn choose_skill(
    persona: &Persona,
    situation: &Situation,
    me: &Fighter,
    rng: &mut DuelRng,
) -> Option<SkillChoice> {
    for (slot, skill) in me.skills.iter().enumerate() {
        if !me.can_use_skill(slot) {
            continue;
        }
        if let Some(bearing) = evaluate(persona, situation, me, skill, rng) {
            return Some(SkillChoice { slot, bearing });
        }
    }
    None
}

fn evaluate(
    persona: &Persona,
    s: &Situation,
    me: &Fighter,
    skill: &SkillDefinition,
    rng: &mut DuelRng,
) -> Option<f32> {
    match skill.effect {
        SkillEffect::Projectile { range, .. } => {
            let in_band = match persona.archetype {
                Archetype::Mage => s.distance >= persona.ideal_range * 0.5 && s.distance <= range,
                Archetype::Assassin => s.distance <= ASSASSIN_PROJECTILE_RANGE.min(range),
                _ => s.distance <= range * 0.7 && s.distance > s.melee_reach,
            };
            let spam = persona.has_trait(Trait::Spammer)
                && s.distance <= range
                && roll(rng, SPAMMER_CHANCE);
            (in_band || spam).then_some(s.bearing)
        }
        SkillEffect::Beam { range, .. } => (s.distance < range).then_some(s.bearing),
        SkillEffect::Area { radius, .. } => {
            let margin = if persona.archetype.is_aggressive() {
                AGGRESSIVE_AREA_MARGIN
            } else {
                AREA_MARGIN
            };
            (s.distance <= radius + margin).then_some(s.bearing)
        }
        SkillEffect::Dash { distance, .. } => {
            if s.fear > FEAR_DASH_THRESHOLD || s.health_fraction < DEFENSIVE_DASH_HEALTH {
                Some(s.escape_bearing.unwrap_or(s.bearing + PI))
            } else if persona.archetype.is_aggressive()
                && s.distance > s.melee_reach + 0.5
                && s.distance <= distance + s.melee_reach
            {
                Some(s.bearing)
            } else {
                None
            }
        }
        SkillEffect::Buff { .. } => buff_wanted(skill.effect_tag, s, me).then_some(s.bearing),
        SkillEffect::None => None,
    }
}

fn buff_wanted(tag: Option<EffectTag>, s: &Situation, me: &Fighter) -> bool {
    match tag {
        Some(EffectTag::Heal) => {
            s.health_fraction < HEAL_HEALTH && !me.has_buff(&BuffKind::Regen { per_second: 0.0 })
        }
        Some(EffectTag::SpeedBuff) => {
            s.distance > SPEED_BUFF_DISTANCE
                && !me.has_buff(&BuffKind::Speed { multiplier: 1.0 })
        }
        Some(EffectTag::DamageBuff) => {
            s.distance <= s.melee_reach * 1.5
                && !me.has_buff(&BuffKind::Damage { multiplier: 1.0 })
        }
        _ => {
            let entering_combat = s.health_fraction >= 0.99 && s.distance < ENGAGE_DISTANCE;
            (entering_combat || s.health_fraction < HEAL_HEALTH) && me.shield_total() <= 0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FighterConfig, WeaponConfig};
    use crate::rng::seeded;
    use crate::skills::SkillCatalog;

    fn with_skills(skills: &[&str]) -> Fighter {
        let weapon = WeaponConfig {
            skills: skills.iter().map(|s| (*s).to_string()).collect(),
            ..WeaponConfig::default()
        };
        let config = FighterConfig::new("T", "Warrior").with_weapon(Some(weapon));
        Fighter::new(0, &config, &SkillCatalog::builtin())
    }

    fn persona(archetype: Archetype) -> Persona {
        Persona {
            archetype,
            traits: [Trait::Patient, Trait::Stalwart],
            ideal_range: 2.0,
        }
    }

    fn at_distance(distance: f32) -> Situation {
        Situation {
            distance,
            bearing: 0.0,
            melee_reach: 2.0,
            ..Situation::default()
        }
    }

    #[test]
    fn test_beam_within_range() {
        let me = with_skills(&["Lightning Beam"]);
        let mut rng = seeded(1);
        let p = persona(Archetype::Warrior);
        assert!(choose_skill(&p, &at_distance(5.0), &me, &mut rng).is_some());
        assert!(choose_skill(&p, &at_distance(9.0), &me, &mut rng).is_none());
    }

    #[test]
    fn test_area_margin_is_wider_for_aggressive_archetypes() {
        let me = with_skills(&["Flame Ring"]);
        let mut rng = seeded(1);
        let s = at_distance(3.4);
        assert!(choose_skill(&persona(Archetype::Warrior), &s, &me, &mut rng).is_none());
        assert!(choose_skill(&persona(Archetype::Berserker), &s, &me, &mut rng).is_some());
    }

    #[test]
    fn test_cooldown_blocks_choice() {
        let mut me = with_skills(&["Lightning Beam"]);
        me.cooldowns.insert("Lightning Beam".to_string(), 1.0);
        let mut rng = seeded(1);
        let p = persona(Archetype::Warrior);
        assert!(choose_skill(&p, &at_distance(3.0), &me, &mut rng).is_none());
    }

    #[test]
    fn test_defensive_dash_faces_away() {
        let me = with_skills(&["Shadow Step"]);
        let mut rng = seeded(1);
        let s = Situation {
            health_fraction: 0.2,
            ..at_distance(2.0)
        };
        let choice = choose_skill(&persona(Archetype::Warrior), &s, &me, &mut rng).unwrap();
        assert!((choice.bearing - PI).abs() < 1e-5);
    }

    #[test]
    fn test_heal_only_when_hurt() {
        let me = with_skills(&["Healing Light"]);
        let mut rng = seeded(1);
        let p = persona(Archetype::Warrior);
        let healthy = Situation {
            health_fraction: 0.9,
            ..at_distance(3.0)
        };
        let hurt = Situation {
            health_fraction: 0.4,
            ..at_distance(3.0)
        };
        assert!(choose_skill(&p, &healthy, &me, &mut rng).is_none());
        assert!(choose_skill(&p, &hurt, &me, &mut rng).is_some());
    }

    #[test]
    fn test_shield_on_entering_combat() {
        let mut me = with_skills(&["Stone Skin"]);
        let mut rng = seeded(1);
        let p = persona(Archetype::Sentinel);
        let s = Situation {
            health_fraction: 1.0,
            ..at_distance(4.0)
        };
        assert!(choose_skill(&p, &s, &me, &mut rng).is_some());
        me.buffs.push(crate::fighter::Buff::shield(10.0, 5.0));
        assert!(choose_skill(&p, &s, &me, &mut rng).is_none());
    }

    #[test]
    fn test_mage_projectile_band() {
        let me = with_skills(&["Fireball"]);
        let mut rng = seeded(1);
        let mage = Persona {
            ideal_range: 7.0,
            ..persona(Archetype::Mage)
        };
        assert!(choose_skill(&mage, &at_distance(8.0), &me, &mut rng).is_some());
        assert!(choose_skill(&mage, &at_distance(2.0), &me, &mut rng).is_none());
    }
}
