//! Combat events drained each tick for external consumers.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;
use crate::skills::EffectTag;

/// Identifier for a fighter within a duel (0 = red, 1 = blue).
pub type FighterId = u32;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatEventKind {
    /// Damage landed.
    Hit,
    /// Damage landed with a critical roll.
    Crit,
    /// Both weapons met; nobody took damage.
    Clash,
    /// A skill was cast successfully.
    SkillCast,
    /// A fighter died.
    Death,
}

/// One combat event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEvent {
    /// Event kind.
    pub kind: CombatEventKind,
    /// Acting fighter (for deaths, the killer, or the fallen fighter when
    /// nobody is credited).
    pub attacker: FighterId,
    /// Affected fighter, if any.
    pub defender: Option<FighterId>,
    /// Damage dealt, if any.
    pub amount: Option<f32>,
    /// Status tag carried by the hit or skill.
    pub effect: Option<EffectTag>,
    /// World position of the event.
    pub position: Vec2,
    /// Skill name for casts and skill hits.
    pub skill: Option<String>,
}

impl CombatEvent {
    fn base(kind: CombatEventKind, attacker: FighterId, position: Vec2) -> Self {
        Self {
            kind,
            attacker,
            defender: None,
            amount: None,
            effect: None,
            position,
            skill: None,
        }
    }

    /// A damage event; `crit` selects the kind.
    #[must_use]
    pub fn hit(
        attacker: FighterId,
        defender: FighterId,
        amount: f32,
        crit: bool,
        position: Vec2,
    ) -> Self {
        let kind = if crit {
            CombatEventKind::Crit
        } else {
            CombatEventKind::Hit
        };
        Self {
            defender: Some(defender),
            amount: Some(amount),
            ..Self::base(kind, attacker, position)
        }
    }

    /// Weapons met between `a` and `b`.
    #[must_use]
    pub fn clash(a: FighterId, b: FighterId, position: Vec2) -> Self {
        Self {
            defender: Some(b),
            ..Self::base(CombatEventKind::Clash, a, position)
        }
    }

    /// `caster` used a skill.
    #[must_use]
    pub fn skill_cast(caster: FighterId, skill: &str, position: Vec2) -> Self {
        Self {
            skill: Some(skill.to_string()),
            ..Self::base(CombatEventKind::SkillCast, caster, position)
        }
    }

    /// `fallen` died, killed by `killer` when known.
    #[must_use]
    pub fn death(fallen: FighterId, killer: Option<FighterId>, position: Vec2) -> Self {
        Self {
            defender: Some(fallen),
            ..Self::base(CombatEventKind::Death, killer.unwrap_or(fallen), position)
        }
    }

    /// Builder method to attach a status tag.
    #[must_use]
    pub fn with_effect(mut self, effect: Option<EffectTag>) -> Self {
        self.effect = effect;
        self
    }

    /// Builder method to attach a skill name.
    #[must_use]
    pub fn with_skill(mut self, skill: Option<&str>) -> Self {
        self.skill = skill.map(str::to_string);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_kind_follows_crit_flag() {
        let plain = CombatEvent::hit(0, 1, 10.0, false, Vec2::ZERO);
        let crit = CombatEvent::hit(0, 1, 10.0, true, Vec2::ZERO);
        assert_eq!(plain.kind, CombatEventKind::Hit);
        assert_eq!(crit.kind, CombatEventKind::Crit);
        assert_eq!(crit.defender, Some(1));
        assert_eq!(crit.amount, Some(10.0));
    }

    #[test]
    fn test_builders_attach_details() {
        let event = CombatEvent::hit(1, 0, 4.0, false, Vec2::ZERO)
            .with_effect(Some(EffectTag::Burn))
            .with_skill(Some("Fireball"));
        assert_eq!(event.effect, Some(EffectTag::Burn));
        assert_eq!(event.skill.as_deref(), Some("Fireball"));

        let death = CombatEvent::death(1, Some(0), Vec2::new(2.0, 0.0));
        assert_eq!(death.kind, CombatEventKind::Death);
        assert_eq!(death.attacker, 0);
        assert_eq!(death.defender, Some(1));
    }

    #[test]
    fn test_uncredited_death_names_the_fallen() {
        let death = CombatEvent::death(1, None, Vec2::ZERO);
        assert_eq!(death.attacker, 1);
        assert_eq!(death.defender, Some(1));
    }
}
