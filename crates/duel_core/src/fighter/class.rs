//! Class profiles: per-class combat modifiers keyed by class name.

use serde::{Deserialize, Serialize};

/// Health fraction below which low-HP damage bonuses apply.
pub const LOW_HP_FRACTION: f32 = 0.3;

/// Combat modifiers derived from a fighter's class name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProfile {
    /// Multiplier on incoming damage (lower is tankier).
    pub defense_multiplier: f32,
    /// Chance to evade an incoming hit entirely.
    pub evasion_chance: f32,
    /// Fraction shaved off mana costs.
    pub mana_discount: f32,
    /// Chance for an outgoing hit to crit.
    pub crit_chance: f32,
    /// Damage multiplier on a crit.
    pub crit_multiplier: f32,
    /// Extra outgoing damage fraction while below [`LOW_HP_FRACTION`].
    pub low_hp_damage_bonus: f32,
    /// Fraction of dealt health damage returned as healing.
    pub lifesteal: f32,
}

impl Default for ClassProfile {
    fn default() -> Self {
        Self {
            defense_multiplier: 1.0,
            evasion_chance: 0.0,
            mana_discount: 0.0,
            crit_chance: 0.05,
            crit_multiplier: 1.5,
            low_hp_damage_bonus: 0.0,
            lifesteal: 0.0,
        }
    }
}

const CASTER_TAGS: &[&str] = &[
    "mage", "wizard", "sorcer", "warlock", "necro", "druid", "pyro", "cryo",
];
const ROGUE_TAGS: &[&str] = &["assassin", "rogue", "ninja", "thief"];
const TANK_TAGS: &[&str] = &["tank", "paladin", "knight", "guard"];
const BERSERK_TAGS: &[&str] = &["berserk", "barbarian"];
const VAMPIRE_TAGS: &[&str] = &["vampir", "blood"];

/// Case-insensitive substring match against any of `tags`.
pub(crate) fn matches_any(class_name: &str, tags: &[&str]) -> bool {
    let lower = class_name.to_lowercase();
    tags.iter().any(|tag| lower.contains(tag))
}

/// Which broad family a class name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassFamily {
    /// Spellcasters.
    Caster,
    /// Assassins and rogues.
    Rogue,
    /// Tanks and holy knights.
    Tank,
    /// Berserkers and barbarians.
    Berserker,
    /// Anything else.
    Other,
}

impl ClassFamily {
    /// Classify a class name. Earlier families win on overlapping names.
    #[must_use]
    pub fn of(class_name: &str) -> Self {
        if matches_any(class_name, CASTER_TAGS) {
            Self::Caster
        } else if matches_any(class_name, ROGUE_TAGS) {
            Self::Rogue
        } else if matches_any(class_name, TANK_TAGS) {
            Self::Tank
        } else if matches_any(class_name, BERSERK_TAGS) {
            Self::Berserker
        } else {
            Self::Other
        }
    }
}

impl ClassProfile {
    /// Profile for a class name. Unknown classes get the neutral default.
    #[must_use]
    pub fn from_class_name(class_name: &str) -> Self {
        let base = Self::default();
        let mut profile = match ClassFamily::of(class_name) {
            ClassFamily::Caster => Self {
                defense_multiplier: 1.1,
                mana_discount: 0.2,
                ..base
            },
            ClassFamily::Rogue => Self {
                evasion_chance: 0.15,
                crit_chance: 0.2,
                crit_multiplier: 2.0,
                ..base
            },
            ClassFamily::Tank => Self {
                defense_multiplier: 0.75,
                crit_chance: 0.0,
                ..base
            },
            ClassFamily::Berserker => Self {
                defense_multiplier: 1.1,
                low_hp_damage_bonus: 0.5,
                lifesteal: 0.1,
                ..base
            },
            ClassFamily::Other => base,
        };
        if matches_any(class_name, VAMPIRE_TAGS) {
            profile.lifesteal = profile.lifesteal.max(0.25);
        }
        profile
    }

    /// Outgoing damage factor from the low-HP bonus at `health_fraction`.
    #[must_use]
    pub fn low_hp_factor(&self, health_fraction: f32) -> f32 {
        if health_fraction < LOW_HP_FRACTION {
            1.0 + self.low_hp_damage_bonus
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_classification() {
        assert_eq!(ClassFamily::of("Pyromancer"), ClassFamily::Caster);
        assert_eq!(ClassFamily::of("Shadow NINJA"), ClassFamily::Rogue);
        assert_eq!(ClassFamily::of("Paladin"), ClassFamily::Tank);
        assert_eq!(ClassFamily::of("Barbarian"), ClassFamily::Berserker);
        assert_eq!(ClassFamily::of("Farmer"), ClassFamily::Other);
    }

    #[test]
    fn test_default_profile_is_neutral_on_defense() {
        let profile = ClassProfile::from_class_name("Warrior");
        assert_eq!(profile.defense_multiplier, 1.0);
        assert_eq!(profile.evasion_chance, 0.0);
    }

    #[test]
    fn test_low_hp_factor() {
        let profile = ClassProfile::from_class_name("Berserker");
        assert_eq!(profile.low_hp_factor(0.9), 1.0);
        assert!((profile.low_hp_factor(0.1) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_vampire_tag_adds_lifesteal() {
        let profile = ClassProfile::from_class_name("Blood Knight");
        assert_eq!(profile.defense_multiplier, 0.75);
        assert!(profile.lifesteal >= 0.25);
    }
}
