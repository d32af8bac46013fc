//! Archetypes and traits: the fixed personality of a brain.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::{WeaponConfig, WeaponShape, WeaponWeight};
use crate::fighter::ClassFamily;
use crate::rng::DuelRng;

/// Ideal range of an unarmed fighter.
pub const UNARMED_IDEAL_RANGE: f32 = 1.2;
/// Ideal range of casters.
pub const CASTER_IDEAL_RANGE: f32 = 7.0;

/// Coarse tactical persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Keeps distance and casts.
    Mage,
    /// Fast, close-range striker.
    Assassin,
    /// Defensive anchor.
    Sentinel,
    /// Slow heavy hitter.
    Colossus,
    /// Holds a range band and pokes.
    Spearman,
    /// Balanced melee.
    Warrior,
    /// Grows more aggressive as health drops.
    Berserker,
    /// Unarmed.
    Brawler,
}

impl Archetype {
    /// Archetypes that dash in and widen area triggers.
    #[must_use]
    pub const fn is_aggressive(self) -> bool {
        matches!(
            self,
            Self::Assassin | Self::Berserker | Self::Colossus | Self::Brawler
        )
    }
}

/// Derive the archetype and base ideal range.
///
/// A missing weapon always yields [`Archetype::Brawler`]. Otherwise class
/// names take priority, then weapon shape and weight.
#[must_use]
pub fn derive_archetype(
    class_name: &str,
    weapon: Option<&WeaponConfig>,
    scale: f32,
    body_radius: f32,
) -> (Archetype, f32) {
    let Some(weapon) = weapon else {
        return (Archetype::Brawler, UNARMED_IDEAL_RANGE);
    };
    let reach = weapon.reach(scale) + body_radius;
    let orbit = weapon.orbit_distance * scale;

    match ClassFamily::of(class_name) {
        ClassFamily::Caster => (Archetype::Mage, CASTER_IDEAL_RANGE),
        ClassFamily::Rogue => (Archetype::Assassin, (reach * 0.7).max(0.8)),
        ClassFamily::Tank if weapon.shape.is_polar() => (Archetype::Sentinel, orbit),
        ClassFamily::Tank => (Archetype::Sentinel, reach * 0.9),
        ClassFamily::Berserker => (Archetype::Berserker, reach * 0.8),
        ClassFamily::Other => match (weapon.shape, weapon.weight) {
            (WeaponShape::Orbital, _) => (Archetype::Sentinel, orbit),
            (_, WeaponWeight::Heavy) => (Archetype::Colossus, reach * 0.85),
            (_, WeaponWeight::Light) => (Archetype::Assassin, (reach * 0.7).max(0.8)),
            _ if weapon.is_long(scale) => (Archetype::Spearman, reach * 0.9),
            _ => (Archetype::Warrior, reach * 0.8),
        },
    }
}

/// Personality tag perturbing archetype defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trait {
    /// Fights closer, turns passive moves into approaches.
    Reckless,
    /// Keeps further away, scares easily.
    Cowardly,
    /// Throws projectiles opportunistically.
    Spammer,
    /// Tempers all-out aggression.
    Calculating,
    /// Presses cornered opponents harder.
    Predator,
    /// Turns passive moves into approaches.
    Aggressive,
    /// Keeps a little more distance.
    Defensive,
    /// Slow to anger.
    Patient,
    /// Unpredictable strafing and hops.
    Erratic,
    /// Slow to fear.
    Stalwart,
}

impl Trait {
    /// The full pool traits are sampled from.
    pub const ALL: [Self; 10] = [
        Self::Reckless,
        Self::Cowardly,
        Self::Spammer,
        Self::Calculating,
        Self::Predator,
        Self::Aggressive,
        Self::Defensive,
        Self::Patient,
        Self::Erratic,
        Self::Stalwart,
    ];

    /// One-time multiplier on the ideal range.
    #[must_use]
    pub const fn range_multiplier(self) -> f32 {
        match self {
            Self::Reckless => 0.8,
            Self::Cowardly => 1.2,
            Self::Calculating => 1.05,
            Self::Predator => 0.9,
            Self::Aggressive => 0.85,
            Self::Defensive => 1.1,
            Self::Stalwart => 0.95,
            Self::Spammer | Self::Patient | Self::Erratic => 1.0,
        }
    }

    /// Traits that convert passive actions into approaches.
    #[must_use]
    pub const fn is_aggressive(self) -> bool {
        matches!(self, Self::Reckless | Self::Aggressive | Self::Predator)
    }

    /// Multiplier on fear gained from damage.
    #[must_use]
    pub const fn fear_gain(self) -> f32 {
        match self {
            Self::Cowardly => 1.5,
            Self::Stalwart => 0.5,
            _ => 1.0,
        }
    }

    /// Multiplier on rage gained from damage.
    #[must_use]
    pub const fn rage_gain(self) -> f32 {
        match self {
            Self::Patient => 0.5,
            Self::Reckless => 1.3,
            _ => 1.0,
        }
    }
}

/// Sample two distinct traits.
pub fn sample_traits(rng: &mut DuelRng) -> [Trait; 2] {
    let mut picked = Trait::ALL.choose_multiple(rng, 2).copied();
    match (picked.next(), picked.next()) {
        (Some(a), Some(b)) => [a, b],
        _ => [Trait::Patient, Trait::Stalwart],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    fn weapon(shape: WeaponShape, weight: WeaponWeight, blade: f32) -> WeaponConfig {
        WeaponConfig {
            shape,
            weight,
            blade_length: blade,
            ..WeaponConfig::default()
        }
    }

    #[test]
    fn test_class_rules_take_priority() {
        let hammer = weapon(WeaponShape::Line, WeaponWeight::Heavy, 1.0);
        let (arch, range) = derive_archetype("Pyromancer", Some(&hammer), 1.0, 0.5);
        assert_eq!(arch, Archetype::Mage);
        assert_eq!(range, CASTER_IDEAL_RANGE);

        let (arch, _) = derive_archetype("Rogue", Some(&hammer), 1.0, 0.5);
        assert_eq!(arch, Archetype::Assassin);
        let (arch, _) = derive_archetype("Paladin", Some(&hammer), 1.0, 0.5);
        assert_eq!(arch, Archetype::Sentinel);
    }

    #[test]
    fn test_weapon_fallback_rules() {
        let cases = [
            (weapon(WeaponShape::Orbital, WeaponWeight::Heavy, 1.0), Archetype::Sentinel),
            (weapon(WeaponShape::Line, WeaponWeight::Heavy, 1.0), Archetype::Colossus),
            (weapon(WeaponShape::Line, WeaponWeight::Light, 0.6), Archetype::Assassin),
            (weapon(WeaponShape::Line, WeaponWeight::Medium, 2.2), Archetype::Spearman),
            (weapon(WeaponShape::Line, WeaponWeight::Medium, 1.0), Archetype::Warrior),
        ];
        for (w, expected) in cases {
            assert_eq!(derive_archetype("Farmer", Some(&w), 1.0, 0.5).0, expected);
        }
    }

    #[test]
    fn test_missing_weapon_is_brawler() {
        let (arch, range) = derive_archetype("Archmage", None, 1.0, 0.5);
        assert_eq!(arch, Archetype::Brawler);
        assert_eq!(range, UNARMED_IDEAL_RANGE);
    }

    #[test]
    fn test_ideal_range_scales_with_size() {
        let sword = weapon(WeaponShape::Line, WeaponWeight::Medium, 1.0);
        let small = derive_archetype("Farmer", Some(&sword), 1.0, 0.5).1;
        let big = derive_archetype("Farmer", Some(&sword), 2.0, 1.0).1;
        assert!(big > small);
    }

    #[test]
    fn test_traits_are_distinct_and_seeded() {
        for seed in 0..20 {
            let [a, b] = sample_traits(&mut seeded(seed));
            assert_ne!(a, b);
            assert_eq!(sample_traits(&mut seeded(seed)), [a, b]);
        }
    }
}
