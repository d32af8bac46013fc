//! Test fixtures and helpers.
//!
//! Pre-built fighter configurations, weapons, arenas and duels for
//! consistent testing.

use std::sync::Arc;

use duel_core::arena::{Arena, BoxArena};
use duel_core::config::{DuelConfig, FighterConfig, WeaponConfig, WeaponShape, WeaponWeight};
use duel_core::events::FighterId;
use duel_core::fighter::Fighter;
use duel_core::math::Vec2;
use duel_core::simulation::Duel;
use duel_core::skills::SkillCatalog;

/// Side length of the default square test arena.
pub const ARENA_SIZE: f32 = 20.0;

// ============================================================================
// Arenas
// ============================================================================

/// An open square arena centred on the origin.
#[must_use]
pub fn open_arena(size: f32) -> Arc<dyn Arena> {
    Arc::new(BoxArena::open(size, size))
}

/// The default open arena.
#[must_use]
pub fn default_arena() -> Arc<dyn Arena> {
    open_arena(ARENA_SIZE)
}

/// A square arena with a pillar on each side of the centre line.
#[must_use]
pub fn pillar_arena() -> Arc<dyn Arena> {
    Arc::new(
        BoxArena::open(ARENA_SIZE, ARENA_SIZE)
            .with_obstacle(Vec2::new(0.0, 3.0), 1.0)
            .with_obstacle(Vec2::new(0.0, -3.0), 1.0),
    )
}

// ============================================================================
// Weapons
// ============================================================================

/// A medium line sword.
#[must_use]
pub fn sword() -> WeaponConfig {
    WeaponConfig {
        name: "Sword".to_string(),
        ..WeaponConfig::default()
    }
}

/// A heavy two-handed hammer.
#[must_use]
pub fn hammer() -> WeaponConfig {
    WeaponConfig {
        name: "Hammer".to_string(),
        weight: WeaponWeight::Heavy,
        damage: 22.0,
        swing_time: 0.8,
        ..WeaponConfig::default()
    }
}

/// A long spear.
#[must_use]
pub fn spear() -> WeaponConfig {
    WeaponConfig {
        name: "Spear".to_string(),
        blade_length: 2.2,
        damage: 10.0,
        ..WeaponConfig::default()
    }
}

/// An orbital flail.
#[must_use]
pub fn flail() -> WeaponConfig {
    WeaponConfig {
        name: "Flail".to_string(),
        shape: WeaponShape::Orbital,
        weight: WeaponWeight::Heavy,
        arc_width_deg: 90.0,
        ..WeaponConfig::default()
    }
}

/// A weapon carrying the named skills.
#[must_use]
pub fn weapon_with_skills(skills: &[&str]) -> WeaponConfig {
    WeaponConfig {
        skills: skills.iter().map(|s| (*s).to_string()).collect(),
        ..sword()
    }
}

// ============================================================================
// Fighters
// ============================================================================

/// A balanced sword fighter.
#[must_use]
pub fn warrior() -> FighterConfig {
    FighterConfig::new("Aldric", "Warrior").with_weapon(Some(sword()))
}

/// A fire caster with a staff.
#[must_use]
pub fn mage() -> FighterConfig {
    let staff = WeaponConfig {
        name: "Staff".to_string(),
        damage: 6.0,
        skills: vec!["Fireball".to_string(), "Flame Ring".to_string()],
        ..WeaponConfig::default()
    };
    FighterConfig::new("Ayla", "Pyromancer").with_weapon(Some(staff))
}

/// A light-weapon rogue.
#[must_use]
pub fn rogue() -> FighterConfig {
    let dagger = WeaponConfig {
        name: "Dagger".to_string(),
        weight: WeaponWeight::Light,
        blade_length: 0.6,
        damage: 8.0,
        skills: vec!["Shadow Step".to_string(), "Poison Dart".to_string()],
        ..WeaponConfig::default()
    };
    FighterConfig::new("Vex", "Rogue").with_weapon(Some(dagger))
}

/// A shielded paladin with a flail.
#[must_use]
pub fn paladin() -> FighterConfig {
    let mut weapon = flail();
    weapon.skills = vec!["Stone Skin".to_string()];
    FighterConfig::new("Bram", "Paladin").with_weapon(Some(weapon))
}

/// An unarmed fighter.
#[must_use]
pub fn unarmed() -> FighterConfig {
    FighterConfig::new("Dusk", "Monk").with_weapon(None)
}

/// Build a fighter at `position` facing `facing`.
#[must_use]
pub fn fighter_at(id: FighterId, config: &FighterConfig, position: Vec2, facing: f32) -> Fighter {
    Fighter::new(id, config, &SkillCatalog::builtin()).at(position, facing)
}

/// A fighter with no crits, evasion or resistance, so damage is exact.
#[must_use]
pub fn plain_fighter(id: FighterId, weapon: Option<WeaponConfig>, position: Vec2) -> Fighter {
    let config = FighterConfig::new(format!("Plain{id}"), "Farmer").with_weapon(weapon);
    let mut fighter = fighter_at(id, &config, position, 0.0);
    fighter.profile.crit_chance = 0.0;
    fighter.profile.evasion_chance = 0.0;
    fighter.profile.defense_multiplier = 1.0;
    fighter
}

/// Put a fighter in the middle of its swing's active window.
pub fn mid_swing(fighter: &mut Fighter) {
    fighter.attack.attacking = true;
    fighter.attack.hit_registered = false;
    fighter.attack.duration = 1.0;
    fighter.attack.timer = 0.5;
}

// ============================================================================
// Duels
// ============================================================================

/// A duel between two configurations in the default arena, without
/// hit-stop or slow motion.
#[must_use]
pub fn duel_between(red: &FighterConfig, blue: &FighterConfig, seed: u64) -> Duel {
    Duel::new(
        red,
        blue,
        default_arena(),
        SkillCatalog::builtin(),
        DuelConfig::default().without_feedback(),
        seed,
    )
}

/// Warrior vs rogue.
#[must_use]
pub fn standard_duel(seed: u64) -> Duel {
    duel_between(&warrior(), &rogue(), seed)
}

/// Mage vs paladin among pillars; exercises projectiles, areas and shields.
#[must_use]
pub fn skirmish_duel(seed: u64) -> Duel {
    Duel::new(
        &mage(),
        &paladin(),
        pillar_arena(),
        SkillCatalog::builtin(),
        DuelConfig::default().without_feedback(),
        seed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_configs_validate() {
        for config in [warrior(), mage(), rogue(), paladin(), unarmed()] {
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_fixture_skills_exist() {
        let catalog = SkillCatalog::builtin();
        for config in [mage(), rogue(), paladin()] {
            for skill in &config.weapon.unwrap().skills {
                assert!(catalog.contains(skill), "missing {skill}");
            }
        }
    }

    #[test]
    fn test_plain_fighter_is_exact() {
        let fighter = plain_fighter(0, None, Vec2::ZERO);
        assert_eq!(fighter.profile.crit_chance, 0.0);
        assert_eq!(fighter.profile.evasion_chance, 0.0);
        assert_eq!(fighter.resistance, 0.0);
    }
}
