//! Built-in fighter presets, one per archetype.
//!
//! Preset class names and weapons are chosen so that each derives the
//! archetype it is named after.

use duel_core::config::{FighterConfig, WeaponConfig, WeaponShape, WeaponWeight};
use duel_core::skills::EffectTag;

/// Names accepted by [`preset`], in listing order.
pub const PRESET_NAMES: [&str; 8] = [
    "warrior",
    "mage",
    "assassin",
    "paladin",
    "berserker",
    "spearman",
    "colossus",
    "brawler",
];

/// Look up a preset by name (case-insensitive).
#[must_use]
pub fn preset(name: &str) -> Option<FighterConfig> {
    let config = match name.to_lowercase().as_str() {
        "warrior" => warrior(),
        "mage" => mage(),
        "assassin" => assassin(),
        "paladin" => paladin(),
        "berserker" => berserker(),
        "spearman" => spearman(),
        "colossus" => colossus(),
        "brawler" => brawler(),
        _ => return None,
    };
    Some(config)
}

/// All presets with their names.
#[must_use]
pub fn all() -> Vec<(&'static str, FighterConfig)> {
    PRESET_NAMES
        .iter()
        .filter_map(|name| preset(name).map(|config| (*name, config)))
        .collect()
}

fn skills(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

fn warrior() -> FighterConfig {
    FighterConfig {
        force: 12.0,
        ..FighterConfig::new("Aldric", "Warrior").with_weapon(Some(WeaponConfig {
            name: "Longsword".to_string(),
            skills: skills(&["Charge", "Battle Cry"]),
            ..WeaponConfig::default()
        }))
    }
}

fn mage() -> FighterConfig {
    FighterConfig {
        mana: 150.0,
        health: 85.0,
        ..FighterConfig::new("Ayla", "Pyromancer").with_weapon(Some(WeaponConfig {
            name: "Staff".to_string(),
            damage: 6.0,
            blade_length: 1.2,
            skills: skills(&["Fireball", "Flame Ring", "Frost Nova"]),
            ..WeaponConfig::default()
        }))
    }
}

fn assassin() -> FighterConfig {
    FighterConfig {
        speed: 5.5,
        health: 80.0,
        ..FighterConfig::new("Vex", "Assassin").with_weapon(Some(WeaponConfig {
            name: "Twin Daggers".to_string(),
            weight: WeaponWeight::Light,
            blade_length: 0.6,
            damage: 9.0,
            swing_time: 0.3,
            effect: Some(EffectTag::Bleed),
            skills: skills(&["Shadow Step", "Poison Dart"]),
            ..WeaponConfig::default()
        }))
    }
}

fn paladin() -> FighterConfig {
    FighterConfig {
        resistance: 15.0,
        health: 120.0,
        speed: 4.0,
        ..FighterConfig::new("Bram", "Paladin").with_weapon(Some(WeaponConfig {
            name: "Morning Star".to_string(),
            shape: WeaponShape::Orbital,
            weight: WeaponWeight::Heavy,
            arc_width_deg: 90.0,
            damage: 14.0,
            skills: skills(&["Stone Skin", "Healing Light"]),
            ..WeaponConfig::default()
        }))
    }
}

fn berserker() -> FighterConfig {
    FighterConfig {
        force: 14.0,
        ..FighterConfig::new("Hrolf", "Berserker").with_weapon(Some(WeaponConfig {
            name: "Great Axe".to_string(),
            weight: WeaponWeight::Heavy,
            damage: 18.0,
            swing_time: 0.7,
            skills: skills(&["Battle Cry", "Haste"]),
            ..WeaponConfig::default()
        }))
    }
}

fn spearman() -> FighterConfig {
    FighterConfig::new("Castor", "Lancer").with_weapon(Some(WeaponConfig {
        name: "Pike".to_string(),
        handle_length: 0.6,
        blade_length: 1.8,
        damage: 11.0,
        skills: skills(&["Throwing Knife", "Charge"]),
        ..WeaponConfig::default()
    }))
}

fn colossus() -> FighterConfig {
    FighterConfig {
        size: 1.4,
        health: 150.0,
        speed: 3.5,
        force: 16.0,
        ..FighterConfig::new("Gorm", "Giant").with_weapon(Some(WeaponConfig {
            name: "Maul".to_string(),
            weight: WeaponWeight::Heavy,
            damage: 24.0,
            swing_time: 0.9,
            effect: Some(EffectTag::Stun),
            skills: skills(&["Earthquake", "Boulder Toss"]),
            ..WeaponConfig::default()
        }))
    }
}

fn brawler() -> FighterConfig {
    FighterConfig {
        speed: 5.0,
        stamina: 130.0,
        ..FighterConfig::new("Dusk", "Monk").with_weapon(None)
    }
}
