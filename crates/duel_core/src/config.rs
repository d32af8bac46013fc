//! Fighter, weapon and duel configuration.
//!
//! Pure data structures deserialized from RON by the caller. This module
//! performs no IO. Cosmetic fields are accepted so that external character
//! files load unchanged, but the kernel ignores them.

use serde::{Deserialize, Serialize};

use crate::error::{DuelError, Result};
use crate::skills::EffectTag;

/// Reach (handle + blade, scaled) above which a line weapon counts as "long".
pub const LONG_WEAPON_REACH: f32 = 2.0;

/// Hitbox shape of a weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WeaponShape {
    /// Straight weapon: swords, spears, axes. Hit test is segment vs circle.
    #[default]
    Line,
    /// Weapon orbiting the wielder: flails, chakrams. Hit test is polar.
    Orbital,
    /// Curved sweep weapon: scythes, whips. Hit test is polar.
    Arc,
}

impl WeaponShape {
    /// Whether hits use the polar band test.
    #[must_use]
    pub const fn is_polar(self) -> bool {
        matches!(self, Self::Orbital | Self::Arc)
    }
}

/// Weight class of a weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WeaponWeight {
    /// Daggers, rapiers.
    Light,
    /// Swords, spears.
    #[default]
    Medium,
    /// Greatswords, hammers.
    Heavy,
}

/// Weapon description supplied with a fighter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Display name.
    pub name: String,
    /// Hitbox shape.
    pub shape: WeaponShape,
    /// Weight class.
    pub weight: WeaponWeight,
    /// Base melee damage.
    pub damage: f32,
    /// Handle length (line weapons).
    pub handle_length: f32,
    /// Blade length (line weapons).
    pub blade_length: f32,
    /// Orbit distance from the wielder's centre (polar weapons).
    pub orbit_distance: f32,
    /// Half-thickness of the orbit band (polar weapons).
    pub thickness: f32,
    /// Angular width of the hit arc in degrees (polar weapons) or swing arc (line weapons).
    pub arc_width_deg: f32,
    /// Orbit speed in degrees per second (orbital weapons).
    pub orbit_speed_deg: f32,
    /// Full swing animation time in seconds.
    pub swing_time: f32,
    /// On-hit status tag.
    pub effect: Option<EffectTag>,
    /// Skill names resolved through the skill catalog.
    pub skills: Vec<String>,
    /// Cosmetic colour, ignored by the kernel.
    pub color: Option<(u8, u8, u8)>,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            name: "Sword".to_string(),
            shape: WeaponShape::Line,
            weight: WeaponWeight::Medium,
            damage: 12.0,
            handle_length: 0.3,
            blade_length: 1.0,
            orbit_distance: 1.6,
            thickness: 0.25,
            arc_width_deg: 100.0,
            orbit_speed_deg: 240.0,
            swing_time: 0.5,
            effect: None,
            skills: Vec::new(),
            color: None,
        }
    }
}

impl WeaponConfig {
    /// Distance from the wielder's edge to the weapon's far end, at `scale`.
    #[must_use]
    pub fn reach(&self, scale: f32) -> f32 {
        match self.shape {
            WeaponShape::Line => (self.handle_length + self.blade_length) * scale,
            WeaponShape::Orbital | WeaponShape::Arc => {
                (self.orbit_distance + self.thickness) * scale
            }
        }
    }

    /// Whether the weapon counts as a long (polearm-like) weapon.
    #[must_use]
    pub fn is_long(&self, scale: f32) -> bool {
        self.shape == WeaponShape::Line && self.reach(scale) >= LONG_WEAPON_REACH
    }
}

/// External character description used to build a fighter.
///
/// # Example RON
///
/// ```ron
/// #![enable(implicit_some)]
/// (
///     name: "Ayla",
///     class_name: "Pyromancer",
///     mana: 140.0,
///     weapon: (name: "Staff", blade_length: 1.2, skills: ["Fireball", "Flame Ring"]),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FighterConfig {
    /// Display name.
    pub name: String,
    /// Class name; substrings select the class profile and archetype.
    pub class_name: String,
    /// Body scale (1.0 = standard).
    pub size: f32,
    /// Strength stat scaling melee damage and knockback.
    pub force: f32,
    /// Maximum health.
    pub health: f32,
    /// Maximum mana.
    pub mana: f32,
    /// Maximum stamina.
    pub stamina: f32,
    /// Flat resistance percentage (capped at [`crate::fighter::MAX_RESISTANCE`]).
    pub resistance: f32,
    /// Base movement speed in units per second.
    pub speed: f32,
    /// Equipped weapon, if any.
    pub weapon: Option<WeaponConfig>,
    /// Cosmetic colour, ignored by the kernel.
    pub color: Option<(u8, u8, u8)>,
}

impl Default for FighterConfig {
    fn default() -> Self {
        Self {
            name: "Fighter".to_string(),
            class_name: "Warrior".to_string(),
            size: 1.0,
            force: 10.0,
            health: 100.0,
            mana: 100.0,
            stamina: 100.0,
            resistance: 0.0,
            speed: 4.5,
            weapon: Some(WeaponConfig::default()),
            color: None,
        }
    }
}

impl FighterConfig {
    /// Create a config with the given name and class and default stats.
    #[must_use]
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
            ..Default::default()
        }
    }

    /// Builder method to replace the weapon.
    #[must_use]
    pub fn with_weapon(mut self, weapon: Option<WeaponConfig>) -> Self {
        self.weapon = weapon;
        self
    }

    /// Builder method to set maximum health.
    #[must_use]
    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health;
        self
    }

    /// Parse from RON.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let config: Self = ron::from_str(source).map_err(|e| DuelError::parse("fighter", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot work with.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("size", self.size),
            ("health", self.health),
            ("speed", self.speed),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(DuelError::invalid(
                    &self.name,
                    format!("{field} must be positive, got {value}"),
                ));
            }
        }
        let non_negative = [
            ("force", self.force),
            ("mana", self.mana),
            ("stamina", self.stamina),
            ("resistance", self.resistance),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(DuelError::invalid(
                    &self.name,
                    format!("{field} must be non-negative, got {value}"),
                ));
            }
        }
        if let Some(weapon) = &self.weapon {
            if !weapon.swing_time.is_finite() || weapon.swing_time <= 0.0 {
                return Err(DuelError::invalid(
                    &self.name,
                    format!("weapon '{}' needs a positive swing time", weapon.name),
                ));
            }
        }
        Ok(())
    }
}

/// Tuning knobs for the duel orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelConfig {
    /// Fixed simulation rate used by [`crate::simulation::Duel::run`].
    pub tick_rate: u32,
    /// Simulated seconds before the duel is decided on health.
    pub max_duration: f32,
    /// Hit-stop after a heavy hit (real seconds).
    pub hit_stop_heavy: f32,
    /// Hit-stop after a clash.
    pub hit_stop_clash: f32,
    /// Hit-stop after the lethal blow.
    pub hit_stop_lethal: f32,
    /// Final damage at or above which a hit counts as heavy.
    pub heavy_hit_threshold: f32,
    /// Time scale during the post-kill slow motion.
    pub slow_motion_scale: f32,
    /// Slow-motion duration in real seconds.
    pub slow_motion_duration: f32,
    /// Distance between the two spawn points.
    pub spawn_separation: f32,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            max_duration: 90.0,
            hit_stop_heavy: 0.06,
            hit_stop_clash: 0.1,
            hit_stop_lethal: 0.2,
            heavy_hit_threshold: 25.0,
            slow_motion_scale: 0.3,
            slow_motion_duration: 1.2,
            spawn_separation: 8.0,
        }
    }
}

impl DuelConfig {
    /// Parse from RON.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| DuelError::parse("duel config", e))
    }

    /// Length of one fixed step in seconds.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Builder method to disable all hit-stop and slow motion (useful for tests).
    #[must_use]
    pub fn without_feedback(mut self) -> Self {
        self.hit_stop_heavy = 0.0;
        self.hit_stop_clash = 0.0;
        self.hit_stop_lethal = 0.0;
        self.slow_motion_duration = 0.0;
        self
    }
}
