//! Skill definitions and the shared skill catalog.
//!
//! Skills arrive as loosely-specified data ([`SkillSpec`], every field
//! optional) and are resolved once, at catalog construction, into fully
//! populated [`SkillDefinition`]s. Definitions are immutable and shared
//! by `Arc` between the catalog and every fighter that equips them.
//!
//! # Example RON
//!
//! ```ron
//! #![enable(implicit_some)]
//! [
//!     (name: "Fireball", kind: Projectile, damage: 20.0, effect: Burn, speed: 12.0),
//!     (name: "Stone Skin", kind: Buff, effect: Shield, potency: 30.0, duration: 8.0),
//! ]
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{DuelError, Result};

/// Which pool a skill draws its cost from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ResourceKind {
    /// Mana pool (spells).
    #[default]
    Mana,
    /// Stamina pool (physical techniques).
    Stamina,
}

/// Status or buff tag carried by a skill or weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectTag {
    /// Damage over time, fast ticks.
    Bleed,
    /// Damage over time, long duration.
    Poison,
    /// Damage over time, heavy ticks.
    Burn,
    /// Movement slow.
    Freeze,
    /// Stun; interrupts melee swings.
    Stun,
    /// Damage-absorbing shield buff.
    Shield,
    /// Heal-over-time buff.
    Heal,
    /// Movement speed buff.
    SpeedBuff,
    /// Outgoing damage buff.
    DamageBuff,
}

/// Damage-over-time parameters for a tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotProfile {
    /// Damage applied on each tick.
    pub damage_per_tick: f32,
    /// Total duration in seconds.
    pub duration: f32,
}

impl EffectTag {
    /// DoT parameters if this tag attaches a damage-over-time effect.
    #[must_use]
    pub const fn dot_profile(self) -> Option<DotProfile> {
        match self {
            EffectTag::Poison => Some(DotProfile {
                damage_per_tick: 2.0,
                duration: 4.0,
            }),
            EffectTag::Bleed => Some(DotProfile {
                damage_per_tick: 3.0,
                duration: 2.0,
            }),
            EffectTag::Burn => Some(DotProfile {
                damage_per_tick: 4.0,
                duration: 1.5,
            }),
            _ => None,
        }
    }

    /// Whether this tag buffs the caster rather than hurting the target.
    #[must_use]
    pub const fn is_self_buff(self) -> bool {
        matches!(
            self,
            EffectTag::Shield | EffectTag::Heal | EffectTag::SpeedBuff | EffectTag::DamageBuff
        )
    }
}

/// Coarse skill category used by the AI heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SkillType {
    /// Travelling projectile.
    Projectile,
    /// Instant line attack.
    Beam,
    /// Expanding ring around a point.
    Area,
    /// Instant reposition.
    Dash,
    /// Self buff.
    Buff,
    /// Placeholder returned for unknown skills.
    #[default]
    None,
}

/// Fully resolved per-type skill geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkillEffect {
    /// Spawns a projectile travelling along the caster's facing.
    Projectile {
        /// Travel speed (units/s).
        speed: f32,
        /// Collision radius.
        radius: f32,
        /// Maximum travel distance.
        range: f32,
        /// Self-knockback applied to the caster on release.
        recoil: f32,
    },
    /// Instant beam along the caster's facing.
    Beam {
        /// Beam length.
        range: f32,
        /// Beam thickness.
        width: f32,
        /// Visual lifetime in seconds (damage is applied once).
        duration: f32,
    },
    /// Ring expanding around the caster.
    Area {
        /// Final radius.
        radius: f32,
        /// Seconds to reach the final radius.
        expand_time: f32,
        /// Total lifetime in seconds.
        duration: f32,
    },
    /// Teleport along the caster's facing.
    Dash {
        /// Teleport distance.
        distance: f32,
        /// Invulnerability granted on arrival.
        invulnerability: f32,
    },
    /// Self buff keyed by the skill's effect tag.
    Buff {
        /// Buff duration in seconds.
        duration: f32,
        /// Heal per second, shield amount or multiplier depending on the tag.
        potency: f32,
    },
    /// No effect.
    None,
}

/// An immutable, resolved skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    /// Unique skill name.
    pub name: String,
    /// Base damage.
    pub damage: f32,
    /// Cooldown in seconds.
    pub cooldown: f32,
    /// Resource cost.
    pub cost: f32,
    /// Resource pool the cost is paid from.
    pub resource: ResourceKind,
    /// Status/buff tag applied on hit or on cast.
    pub effect_tag: Option<EffectTag>,
    /// Geometry and behaviour.
    pub effect: SkillEffect,
}

impl SkillDefinition {
    /// The canonical "None" skill: no cost, no cooldown, no effect.
    #[must_use]
    pub fn none(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            damage: 0.0,
            cooldown: 0.0,
            cost: 0.0,
            resource: ResourceKind::Mana,
            effect_tag: None,
            effect: SkillEffect::None,
        }
    }

    /// Coarse category.
    #[must_use]
    pub const fn skill_type(&self) -> SkillType {
        match self.effect {
            SkillEffect::Projectile { .. } => SkillType::Projectile,
            SkillEffect::Beam { .. } => SkillType::Beam,
            SkillEffect::Area { .. } => SkillType::Area,
            SkillEffect::Dash { .. } => SkillType::Dash,
            SkillEffect::Buff { .. } => SkillType::Buff,
            SkillEffect::None => SkillType::None,
        }
    }

    /// Reach of the skill used by the AI range checks.
    #[must_use]
    pub fn reach(&self) -> f32 {
        match self.effect {
            SkillEffect::Projectile { range, .. } | SkillEffect::Beam { range, .. } => range,
            SkillEffect::Area { radius, .. } => radius,
            SkillEffect::Dash { distance, .. } => distance,
            SkillEffect::Buff { .. } | SkillEffect::None => 0.0,
        }
    }
}

/// Loosely-typed skill data as it comes from external files.
///
/// Every field except the name and type is optional; defaults are filled in
/// by [`SkillSpec::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillSpec {
    /// Unique skill name.
    pub name: String,
    /// Category.
    pub kind: SkillType,
    /// Base damage.
    pub damage: Option<f32>,
    /// Cooldown in seconds.
    pub cooldown: Option<f32>,
    /// Resource cost.
    pub cost: Option<f32>,
    /// Resource pool.
    pub resource: Option<ResourceKind>,
    /// Status/buff tag.
    pub effect: Option<EffectTag>,
    /// Range (projectile, beam).
    pub range: Option<f32>,
    /// Radius (projectile, area).
    pub radius: Option<f32>,
    /// Speed (projectile).
    pub speed: Option<f32>,
    /// Width (beam).
    pub width: Option<f32>,
    /// Duration (beam, area, buff).
    pub duration: Option<f32>,
    /// Expansion time (area).
    pub expand_time: Option<f32>,
    /// Distance (dash).
    pub distance: Option<f32>,
    /// Invulnerability window (dash).
    pub invulnerability: Option<f32>,
    /// Caster recoil (projectile).
    pub recoil: Option<f32>,
    /// Buff strength.
    pub potency: Option<f32>,
}

impl SkillSpec {
    /// Start a spec with only the name and type set.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: SkillType) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    /// Builder method to set damage.
    #[must_use]
    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = Some(damage);
        self
    }

    /// Builder method to set the effect tag.
    #[must_use]
    pub fn with_effect(mut self, tag: EffectTag) -> Self {
        self.effect = Some(tag);
        self
    }

    /// Builder method to set cooldown.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: f32) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    /// Builder method to set cost.
    #[must_use]
    pub fn with_cost(mut self, cost: f32) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Resolve into a definition, substituting per-type defaults.
    #[must_use]
    pub fn resolve(self) -> SkillDefinition {
        let (damage, cooldown, cost, resource, effect) = match self.kind {
            SkillType::Projectile => (
                15.0,
                1.5,
                15.0,
                ResourceKind::Mana,
                SkillEffect::Projectile {
                    speed: self.speed.unwrap_or(14.0),
                    radius: self.radius.unwrap_or(0.3),
                    range: self.range.unwrap_or(12.0),
                    recoil: self.recoil.unwrap_or(0.0),
                },
            ),
            SkillType::Beam => (
                20.0,
                3.0,
                25.0,
                ResourceKind::Mana,
                SkillEffect::Beam {
                    range: self.range.unwrap_or(8.0),
                    width: self.width.unwrap_or(0.4),
                    duration: self.duration.unwrap_or(0.25),
                },
            ),
            SkillType::Area => (
                25.0,
                5.0,
                30.0,
                ResourceKind::Mana,
                SkillEffect::Area {
                    radius: self.radius.unwrap_or(2.5),
                    expand_time: self.expand_time.unwrap_or(0.3),
                    duration: self.duration.unwrap_or(0.6),
                },
            ),
            SkillType::Dash => (
                0.0,
                3.0,
                20.0,
                ResourceKind::Stamina,
                SkillEffect::Dash {
                    distance: self.distance.unwrap_or(4.0),
                    invulnerability: self.invulnerability.unwrap_or(0.15),
                },
            ),
            SkillType::Buff => (
                0.0,
                10.0,
                25.0,
                ResourceKind::Mana,
                SkillEffect::Buff {
                    duration: self.duration.unwrap_or(5.0),
                    potency: self.potency.unwrap_or(20.0),
                },
            ),
            SkillType::None => return SkillDefinition::none(self.name),
        };

        SkillDefinition {
            name: self.name,
            damage: self.damage.unwrap_or(damage).max(0.0),
            cooldown: self.cooldown.unwrap_or(cooldown).max(0.0),
            cost: self.cost.unwrap_or(cost).max(0.0),
            resource: self.resource.unwrap_or(resource),
            effect_tag: self.effect,
            effect,
        }
    }
}

/// Read-only name → skill lookup shared by every fighter in a duel.
#[derive(Debug, Clone)]
pub struct SkillCatalog {
    skills: HashMap<String, Arc<SkillDefinition>>,
}

impl SkillCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            skills: HashMap::new(),
        }
    }

    /// Build a catalog from loose specs.
    #[must_use]
    pub fn from_specs(specs: impl IntoIterator<Item = SkillSpec>) -> Self {
        let mut catalog = Self::new();
        for spec in specs {
            catalog.insert(spec.resolve());
        }
        catalog
    }

    /// Parse a RON list of [`SkillSpec`]s.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let specs: Vec<SkillSpec> =
            ron::from_str(source).map_err(|e| DuelError::parse("skill catalog", e))?;
        Ok(Self::from_specs(specs))
    }

    /// Add or replace a definition.
    pub fn insert(&mut self, definition: SkillDefinition) {
        self.skills
            .insert(definition.name.clone(), Arc::new(definition));
    }

    /// Look up a skill by name.
    ///
    /// Unknown names resolve to the canonical "None" skill; this never fails.
    #[must_use]
    pub fn get_skill(&self, name: &str) -> Arc<SkillDefinition> {
        match self.skills.get(name) {
            Some(skill) => Arc::clone(skill),
            None => {
                tracing::debug!(skill = name, "Unknown skill, using None definition");
                Arc::new(SkillDefinition::none(name))
            }
        }
    }

    /// Whether the catalog knows this name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.skills.contains_key(name)
    }

    /// Number of skills.
    #[must_use]
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Skill names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.skills.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The stock skill set used by presets and tests.
    #[must_use]
    pub fn builtin() -> Self {
        use EffectTag::*;
        use SkillType as T;

        let specs = vec![
            SkillSpec {
                speed: Some(12.0),
                ..SkillSpec::new("Fireball", T::Projectile)
                    .with_damage(20.0)
                    .with_effect(Burn)
            },
            SkillSpec {
                speed: Some(16.0),
                ..SkillSpec::new("Ice Shard", T::Projectile)
                    .with_damage(14.0)
                    .with_effect(Freeze)
            },
            SkillSpec {
                speed: Some(20.0),
                radius: Some(0.2),
                ..SkillSpec::new("Poison Dart", T::Projectile)
                    .with_damage(8.0)
                    .with_effect(Poison)
                    .with_cost(10.0)
                    .with_cooldown(1.0)
            },
            SkillSpec {
                speed: Some(9.0),
                radius: Some(0.5),
                recoil: Some(4.0),
                resource: Some(ResourceKind::Stamina),
                ..SkillSpec::new("Boulder Toss", T::Projectile)
                    .with_damage(30.0)
                    .with_effect(Stun)
                    .with_cooldown(4.0)
                    .with_cost(25.0)
            },
            SkillSpec {
                speed: Some(18.0),
                resource: Some(ResourceKind::Stamina),
                ..SkillSpec::new("Throwing Knife", T::Projectile)
                    .with_damage(10.0)
                    .with_effect(Bleed)
                    .with_cost(10.0)
                    .with_cooldown(1.2)
            },
            SkillSpec {
                range: Some(7.0),
                ..SkillSpec::new("Lightning Beam", T::Beam).with_damage(22.0)
            },
            SkillSpec {
                radius: Some(2.5),
                ..SkillSpec::new("Flame Ring", T::Area)
                    .with_damage(18.0)
                    .with_effect(Burn)
            },
            SkillSpec {
                radius: Some(3.5),
                ..SkillSpec::new("Earthquake", T::Area)
                    .with_damage(28.0)
                    .with_effect(Stun)
                    .with_cooldown(8.0)
            },
            SkillSpec {
                radius: Some(3.0),
                ..SkillSpec::new("Frost Nova", T::Area)
                    .with_damage(12.0)
                    .with_effect(Freeze)
            },
            SkillSpec {
                distance: Some(5.0),
                invulnerability: Some(0.3),
                ..SkillSpec::new("Shadow Step", T::Dash)
            },
            SkillSpec {
                distance: Some(4.0),
                ..SkillSpec::new("Charge", T::Dash)
                    .with_damage(15.0)
                    .with_effect(Stun)
                    .with_cooldown(5.0)
            },
            SkillSpec {
                potency: Some(8.0),
                duration: Some(5.0),
                ..SkillSpec::new("Healing Light", T::Buff).with_effect(Heal)
            },
            SkillSpec {
                potency: Some(30.0),
                duration: Some(8.0),
                ..SkillSpec::new("Stone Skin", T::Buff).with_effect(Shield)
            },
            SkillSpec {
                potency: Some(1.4),
                duration: Some(4.0),
                ..SkillSpec::new("Haste", T::Buff).with_effect(SpeedBuff)
            },
            SkillSpec {
                potency: Some(1.3),
                duration: Some(5.0),
                resource: Some(ResourceKind::Stamina),
                ..SkillSpec::new("Battle Cry", T::Buff).with_effect(DamageBuff)
            },
        ];

        Self::from_specs(specs)
    }
}

impl Default for SkillCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_skill_returns_none_definition() {
        let catalog = SkillCatalog::builtin();
        let skill = catalog.get_skill("Does Not Exist");
        assert_eq!(skill.skill_type(), SkillType::None);
        assert_eq!(skill.cost, 0.0);
        assert_eq!(skill.cooldown, 0.0);
        assert_eq!(skill.name, "Does Not Exist");
    }

    #[test]
    fn test_lookup_shares_definition() {
        let catalog = SkillCatalog::builtin();
        let a = catalog.get_skill("Fireball");
        let b = catalog.get_skill("Fireball");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.skill_type(), SkillType::Projectile);
        assert_eq!(a.effect_tag, Some(EffectTag::Burn));
    }

    #[test]
    fn test_spec_defaults_fill_missing_fields() {
        let def = SkillSpec::new("Plain Dash", SkillType::Dash).resolve();
        assert_eq!(def.resource, ResourceKind::Stamina);
        match def.effect {
            SkillEffect::Dash {
                distance,
                invulnerability,
            } => {
                assert!(distance > 0.0);
                assert!(invulnerability >= 0.0);
            }
            other => panic!("expected dash, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_values_are_clamped() {
        let def = SkillSpec::new("Odd", SkillType::Beam)
            .with_damage(-5.0)
            .with_cost(-1.0)
            .resolve();
        assert_eq!(def.damage, 0.0);
        assert_eq!(def.cost, 0.0);
    }

    #[test]
    fn test_from_ron_str() {
        let source = r#"
            #![enable(implicit_some)]
            [
                (name: "Spark", kind: Projectile, damage: 5.0, speed: 30.0),
                (name: "Ward", kind: Buff, effect: Shield, potency: 12.0),
            ]
        "#;
        let catalog = SkillCatalog::from_ron_str(source).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get_skill("Spark").damage, 5.0);
        assert_eq!(
            catalog.get_skill("Ward").effect_tag,
            Some(EffectTag::Shield)
        );
        assert_eq!(catalog.names(), vec!["Spark", "Ward"]);
    }

    #[test]
    fn test_from_ron_str_reports_parse_errors() {
        let err = SkillCatalog::from_ron_str("[ (name: ").unwrap_err();
        assert!(matches!(err, DuelError::ConfigParse { .. }));
    }

    #[test]
    fn test_dot_profiles() {
        assert!(EffectTag::Poison.dot_profile().is_some());
        assert!(EffectTag::Bleed.dot_profile().is_some());
        assert!(EffectTag::Burn.dot_profile().is_some());
        assert!(EffectTag::Stun.dot_profile().is_none());
        assert!(EffectTag::Shield.is_self_buff());
    }
}
