//! # Duel Core
//!
//! Combat simulation kernel for 1v1 fighter duels.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO
//! - No ambient randomness (every roll comes from a seeded stream)
//!
//! This separation enables:
//! - Headless batch runs for AI balance testing
//! - Reproducible duels from a seed
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`math`], [`geometry`] - vectors, angles and collision primitives
//! - [`skills`], [`arena`], [`config`], [`events`] - data the kernel consumes and emits
//! - [`fighter`] - fighter state, damage pipeline, status effects
//! - [`entities`] - projectiles, areas and beams
//! - [`hitbox`] - weapon hitboxes and clash tests
//! - [`awareness`] - per-fighter spatial perception
//! - [`ai`] - archetype/trait driven decision engine
//! - [`combat`] - per-tick resolution
//! - [`simulation`] - the duel loop

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod arena;
pub mod awareness;
pub mod combat;
pub mod config;
pub mod entities;
pub mod error;
pub mod events;
pub mod fighter;
pub mod geometry;
pub mod hitbox;
pub mod math;
pub mod rng;
pub mod simulation;
pub mod skills;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ai::{Action, Archetype, Brain, Persona, Trait};
    pub use crate::arena::{Arena, ArenaShape, ArenaSpec, BoxArena, Obstacle};
    pub use crate::awareness::{Posture, SpatialAwareness, TacticalModifiers};
    pub use crate::combat::{CombatResolver, Resolution};
    pub use crate::config::{DuelConfig, FighterConfig, WeaponConfig, WeaponShape, WeaponWeight};
    pub use crate::entities::{Effect, EffectPool, EffectShape, Payload};
    pub use crate::error::{DuelError, Result};
    pub use crate::events::{CombatEvent, CombatEventKind, FighterId};
    pub use crate::fighter::{Buff, BuffKind, Fighter, FighterStats, Hit, Intent, Pilot};
    pub use crate::math::Vec2;
    pub use crate::rng::DuelRng;
    pub use crate::simulation::{Duel, DuelOutcome, TickEvents, BLUE, RED};
    pub use crate::skills::{EffectTag, SkillCatalog, SkillDefinition, SkillEffect, SkillType};
}
