//! Status timers, buffs and damage-over-time effects owned by a fighter.

use serde::{Deserialize, Serialize};

use crate::events::FighterId;
use crate::skills::EffectTag;

/// Seconds between DoT ticks.
pub const DOT_TICK_INTERVAL: f32 = 0.5;
/// Stun applied by a Stun-tagged hit.
pub const STUN_DURATION: f32 = 0.6;
/// Slow applied by a Freeze-tagged hit.
pub const FREEZE_DURATION: f32 = 1.5;
/// Movement multiplier while frozen.
pub const FREEZE_SLOW_FACTOR: f32 = 0.5;
/// Upper bound for speed and damage buff multipliers.
pub const MAX_BUFF_MULTIPLIER: f32 = 3.0;

/// Countdown timers. All values are seconds and never negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusTimers {
    /// Stunned: no AI, no movement intent.
    pub stun: f32,
    /// Slowed.
    pub slow: f32,
    /// Movement multiplier while `slow > 0`.
    pub slow_factor: f32,
    /// Damage is ignored while positive.
    pub invulnerable: f32,
    /// Damage flash for presentation.
    pub flash: f32,
}

impl Default for StatusTimers {
    fn default() -> Self {
        Self {
            stun: 0.0,
            slow: 0.0,
            slow_factor: 1.0,
            invulnerable: 0.0,
            flash: 0.0,
        }
    }
}

impl StatusTimers {
    /// Advance every timer, clamping at zero.
    pub fn tick(&mut self, dt: f32) {
        for timer in [
            &mut self.stun,
            &mut self.slow,
            &mut self.invulnerable,
            &mut self.flash,
        ] {
            *timer = (*timer - dt).max(0.0);
        }
        if self.slow <= 0.0 {
            self.slow_factor = 1.0;
        }
    }

    /// Current movement multiplier from slows.
    #[must_use]
    pub fn movement_factor(&self) -> f32 {
        if self.slow > 0.0 {
            self.slow_factor
        } else {
            1.0
        }
    }
}

/// What an active buff does.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BuffKind {
    /// Absorbs incoming damage until depleted.
    Shield {
        /// Remaining absorption.
        absorb: f32,
    },
    /// Heals continuously.
    Regen {
        /// Health per second.
        per_second: f32,
    },
    /// Multiplies movement speed.
    Speed {
        /// Multiplier.
        multiplier: f32,
    },
    /// Multiplies outgoing damage.
    Damage {
        /// Multiplier.
        multiplier: f32,
    },
}

/// A timed buff on a fighter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Buff {
    /// Effect.
    pub kind: BuffKind,
    /// Seconds left.
    pub remaining: f32,
}

impl Buff {
    /// Build the buff a tagged Buff skill grants.
    ///
    /// Untagged or non-buff tags fall back to a shield of `potency`.
    #[must_use]
    pub fn from_tag(tag: Option<EffectTag>, potency: f32, duration: f32) -> Self {
        let potency = potency.max(0.0);
        let kind = match tag {
            Some(EffectTag::Heal) => BuffKind::Regen {
                per_second: potency,
            },
            Some(EffectTag::SpeedBuff) => BuffKind::Speed {
                multiplier: potency.clamp(1.0, MAX_BUFF_MULTIPLIER),
            },
            Some(EffectTag::DamageBuff) => BuffKind::Damage {
                multiplier: potency.clamp(1.0, MAX_BUFF_MULTIPLIER),
            },
            _ => BuffKind::Shield { absorb: potency },
        };
        Self {
            kind,
            remaining: duration.max(0.0),
        }
    }

    /// A shield with the given absorption.
    #[must_use]
    pub const fn shield(absorb: f32, duration: f32) -> Self {
        Self {
            kind: BuffKind::Shield { absorb },
            remaining: duration,
        }
    }

    /// Remaining shield absorption (zero for other kinds).
    #[must_use]
    pub fn shield_value(&self) -> f32 {
        match self.kind {
            BuffKind::Shield { absorb } => absorb,
            _ => 0.0,
        }
    }

    /// Whether the buff should be pruned.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0 || matches!(self.kind, BuffKind::Shield { absorb } if absorb <= 0.0)
    }
}

/// Absorb `amount` with shields in list order. Returns what was absorbed.
pub fn absorb_with_shields(buffs: &mut [Buff], amount: f32) -> f32 {
    let mut left = amount;
    for buff in buffs.iter_mut() {
        if left <= 0.0 {
            break;
        }
        if let BuffKind::Shield { absorb } = &mut buff.kind {
            let taken = absorb.min(left);
            *absorb -= taken;
            left -= taken;
        }
    }
    amount - left
}

/// Fixed-interval damage over time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DotEffect {
    /// Which DoT.
    pub tag: EffectTag,
    /// Damage per tick.
    pub damage_per_tick: f32,
    /// Time accumulated towards the next tick.
    pub timer: f32,
    /// Ticks left.
    pub ticks_left: u32,
    /// Fighter credited with the damage.
    pub source: Option<FighterId>,
}

impl DotEffect {
    /// DoT for a tag, if the tag carries one.
    #[must_use]
    pub fn for_tag(tag: EffectTag, source: Option<FighterId>) -> Option<Self> {
        let profile = tag.dot_profile()?;
        Some(Self {
            tag,
            damage_per_tick: profile.damage_per_tick,
            timer: 0.0,
            ticks_left: (profile.duration / DOT_TICK_INTERVAL).round() as u32,
            source,
        })
    }

    /// Advance by `dt`; returns the number of ticks that fired.
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.timer += dt;
        let mut fired = 0;
        while self.timer >= DOT_TICK_INTERVAL && self.ticks_left > 0 {
            self.timer -= DOT_TICK_INTERVAL;
            self.ticks_left -= 1;
            fired += 1;
        }
        fired
    }

    /// Whether no ticks remain.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.ticks_left == 0
    }
}
