//! Weapon hitboxes and the melee/clash tests built on them.
//!
//! Line weapons are a segment from the wielder's body edge (handle) to the
//! blade tip. Orbital and arc weapons are an [`ArcBand`] around the wielder
//! centred on the weapon's current bearing. A fighter without a weapon has
//! no hitbox, so every test against it reports no hit.

use crate::config::WeaponShape;
use crate::fighter::Fighter;
use crate::geometry::{
    segment_intersects_arc_band, segment_intersects_circle, segments_intersect, ArcBand,
};
use crate::math::Vec2;

/// A weapon's world-space hit geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeaponHitbox {
    /// Straight weapon from handle to tip.
    Segment {
        /// Handle end.
        start: Vec2,
        /// Blade tip.
        end: Vec2,
    },
    /// Polar weapon band.
    Band(ArcBand),
}

impl WeaponHitbox {
    /// Whether the hitbox touches a circle.
    #[must_use]
    pub fn hits_circle(&self, center: Vec2, radius: f32) -> bool {
        match self {
            Self::Segment { start, end } => segment_intersects_circle(*start, *end, center, radius),
            Self::Band(band) => band.contains_circle(center, radius),
        }
    }

    /// A representative point (tip or mid-band) used for event positions.
    #[must_use]
    pub fn focus(&self) -> Vec2 {
        match self {
            Self::Segment { end, .. } => *end,
            Self::Band(band) => {
                band.center + Vec2::from_angle(band.facing) * ((band.inner + band.outer) * 0.5)
            }
        }
    }
}

/// Current hitbox of a fighter's weapon.
#[must_use]
pub fn weapon_hitbox(fighter: &Fighter) -> Option<WeaponHitbox> {
    let weapon = fighter.weapon.as_ref()?;
    let dir = Vec2::from_angle(fighter.weapon_angle);
    match weapon.shape {
        WeaponShape::Line => {
            let start = fighter.position + dir * fighter.radius;
            let end = start + dir * weapon.reach(fighter.scale);
            Some(WeaponHitbox::Segment { start, end })
        }
        WeaponShape::Orbital | WeaponShape::Arc => {
            let orbit = weapon.orbit_distance * fighter.scale;
            let thickness = weapon.thickness * fighter.scale;
            Some(WeaponHitbox::Band(ArcBand {
                center: fighter.position,
                inner: (orbit - thickness).max(0.0),
                outer: orbit + thickness,
                facing: fighter.weapon_angle,
                arc_width: weapon.arc_width_deg.to_radians(),
            }))
        }
    }
}

/// Whether `attacker`'s swing lands on `defender` this tick.
///
/// Requires an active swing inside its damaging window that has not already
/// landed, and a geometric hit against the defender's collision circle.
#[must_use]
pub fn melee_hits(attacker: &Fighter, defender: &Fighter) -> bool {
    if attacker.dead || defender.dead || attacker.attack.hit_registered {
        return false;
    }
    if !attacker.attack.in_active_window() {
        return false;
    }
    weapon_hitbox(attacker).is_some_and(|h| h.hits_circle(defender.position, defender.radius))
}

/// Whether the two weapons meet this tick.
///
/// At least one fighter must be inside its active window. Line vs line is a
/// segment test, line vs polar tests the segment against the band, and two
/// polar weapons clash when either band's focus lies in the other band.
#[must_use]
pub fn weapons_clash(a: &Fighter, b: &Fighter) -> bool {
    if a.dead || b.dead {
        return false;
    }
    if !a.attack.in_active_window() && !b.attack.in_active_window() {
        return false;
    }
    let (Some(ha), Some(hb)) = (weapon_hitbox(a), weapon_hitbox(b)) else {
        return false;
    };
    match (ha, hb) {
        (
            WeaponHitbox::Segment { start: a1, end: a2 },
            WeaponHitbox::Segment { start: b1, end: b2 },
        ) => segments_intersect(a1, a2, b1, b2),
        (WeaponHitbox::Segment { start, end }, WeaponHitbox::Band(band))
        | (WeaponHitbox::Band(band), WeaponHitbox::Segment { start, end }) => {
            segment_intersects_arc_band(start, end, &band)
        }
        (WeaponHitbox::Band(band_a), WeaponHitbox::Band(band_b)) => {
            band_b.contains_circle(ha.focus(), 0.0) || band_a.contains_circle(hb.focus(), 0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FighterConfig, WeaponConfig};
    use crate::skills::SkillCatalog;
    use std::f32::consts::PI;

    fn armed(id: u32, weapon: Option<WeaponConfig>, position: Vec2, facing: f32) -> Fighter {
        let config = FighterConfig::new("F", "Warrior").with_weapon(weapon);
        Fighter::new(id, &config, &SkillCatalog::new()).at(position, facing)
    }

    fn swinging(mut fighter: Fighter) -> Fighter {
        fighter.attack.attacking = true;
        fighter.attack.duration = 1.0;
        fighter.attack.timer = 0.5;
        fighter
    }

    #[test]
    fn test_line_weapon_hits_only_in_window() {
        let defender = armed(1, None, Vec2::new(1.5, 0.0), PI);
        let idle = armed(0, Some(WeaponConfig::default()), Vec2::ZERO, 0.0);
        assert!(!melee_hits(&idle, &defender));
        let attacker = swinging(idle);
        assert!(melee_hits(&attacker, &defender));

        let mut landed = attacker.clone();
        landed.attack.hit_registered = true;
        assert!(!melee_hits(&landed, &defender));
    }

    #[test]
    fn test_missing_weapon_never_hits() {
        let defender = armed(1, None, Vec2::new(0.8, 0.0), PI);
        let attacker = swinging(armed(0, None, Vec2::ZERO, 0.0));
        assert!(weapon_hitbox(&attacker).is_none());
        assert!(!melee_hits(&attacker, &defender));
        assert!(!weapons_clash(&attacker, &defender));
    }

    #[test]
    fn test_orbital_polar_test() {
        let flail = WeaponConfig {
            shape: WeaponShape::Orbital,
            orbit_distance: 1.6,
            thickness: 0.25,
            arc_width_deg: 90.0,
            ..WeaponConfig::default()
        };
        let attacker = swinging(armed(0, Some(flail), Vec2::ZERO, 0.0));
        let in_front = armed(1, None, Vec2::new(1.8, 0.0), PI);
        let behind = armed(1, None, Vec2::new(-1.8, 0.0), 0.0);
        let too_far = armed(1, None, Vec2::new(4.0, 0.0), PI);
        assert!(melee_hits(&attacker, &in_front));
        assert!(!melee_hits(&attacker, &behind));
        assert!(!melee_hits(&attacker, &too_far));
    }

    #[test]
    fn test_crossed_swords_clash() {
        let a = swinging(armed(0, Some(WeaponConfig::default()), Vec2::ZERO, PI / 4.0));
        let b = swinging(armed(
            1,
            Some(WeaponConfig::default()),
            Vec2::new(2.0, 0.0),
            3.0 * PI / 4.0,
        ));
        assert!(weapons_clash(&a, &b));

        let mut idle_a = a.clone();
        idle_a.attack.cancel();
        let mut idle_b = b.clone();
        idle_b.attack.cancel();
        assert!(!weapons_clash(&idle_a, &idle_b));
    }

    #[test]
    fn test_line_vs_orbital_clash() {
        let flail = WeaponConfig {
            shape: WeaponShape::Orbital,
            arc_width_deg: 120.0,
            ..WeaponConfig::default()
        };
        let sword = swinging(armed(0, Some(WeaponConfig::default()), Vec2::ZERO, 0.0));
        let orbiter = armed(1, Some(flail), Vec2::new(2.5, 0.0), PI);
        assert!(weapons_clash(&sword, &orbiter));
    }
}
