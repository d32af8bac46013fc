//! Collision primitives.
//!
//! Collision is intentionally limited to circles, segments and arc bands.
//! Degenerate inputs (zero-length segments, zero or negative radii,
//! non-finite coordinates) are treated as "no collision" and never panic.

use crate::math::{angle_difference, Vec2};

/// Number of samples taken along a segment when testing it against an arc band.
const ARC_SAMPLES: usize = 16;

fn valid_radius(radius: f32) -> bool {
    radius.is_finite() && radius > 0.0
}

fn valid_segment(a: Vec2, b: Vec2) -> bool {
    a.is_finite() && b.is_finite() && a.distance_squared(b) > f32::EPSILON
}

/// Closest point to `p` on segment `a`-`b`.
///
/// A zero-length segment returns `a`.
#[must_use]
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Whether two circles overlap (touching counts).
#[must_use]
pub fn circles_overlap(c1: Vec2, r1: f32, c2: Vec2, r2: f32) -> bool {
    if !c1.is_finite() || !c2.is_finite() || r1 < 0.0 || r2 < 0.0 {
        return false;
    }
    let reach = r1 + r2;
    if reach <= 0.0 {
        return false;
    }
    c1.distance_squared(c2) <= reach * reach
}

/// Segment vs circle intersection.
#[must_use]
pub fn segment_intersects_circle(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> bool {
    if !valid_segment(a, b) || !valid_radius(radius) || !center.is_finite() {
        return false;
    }
    let closest = closest_point_on_segment(center, a, b);
    closest.distance_squared(center) <= radius * radius
}

fn orientation(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).cross(c - a)
}

fn on_segment(a: Vec2, b: Vec2, p: Vec2) -> bool {
    p.x >= a.x.min(b.x) - f32::EPSILON
        && p.x <= a.x.max(b.x) + f32::EPSILON
        && p.y >= a.y.min(b.y) - f32::EPSILON
        && p.y <= a.y.max(b.y) + f32::EPSILON
}

/// Segment vs segment intersection (collinear overlaps count).
#[must_use]
pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    if !valid_segment(a1, a2) || !valid_segment(b1, b2) {
        return false;
    }

    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(b1, b2, a1))
        || (d2 == 0.0 && on_segment(b1, b2, a2))
        || (d3 == 0.0 && on_segment(a1, a2, b1))
        || (d4 == 0.0 && on_segment(a1, a2, b2))
}

/// An annular sector around a centre: the swept area of an orbital weapon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcBand {
    /// Centre of the orbit (the wielder).
    pub center: Vec2,
    /// Inner radius of the band.
    pub inner: f32,
    /// Outer radius of the band.
    pub outer: f32,
    /// Bearing the sector is centred on.
    pub facing: f32,
    /// Full angular width of the sector in radians.
    pub arc_width: f32,
}

impl ArcBand {
    /// Whether a circle at `point` with radius `point_radius` touches the band.
    ///
    /// Distance must fall within `[inner - r, outer + r]` and the bearing
    /// within half the arc width of the facing.
    #[must_use]
    pub fn contains_circle(&self, point: Vec2, point_radius: f32) -> bool {
        if !self.is_valid() || !point.is_finite() || point_radius < 0.0 {
            return false;
        }
        let dist = self.center.distance(point);
        if dist < self.inner - point_radius || dist > self.outer + point_radius {
            return false;
        }
        if self.arc_width >= std::f32::consts::TAU {
            return true;
        }
        if dist <= f32::EPSILON {
            return false;
        }
        let bearing = self.center.bearing_to(point);
        angle_difference(bearing, self.facing).abs() <= self.arc_width * 0.5
    }

    fn is_valid(&self) -> bool {
        self.center.is_finite()
            && self.inner.is_finite()
            && valid_radius(self.outer)
            && self.inner <= self.outer
            && self.arc_width.is_finite()
            && self.arc_width > 0.0
    }
}

/// Segment vs arc band intersection, sampled along the segment.
#[must_use]
pub fn segment_intersects_arc_band(a: Vec2, b: Vec2, band: &ArcBand) -> bool {
    if !valid_segment(a, b) {
        return false;
    }
    (0..=ARC_SAMPLES).any(|i| {
        let t = i as f32 / ARC_SAMPLES as f32;
        band.contains_circle(a.lerp(b, t), 0.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_closest_point_clamps_to_endpoints() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert_eq!(closest_point_on_segment(Vec2::new(-5.0, 3.0), a, b), a);
        assert_eq!(closest_point_on_segment(Vec2::new(15.0, 3.0), a, b), b);
        assert_eq!(
            closest_point_on_segment(Vec2::new(4.0, 3.0), a, b),
            Vec2::new(4.0, 0.0)
        );
    }

    #[test]
    fn test_segment_circle() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert!(segment_intersects_circle(a, b, Vec2::new(5.0, 0.5), 1.0));
        assert!(!segment_intersects_circle(a, b, Vec2::new(5.0, 2.0), 1.0));
        assert!(segment_intersects_circle(a, b, Vec2::new(10.5, 0.0), 1.0));
    }

    #[test]
    fn test_degenerate_inputs_never_collide() {
        let p = Vec2::new(1.0, 1.0);
        assert!(!segment_intersects_circle(p, p, p, 5.0));
        assert!(!segment_intersects_circle(
            Vec2::ZERO,
            Vec2::new(1.0, 0.0),
            Vec2::ZERO,
            0.0
        ));
        assert!(!segments_intersect(p, p, Vec2::ZERO, Vec2::new(2.0, 2.0)));
        assert!(!circles_overlap(Vec2::ZERO, 0.0, Vec2::ZERO, 0.0));
        assert!(!segment_intersects_circle(
            Vec2::new(f32::NAN, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::ZERO,
            1.0
        ));
    }

    #[test]
    fn test_segments_cross() {
        assert!(segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(2.0, 0.0)
        ));
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0)
        ));
        // Collinear overlap
        assert!(segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(3.0, 0.0)
        ));
    }

    #[test]
    fn test_arc_band_polar_test() {
        let band = ArcBand {
            center: Vec2::ZERO,
            inner: 1.0,
            outer: 2.0,
            facing: 0.0,
            arc_width: PI / 2.0,
        };
        assert!(band.contains_circle(Vec2::new(1.5, 0.0), 0.1));
        // Inside distance band but behind the arc
        assert!(!band.contains_circle(Vec2::new(-1.5, 0.0), 0.1));
        // Too far even with radius slack
        assert!(!band.contains_circle(Vec2::new(3.0, 0.0), 0.5));
        // Radius slack reaches the band
        assert!(band.contains_circle(Vec2::new(2.4, 0.0), 0.5));
    }

    #[test]
    fn test_segment_vs_arc_band() {
        let band = ArcBand {
            center: Vec2::ZERO,
            inner: 1.0,
            outer: 2.0,
            facing: PI / 2.0,
            arc_width: PI / 2.0,
        };
        // Vertical segment crossing the band in front of the facing
        assert!(segment_intersects_arc_band(
            Vec2::new(0.0, 3.0),
            Vec2::new(0.0, 0.5),
            &band
        ));
        // Same segment mirrored behind the wielder
        assert!(!segment_intersects_arc_band(
            Vec2::new(0.0, -3.0),
            Vec2::new(0.0, -0.5),
            &band
        ));
    }
}
