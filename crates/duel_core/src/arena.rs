//! Arena query surface.
//!
//! The combat kernel never mutates the arena; it only asks whether a point
//! is blocked and where the bounds are. [`BoxArena`] is the stock
//! implementation used by the headless runner and tests. Callers with their
//! own level representation implement [`Arena`] directly.

use serde::{Deserialize, Serialize};

use crate::error::{DuelError, Result};
use crate::math::Vec2;

/// Identifier for a static obstacle.
pub type ObstacleId = u32;

/// Which boundary a wall distance refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WallSide {
    /// Minimum X edge.
    West,
    /// Maximum X edge.
    East,
    /// Minimum Y edge.
    South,
    /// Maximum Y edge.
    North,
    /// Rim of a circular arena.
    #[default]
    Rim,
}

/// Playable bounds of an arena.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ArenaShape {
    /// Axis-aligned rectangle.
    Rect {
        /// Minimum corner.
        min: Vec2,
        /// Maximum corner.
        max: Vec2,
    },
    /// Circle.
    Circle {
        /// Centre.
        center: Vec2,
        /// Radius.
        radius: f32,
    },
}

impl ArenaShape {
    /// Rectangle centred on the origin.
    #[must_use]
    pub fn centered_rect(width: f32, height: f32) -> Self {
        let half = Vec2::new(width * 0.5, height * 0.5);
        Self::Rect {
            min: -half,
            max: half,
        }
    }

    /// Geometric centre.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        match *self {
            Self::Rect { min, max } => min.lerp(max, 0.5),
            Self::Circle { center, .. } => center,
        }
    }

    /// Signed distance from `point` to the nearest boundary (positive inside)
    /// and which boundary that is.
    #[must_use]
    pub fn nearest_wall(&self, point: Vec2) -> (f32, WallSide) {
        match *self {
            Self::Rect { min, max } => {
                let candidates = [
                    (point.x - min.x, WallSide::West),
                    (max.x - point.x, WallSide::East),
                    (point.y - min.y, WallSide::South),
                    (max.y - point.y, WallSide::North),
                ];
                candidates
                    .into_iter()
                    .fold((f32::INFINITY, WallSide::West), |best, c| {
                        if c.0 < best.0 {
                            c
                        } else {
                            best
                        }
                    })
            }
            Self::Circle { center, radius } => (radius - point.distance(center), WallSide::Rim),
        }
    }

    /// Whether `point` lies inside the bounds with at least `margin` to spare.
    #[must_use]
    pub fn contains(&self, point: Vec2, margin: f32) -> bool {
        point.is_finite() && self.nearest_wall(point).0 >= margin
    }

    /// Clamp a circle of `radius` at `point` back inside the bounds.
    #[must_use]
    pub fn clamp(&self, point: Vec2, radius: f32) -> Vec2 {
        if !point.is_finite() {
            return self.center();
        }
        match *self {
            Self::Rect { min, max } => {
                let lo = Vec2::new(min.x + radius, min.y + radius);
                let hi = Vec2::new(max.x - radius, max.y - radius);
                let clamp_axis = |v: f32, lo: f32, hi: f32| {
                    if lo > hi {
                        (lo + hi) * 0.5
                    } else {
                        v.clamp(lo, hi)
                    }
                };
                Vec2::new(clamp_axis(point.x, lo.x, hi.x), clamp_axis(point.y, lo.y, hi.y))
            }
            Self::Circle {
                center,
                radius: arena_radius,
            } => {
                let limit = (arena_radius - radius).max(0.0);
                let offset = point - center;
                if offset.length() <= limit {
                    point
                } else {
                    center + offset.normalize() * limit
                }
            }
        }
    }
}

/// A solid circular obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Identifier, unique within an arena.
    pub id: ObstacleId,
    /// Centre of the footprint.
    pub center: Vec2,
    /// Half the footprint (collision radius).
    pub radius: f32,
}

impl Obstacle {
    /// Distance from `point` to the obstacle's edge.
    #[must_use]
    pub fn edge_distance(&self, point: Vec2) -> f32 {
        point.distance(self.center) - self.radius
    }
}

/// Read-only spatial queries the kernel needs from the level.
pub trait Arena: std::fmt::Debug + Send + Sync {
    /// Whether a circle of `radius` at `point` collides with anything solid.
    fn is_blocked(&self, point: Vec2, radius: f32) -> bool;

    /// Playable bounds.
    fn bounds(&self) -> ArenaShape;

    /// Known solid obstacles. Arenas without discrete obstacles return none.
    fn obstacles(&self) -> &[Obstacle] {
        &[]
    }
}

/// Bounded arena with circular obstacles. Walls count as solid.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxArena {
    shape: ArenaShape,
    obstacles: Vec<Obstacle>,
}

impl BoxArena {
    /// Create an arena with no obstacles.
    #[must_use]
    pub fn new(shape: ArenaShape) -> Self {
        Self {
            shape,
            obstacles: Vec::new(),
        }
    }

    /// Open rectangular arena centred on the origin.
    #[must_use]
    pub fn open(width: f32, height: f32) -> Self {
        Self::new(ArenaShape::centered_rect(width, height))
    }

    /// Builder method to add an obstacle. Ids are assigned in insertion order.
    #[must_use]
    pub fn with_obstacle(mut self, center: Vec2, radius: f32) -> Self {
        let id = self.obstacles.len() as ObstacleId;
        self.obstacles.push(Obstacle { id, center, radius });
        self
    }
}

impl Arena for BoxArena {
    fn is_blocked(&self, point: Vec2, radius: f32) -> bool {
        if !self.shape.contains(point, radius.max(0.0)) {
            return true;
        }
        self.obstacles
            .iter()
            .any(|o| o.edge_distance(point) < radius.max(0.0))
    }

    fn bounds(&self) -> ArenaShape {
        self.shape
    }

    fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }
}

/// Serializable arena description.
///
/// # Example RON
///
/// ```ron
/// (
///     shape: Rect(min: (x: -12.0, y: -8.0), max: (x: 12.0, y: 8.0)),
///     obstacles: [ (center: (x: 0.0, y: 4.0), radius: 1.0) ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaSpec {
    /// Bounds.
    pub shape: ArenaShape,
    /// Obstacles (ids are assigned in order).
    #[serde(default)]
    pub obstacles: Vec<ObstacleSpec>,
}

/// Obstacle entry in an [`ArenaSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    /// Centre.
    pub center: Vec2,
    /// Collision radius.
    pub radius: f32,
}

impl ArenaSpec {
    /// Parse from RON.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| DuelError::parse("arena", e))
    }

    /// Build the arena.
    #[must_use]
    pub fn build(&self) -> BoxArena {
        self.obstacles
            .iter()
            .fold(BoxArena::new(self.shape), |arena, o| {
                arena.with_obstacle(o.center, o.radius)
            })
    }
}

impl Default for ArenaSpec {
    fn default() -> Self {
        Self {
            shape: ArenaShape::centered_rect(24.0, 16.0),
            obstacles: Vec::new(),
        }
    }
}
