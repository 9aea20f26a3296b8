//! Axis-aligned box overlap and one-way platform landing
//!
//! Used by the headless physics collaborator. The simulation itself never
//! tests overlaps; it only consumes the events these checks produce.

use glam::Vec2;

use super::state::{Coin, Enemy, Platform};

/// How far above the surface a body may have been last step and still land
const LANDING_SLOP: f32 = 1.0;

/// Axis-aligned bounding box (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Box standing on `feet` (bottom-center anchor)
    pub fn from_bottom_center(feet: Vec2, size: Vec2) -> Self {
        Self {
            min: Vec2::new(feet.x - size.x / 2.0, feet.y - size.y),
            max: Vec2::new(feet.x + size.x / 2.0, feet.y),
        }
    }

    pub fn of_platform(platform: &Platform) -> Self {
        Self::from_center(platform.pos, platform.size)
    }

    pub fn of_coin(coin: &Coin, size: Vec2) -> Self {
        Self::from_center(coin.pos, size)
    }

    pub fn of_enemy(enemy: &Enemy, size: Vec2) -> Self {
        Self::from_bottom_center(enemy.pos, size)
    }

    /// Strict overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Horizontal extents overlap
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }
}

/// Result of a landing check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    /// y the body's bottom should snap to
    pub surface_y: f32,
    /// How far the body sank below the surface this step
    pub penetration: f32,
}

/// One-way platform check: the body's bottom crossed the platform top this step
/// while moving down, and the two overlap horizontally. A body resting on the
/// surface lands again every step.
pub fn land_on(prev_bottom: f32, body: &Aabb, platform: &Aabb, vel_y: f32) -> Option<Landing> {
    if vel_y < 0.0 || !body.overlaps_x(platform) {
        return None;
    }
    let top = platform.min.y;
    if prev_bottom <= top + LANDING_SLOP && body.max.y >= top {
        return Some(Landing {
            surface_y: top,
            penetration: body.max.y - top,
        });
    }
    None
}

/// Body rests on the platform surface (within `tolerance`)
pub fn standing_on(body: &Aabb, platform: &Aabb, tolerance: f32) -> bool {
    body.overlaps_x(platform) && (body.max.y - platform.min.y).abs() <= tolerance
}
