//! Impact areas.
//!
//! Angles are in degrees with 0 pointing along +y and 90 along +x, so
//! projecting a point moves it by `(sin, cos) * distance`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Project `origin` by `distance` along `angle` (degrees).
#[must_use]
pub fn project(origin: Vec2, angle: f32, distance: f32) -> Vec2 {
    let radians = angle.to_radians();
    origin + Vec2::new(radians.sin(), radians.cos()) * distance
}

/// Angle of `direction` in degrees, in `[0, 360)`.
#[must_use]
pub fn angle_of(direction: Vec2) -> f32 {
    direction.x.atan2(direction.y).to_degrees().rem_euclid(360.0)
}

/// Smallest absolute difference between two angles in degrees.
#[must_use]
pub fn angle_between(a: f32, b: f32) -> f32 {
    let diff = (a - b).rem_euclid(360.0);
    diff.min(360.0 - diff)
}

/// A region entities can be looked up in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Everything within `radius` of `center`.
    Circle { center: Vec2, radius: f32 },
    /// A pie slice of `spread` degrees centred on `facing`.
    Sector {
        center: Vec2,
        radius: f32,
        facing: f32,
        spread: f32,
    },
    /// Axis-aligned rectangle.
    Rect { min: Vec2, max: Vec2 },
}

impl Shape {
    /// Circle constructor.
    #[must_use]
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Shape::Circle { center, radius }
    }

    /// Sector constructor.
    #[must_use]
    pub fn sector(center: Vec2, radius: f32, facing: f32, spread: f32) -> Self {
        Shape::Sector {
            center,
            radius,
            facing,
            spread,
        }
    }

    /// Rectangle constructor; corners may be given in any order.
    #[must_use]
    pub fn rect(a: Vec2, b: Vec2) -> Self {
        Shape::Rect {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Centre of the shape.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        match *self {
            Shape::Circle { center, .. } | Shape::Sector { center, .. } => center,
            Shape::Rect { min, max } => (min + max) * 0.5,
        }
    }

    /// Check whether `point` lies inside the shape (edges included).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        match *self {
            Shape::Circle { center, radius } => point.distance_squared(center) <= radius * radius,
            Shape::Sector {
                center,
                radius,
                facing,
                spread,
            } => {
                let offset = point - center;
                if offset.length_squared() > radius * radius {
                    return false;
                }
                if offset == Vec2::ZERO || spread >= 360.0 {
                    return true;
                }
                angle_between(angle_of(offset), facing) <= spread * 0.5
            }
            Shape::Rect { min, max } => {
                point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
            }
        }
    }
}
