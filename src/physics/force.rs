//! Forces handed to the physics engine.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use glam::Vec2;

use crate::entities::EntityRef;

/// Shared force handle. The physics engine and the effect that created the
/// force both hold one.
pub type ForceRef = Rc<Force>;

/// A force pulling (or pushing) mobile entities towards a location.
///
/// Forces are mutated through shared references: the physics engine ends
/// them when they reach their target, effects end them when they cease.
pub struct Force {
    location: Cell<Vec2>,
    strength: Cell<f32>,
    size: f32,
    cancel_on_collision: Cell<bool>,
    cancel_on_reached: Cell<bool>,
    ended: Cell<bool>,
    identifier: RefCell<Option<String>>,
}

impl Force {
    /// Create a force at `location` with `strength` in px/sec and a reach of `size`.
    pub fn new(location: Vec2, strength: f32, size: f32) -> Self {
        Self {
            location: Cell::new(location),
            strength: Cell::new(strength),
            size,
            cancel_on_collision: Cell::new(true),
            cancel_on_reached: Cell::new(true),
            ended: Cell::new(false),
            identifier: RefCell::new(None),
        }
    }

    /// Create a shared force.
    pub fn shared(location: Vec2, strength: f32, size: f32) -> ForceRef {
        Rc::new(Self::new(location, strength, size))
    }

    /// Target location.
    #[must_use]
    pub fn location(&self) -> Vec2 {
        self.location.get()
    }

    /// Move the target location.
    pub fn set_location(&self, location: Vec2) {
        self.location.set(location);
    }

    /// Strength in px/sec.
    #[must_use]
    pub fn strength(&self) -> f32 {
        self.strength.get()
    }

    /// Change the strength.
    pub fn set_strength(&self, strength: f32) {
        self.strength.set(strength);
    }

    /// Diameter of the target area.
    #[must_use]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Check if the force stops when the entity collides.
    #[must_use]
    pub fn cancel_on_collision(&self) -> bool {
        self.cancel_on_collision.get()
    }

    /// Set whether the force stops when the entity collides.
    pub fn set_cancel_on_collision(&self, cancel: bool) {
        self.cancel_on_collision.set(cancel);
    }

    /// Check if the force stops once the entity reaches the target.
    #[must_use]
    pub fn cancel_on_reached(&self) -> bool {
        self.cancel_on_reached.get()
    }

    /// Set whether the force stops once the entity reaches the target.
    pub fn set_cancel_on_reached(&self, cancel: bool) {
        self.cancel_on_reached.set(cancel);
    }

    /// Stop the force.
    pub fn end(&self) {
        self.ended.set(true);
    }

    /// Check if the force has stopped.
    #[must_use]
    pub fn has_ended(&self) -> bool {
        self.ended.get()
    }

    /// Check whether a body of `radius` at `position` touches the target area.
    #[must_use]
    pub fn has_reached(&self, position: Vec2, radius: f32) -> bool {
        let reach = self.size * 0.5 + radius;
        position.distance_squared(self.location.get()) <= reach * reach
    }

    /// Optional name for debugging.
    #[must_use]
    pub fn identifier(&self) -> Option<String> {
        self.identifier.borrow().clone()
    }

    /// Name the force.
    pub fn set_identifier(&self, identifier: impl Into<String>) {
        *self.identifier.borrow_mut() = Some(identifier.into());
    }
}

impl fmt::Debug for Force {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Force")
            .field("identifier", &self.identifier.borrow())
            .field("location", &self.location.get())
            .field("strength", &self.strength.get())
            .field("size", &self.size)
            .field("ended", &self.ended.get())
            .finish()
    }
}

impl fmt::Display for Force {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.identifier().unwrap_or_else(|| "Force".to_string());
        let location = self.location.get();
        write!(
            f,
            "{name}: {}px/sec; ({}, {})",
            self.strength.get(),
            location.x,
            location.y
        )
    }
}

/// Receives forces applied by force effects.
pub trait PhysicsSink {
    /// Start moving `entity` under `force`.
    fn apply_force(&self, entity: &EntityRef, force: ForceRef);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end() {
        let force = Force::shared(Vec2::ZERO, 100.0, 4.0);
        let held = force.clone();
        assert!(!held.has_ended());
        force.end();
        assert!(held.has_ended());
    }

    #[test]
    fn test_has_reached() {
        let force = Force::new(Vec2::new(10.0, 0.0), 50.0, 4.0);
        assert!(force.has_reached(Vec2::new(7.0, 0.0), 1.0));
        assert!(!force.has_reached(Vec2::new(6.0, 0.0), 1.0));
    }

    #[test]
    fn test_display() {
        let force = Force::new(Vec2::new(1.0, 2.0), 30.0, 1.0);
        assert_eq!(force.to_string(), "Force: 30px/sec; (1, 2)");
        force.set_identifier("knockback");
        assert!(force.to_string().starts_with("knockback:"));
        assert!(force.cancel_on_collision());
    }
}
