//! Attribute names.
//!
//! Attribute effects refer to the attribute they modify by [`AttributeKey`], so
//! an effect can be defined in data before any entity exists.

use serde::{Deserialize, Serialize};

/// Key naming an attribute on a combat entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeKey(pub String);

impl AttributeKey {
    /// Create a new attribute key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AttributeKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AttributeKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Names of the attributes every [`CombatAttributes`](super::CombatAttributes) carries.
pub mod keys {
    pub const HEALTH: &str = "health";
    pub const SHIELD: &str = "shield";
    pub const LEVEL: &str = "level";
    pub const EXPERIENCE: &str = "experience";
    pub const VELOCITY: &str = "velocity";
    pub const ATTACK_SPEED: &str = "attack_speed";
    pub const DAMAGE_MULTIPLIER: &str = "damage_multiplier";
    pub const HEALTH_REGENERATION: &str = "health_regeneration";
}
