//! Identifiers for combat entities and effects.
//!
//! Entities are owned by the game (or an [`EntityRegistry`](crate::entities::EntityRegistry))
//! and referenced by `EntityId` everywhere the engine needs identity without a
//! borrow: applied-effect bookkeeping, explicit targets, hit events.
//!
//! Effects get an `EffectId` from the [`EngineContext`](super::EngineContext)
//! that built them, so ids are unique per engine and deterministic across runs.
//!
//! ## Usage
//!
//! ```
//! use rust_combat::core::{EffectId, EntityId};
//!
//! let hero = EntityId::new(1);
//! let slime = EntityId(2);
//! assert_ne!(hero, slime);
//! assert_eq!(hero.raw(), 1);
//!
//! assert_eq!(format!("{}", EffectId::new(7)), "Effect(7)");
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a combat entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create a new entity ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Unique identifier for an effect definition.
///
/// Ids are handed out by [`EngineContext::next_effect_id`](super::EngineContext::next_effect_id).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectId(pub u32);

impl EffectId {
    /// Create a new effect ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Effect({})", self.0)
    }
}
