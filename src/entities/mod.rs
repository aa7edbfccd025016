//! Combat entities and target lookup.
//!
//! - [`CombatEntity`]: what effects need from an entity
//! - [`EntityRef`]: shared handle used everywhere the engine keeps an entity
//! - [`Combatant`]: the reference implementation
//! - [`TargetLookup`] / [`EntityRegistry`]: find entities inside an impact area

pub mod entity;
pub mod combatant;
pub mod registry;

pub use entity::{AppliedEffects, CombatEntity, EntityRef, TeamId};
pub use combatant::Combatant;
pub use registry::{EntityRegistry, TargetLookup};
