//! Target lookup.
//!
//! Targeting strategies ask a [`TargetLookup`] for the combat entities inside an
//! impact area. [`EntityRegistry`] is the in-memory implementation: it answers
//! in registration order, so lookups are deterministic.

use std::cell::RefCell;

use super::entity::{CombatEntity, EntityRef};
use crate::core::EntityId;
use crate::physics::Shape;

/// Finds combat entities inside a shape.
pub trait TargetLookup {
    /// Every combat entity whose position lies inside `area`.
    fn find_combat_entities(&self, area: &Shape) -> Vec<EntityRef>;
}

/// Registry of live combat entities.
///
/// ## Example
///
/// ```
/// use glam::Vec2;
/// use rust_combat::core::EntityId;
/// use rust_combat::entities::{Combatant, EntityRegistry, TargetLookup, TeamId};
/// use rust_combat::physics::Shape;
///
/// let registry = EntityRegistry::new();
/// registry.add(Combatant::new(EntityId(1), TeamId(0)).with_position(Vec2::new(1.0, 0.0)));
/// registry.add(Combatant::new(EntityId(2), TeamId(1)).with_position(Vec2::new(50.0, 0.0)));
///
/// let found = registry.find_combat_entities(&Shape::circle(Vec2::ZERO, 5.0));
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].id(), EntityId(1));
/// ```
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: RefCell<Vec<EntityRef>>,
}

impl EntityRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap and register an entity, returning its handle.
    pub fn add<E: CombatEntity + 'static>(&self, entity: E) -> EntityRef {
        let handle = EntityRef::new(entity);
        self.register(handle.clone());
        handle
    }

    /// Register a handle. A handle with the same id replaces the old one in place.
    pub fn register(&self, entity: EntityRef) {
        let mut entities = self.entities.borrow_mut();
        match entities.iter_mut().find(|e| e.id() == entity.id()) {
            Some(existing) => *existing = entity,
            None => entities.push(entity),
        }
    }

    /// Remove an entity by id.
    pub fn remove(&self, id: EntityId) -> Option<EntityRef> {
        let mut entities = self.entities.borrow_mut();
        let index = entities.iter().position(|e| e.id() == id)?;
        Some(entities.remove(index))
    }

    /// Get an entity handle by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<EntityRef> {
        self.entities.borrow().iter().find(|e| e.id() == id).cloned()
    }

    /// Every registered handle in registration order.
    #[must_use]
    pub fn all(&self) -> Vec<EntityRef> {
        self.entities.borrow().clone()
    }

    /// Number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.borrow().len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.borrow().is_empty()
    }
}

impl TargetLookup for EntityRegistry {
    fn find_combat_entities(&self, area: &Shape) -> Vec<EntityRef> {
        self.entities
            .borrow()
            .iter()
            .filter(|entity| match entity.borrow() {
                Ok(inner) => area.contains(inner.position()),
                Err(err) => {
                    tracing::warn!(entity = %entity.id(), %err, "skipping entity during lookup");
                    false
                }
            })
            .cloned()
            .collect()
    }
}
