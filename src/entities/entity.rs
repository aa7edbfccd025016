//! Combat entities and shared handles to them.
//!
//! The engine talks to entities through the [`CombatEntity`] trait and holds them
//! as [`EntityRef`]s: a shared, interior-mutable handle that caches the entity id
//! so identity checks never need a borrow.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use glam::Vec2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::attributes::CombatAttributes;
use crate::core::{CombatError, EffectId, EntityId, Result};

/// Team identifier. Entities on the same team are friendly to each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamId(pub u32);

impl TeamId {
    /// Create a new team ID.
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

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team({})", self.0)
    }
}

/// Effects currently applied to an entity.
///
/// This is a counted set: an effect applied twice through overlapping
/// appliances stays applied until it has been ceased twice.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppliedEffects {
    counts: FxHashMap<EffectId, u32>,
}

impl AppliedEffects {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one application of `effect`.
    pub fn add(&mut self, effect: EffectId) {
        *self.counts.entry(effect).or_insert(0) += 1;
    }

    /// Drop one application of `effect`. Returns `false` if it was not applied.
    pub fn remove(&mut self, effect: EffectId) -> bool {
        match self.counts.get_mut(&effect) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.counts.remove(&effect);
                true
            }
            None => false,
        }
    }

    /// Check whether `effect` is applied at least once.
    #[must_use]
    pub fn contains(&self, effect: EffectId) -> bool {
        self.counts.contains_key(&effect)
    }

    /// How many times `effect` is applied.
    #[must_use]
    pub fn count(&self, effect: EffectId) -> u32 {
        self.counts.get(&effect).copied().unwrap_or(0)
    }

    /// Number of distinct applied effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if no effect is applied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Distinct applied effects, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = EffectId> + '_ {
        self.counts.keys().copied()
    }
}

/// What the engine needs from an entity taking part in combat.
pub trait CombatEntity {
    /// Unique id. Must not change while the entity is shared.
    fn id(&self) -> EntityId;

    /// Team the entity fights for.
    fn team(&self) -> TeamId;

    /// World position.
    fn position(&self) -> Vec2;

    /// Facing angle in degrees (0 = +y, 90 = +x).
    fn angle(&self) -> f32;

    /// Explicitly selected target, if any.
    fn target(&self) -> Option<EntityId>;

    /// Check whether the entity is dead.
    fn is_dead(&self) -> bool;

    /// Check whether `other` fights on the same side.
    fn is_friendly(&self, other: &dyn CombatEntity) -> bool {
        self.team() == other.team()
    }

    /// Deal `damage`. Returns `true` if this hit killed the entity.
    fn hit(&mut self, damage: i32) -> Result<bool>;

    /// Combat attributes.
    fn attributes(&self) -> &CombatAttributes;

    /// Combat attributes, mutably.
    fn attributes_mut(&mut self) -> &mut CombatAttributes;

    /// Effects currently applied to the entity.
    fn applied_effects(&self) -> &AppliedEffects;

    /// Effects currently applied to the entity, mutably.
    fn applied_effects_mut(&mut self) -> &mut AppliedEffects;

    /// Check whether forces can move the entity.
    fn is_mobile(&self) -> bool {
        false
    }
}

/// Shared handle to a combat entity.
///
/// Equality and hashing use the entity id.
#[derive(Clone)]
pub struct EntityRef {
    id: EntityId,
    inner: Rc<RefCell<dyn CombatEntity>>,
}

impl EntityRef {
    /// Wrap an entity in a new shared handle.
    pub fn new<E: CombatEntity + 'static>(entity: E) -> Self {
        let id = entity.id();
        Self {
            id,
            inner: Rc::new(RefCell::new(entity)),
        }
    }

    /// The entity id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Borrow the entity.
    pub fn borrow(&self) -> Result<Ref<'_, dyn CombatEntity>> {
        self.inner
            .try_borrow()
            .map_err(|_| CombatError::EntityBorrowed(self.id))
    }

    /// Borrow the entity mutably.
    pub fn borrow_mut(&self) -> Result<RefMut<'_, dyn CombatEntity + 'static>> {
        self.inner
            .try_borrow_mut()
            .map_err(|_| CombatError::EntityBorrowed(self.id))
    }

    /// Run `f` with the entity borrowed.
    pub fn with<R>(&self, f: impl FnOnce(&dyn CombatEntity) -> R) -> Result<R> {
        let entity = self.borrow()?;
        Ok(f(&*entity))
    }

    /// Run `f` with the entity borrowed mutably.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut dyn CombatEntity) -> R) -> Result<R> {
        let mut entity = self.borrow_mut()?;
        Ok(f(&mut *entity))
    }

    /// Check whether both handles share the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntityRef {}

impl Hash for EntityRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityRef").field(&self.id).finish()
    }
}
