//! Effect targeting.
//!
//! A [`TargetingStrategy`] turns an impact area and an (optional) executing
//! entity into the list of entities an effect applies to:
//!
//! 1. collect candidates for the [`TargetRelation`] (from the target lookup, or
//!    directly for `Executor` and `Fixed`)
//! 2. drop candidates failing the extra condition, if any
//! 3. sort by the custom comparator, or by distance to the executor
//! 4. single-target strategies keep the executor's explicit target when it is
//!    among the candidates, otherwise the first candidate
//!
//! ```
//! use rust_combat::effects::{TargetRelation, TargetingStrategy};
//!
//! let strategy = TargetingStrategy::enemies().single_target();
//! assert_eq!(strategy.relation(), &TargetRelation::Enemies);
//! assert!(!strategy.is_multi_target());
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::core::Result;
use crate::entities::{CombatEntity, EntityRef, TargetLookup};
use crate::physics::Shape;

/// Extra filter: `(executor, candidate) -> keep`.
pub type TargetCondition = Rc<dyn Fn(Option<&dyn CombatEntity>, &dyn CombatEntity) -> bool>;

/// Priority order among candidates; smaller comes first.
pub type TargetComparator = Rc<dyn Fn(&dyn CombatEntity, &dyn CombatEntity) -> Ordering>;

/// Which entities a strategy considers, relative to the executor.
#[derive(Clone, Debug, PartialEq)]
pub enum TargetRelation {
    /// Only the executing entity, wherever it is.
    Executor,
    /// Living entities not friendly to the executor.
    Enemies,
    /// Living entities friendly to the executor, excluding the executor.
    Friendly,
    /// Dead entities friendly to the executor, excluding the executor.
    FriendlyDead,
    /// Every entity in the impact area.
    Everyone,
    /// A fixed list, regardless of the impact area.
    Fixed(Vec<EntityRef>),
    /// Never selects anything.
    Nobody,
}

impl TargetRelation {
    /// Check whether `candidate` matches this relation.
    fn admits(&self, executor: Option<&dyn CombatEntity>, candidate: &dyn CombatEntity) -> bool {
        let Some(executor) = executor else {
            return match self {
                TargetRelation::Enemies => !candidate.is_dead(),
                TargetRelation::Everyone => true,
                _ => false,
            };
        };

        let other = candidate.id() != executor.id();
        match self {
            TargetRelation::Enemies => {
                other && !executor.is_friendly(candidate) && !candidate.is_dead()
            }
            TargetRelation::Friendly => {
                other && executor.is_friendly(candidate) && !candidate.is_dead()
            }
            TargetRelation::FriendlyDead => {
                other && executor.is_friendly(candidate) && candidate.is_dead()
            }
            TargetRelation::Everyone => true,
            TargetRelation::Executor | TargetRelation::Fixed(_) | TargetRelation::Nobody => false,
        }
    }
}

/// Selects the entities an effect applies to.
#[derive(Clone)]
pub struct TargetingStrategy {
    relation: TargetRelation,
    multi_target: bool,
    prioritize_by_distance: bool,
    condition: Option<TargetCondition>,
    comparator: Option<TargetComparator>,
}

impl TargetingStrategy {
    /// Create a multi-target strategy for `relation`.
    pub fn new(relation: TargetRelation) -> Self {
        Self {
            relation,
            multi_target: true,
            prioritize_by_distance: true,
            condition: None,
            comparator: None,
        }
    }

    /// Target the executing entity.
    pub fn executor() -> Self {
        Self::new(TargetRelation::Executor)
    }

    /// Target living enemies.
    pub fn enemies() -> Self {
        Self::new(TargetRelation::Enemies)
    }

    /// Target living allies.
    pub fn friendly() -> Self {
        Self::new(TargetRelation::Friendly)
    }

    /// Target dead allies.
    pub fn friendly_dead() -> Self {
        Self::new(TargetRelation::FriendlyDead)
    }

    /// Target everything in the area.
    pub fn everyone() -> Self {
        Self::new(TargetRelation::Everyone)
    }

    /// Target a fixed list of entities.
    pub fn fixed(targets: impl IntoIterator<Item = EntityRef>) -> Self {
        Self::new(TargetRelation::Fixed(targets.into_iter().collect()))
    }

    /// Target nothing.
    pub fn nobody() -> Self {
        Self::new(TargetRelation::Nobody)
    }

    /// Target everything in the area that passes `predicate`.
    pub fn custom(
        predicate: impl Fn(Option<&dyn CombatEntity>, &dyn CombatEntity) -> bool + 'static,
    ) -> Self {
        Self::everyone().with_condition(predicate)
    }

    /// Set whether all candidates or only one are selected.
    #[must_use]
    pub fn with_multi_target(mut self, multi_target: bool) -> Self {
        self.multi_target = multi_target;
        self
    }

    /// Select only one candidate.
    #[must_use]
    pub fn single_target(self) -> Self {
        self.with_multi_target(false)
    }

    /// Set whether candidates are sorted by distance to the executor.
    #[must_use]
    pub fn with_distance_priority(mut self, prioritize: bool) -> Self {
        self.prioritize_by_distance = prioritize;
        self
    }

    /// Add an extra `(executor, candidate)` filter.
    #[must_use]
    pub fn with_condition(
        mut self,
        condition: impl Fn(Option<&dyn CombatEntity>, &dyn CombatEntity) -> bool + 'static,
    ) -> Self {
        self.condition = Some(Rc::new(condition));
        self
    }

    /// Sort candidates with a custom priority instead of distance.
    #[must_use]
    pub fn with_comparator(
        mut self,
        comparator: impl Fn(&dyn CombatEntity, &dyn CombatEntity) -> Ordering + 'static,
    ) -> Self {
        self.comparator = Some(Rc::new(comparator));
        self
    }

    /// The relation this strategy selects by.
    #[must_use]
    pub fn relation(&self) -> &TargetRelation {
        &self.relation
    }

    /// Check whether every candidate is selected.
    #[must_use]
    pub fn is_multi_target(&self) -> bool {
        self.multi_target
    }

    /// Check whether candidates are sorted by distance.
    #[must_use]
    pub fn prioritizes_by_distance(&self) -> bool {
        self.prioritize_by_distance
    }

    /// Select the entities affected by an impact in `area`.
    pub fn find_targets(
        &self,
        area: &Shape,
        executor: Option<&EntityRef>,
        lookup: &dyn TargetLookup,
    ) -> Result<Vec<EntityRef>> {
        let executor_guard = executor.map(EntityRef::borrow).transpose()?;
        let executor_entity: Option<&dyn CombatEntity> = executor_guard.as_deref();

        let candidates = match &self.relation {
            TargetRelation::Executor => executor.cloned().into_iter().collect(),
            TargetRelation::Fixed(targets) => targets.clone(),
            TargetRelation::Nobody => Vec::new(),
            relation => {
                let mut admitted = Vec::new();
                for candidate in lookup.find_combat_entities(area) {
                    let keep = if executor.is_some_and(|e| e.ptr_eq(&candidate)) {
                        executor_entity.is_some_and(|e| relation.admits(Some(e), e))
                    } else {
                        let entity = candidate.borrow()?;
                        relation.admits(executor_entity, &*entity)
                    };
                    if keep {
                        admitted.push(candidate);
                    }
                }
                admitted
            }
        };

        let mut candidates = self.apply_condition(candidates, executor, executor_entity)?;
        if candidates.is_empty() {
            return Ok(candidates);
        }

        if let Some(executor_entity) = executor_entity {
            candidates = self.prioritize(candidates, executor, executor_entity)?;
        }

        if self.multi_target {
            return Ok(candidates);
        }

        let explicit = executor_entity
            .and_then(|e| e.target())
            .and_then(|id| candidates.iter().position(|c| c.id() == id));
        let chosen = candidates.swap_remove(explicit.unwrap_or(0));
        Ok(vec![chosen])
    }

    fn apply_condition(
        &self,
        candidates: Vec<EntityRef>,
        executor: Option<&EntityRef>,
        executor_entity: Option<&dyn CombatEntity>,
    ) -> Result<Vec<EntityRef>> {
        let Some(condition) = &self.condition else {
            return Ok(candidates);
        };

        let mut kept = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let keep = match (executor, executor_entity) {
                (Some(e), Some(entity)) if e.ptr_eq(&candidate) => condition(Some(entity), entity),
                _ => {
                    let entity = candidate.borrow()?;
                    condition(executor_entity, &*entity)
                }
            };
            if keep {
                kept.push(candidate);
            }
        }
        Ok(kept)
    }

    /// Stable sort by the comparator, or by distance to the executor.
    fn prioritize(
        &self,
        candidates: Vec<EntityRef>,
        executor: Option<&EntityRef>,
        executor_entity: &dyn CombatEntity,
    ) -> Result<Vec<EntityRef>> {
        if self.comparator.is_none() && !self.prioritize_by_distance {
            return Ok(candidates);
        }

        let mut order: Vec<usize> = (0..candidates.len()).collect();
        {
            let mut guards = Vec::with_capacity(candidates.len());
            for candidate in &candidates {
                if executor.is_some_and(|e| e.ptr_eq(candidate)) {
                    guards.push(None);
                } else {
                    guards.push(Some(candidate.borrow()?));
                }
            }
            let entity_at = |index: usize| -> &dyn CombatEntity {
                match &guards[index] {
                    Some(guard) => &**guard,
                    None => executor_entity,
                }
            };

            match &self.comparator {
                Some(comparator) => {
                    order.sort_by(|&a, &b| comparator(entity_at(a), entity_at(b)));
                }
                None => {
                    let origin = executor_entity.position();
                    order.sort_by(|&a, &b| {
                        let da = entity_at(a).position().distance_squared(origin);
                        let db = entity_at(b).position().distance_squared(origin);
                        da.partial_cmp(&db).unwrap_or(Ordering::Equal)
                    });
                }
            }
        }

        let mut slots: Vec<Option<EntityRef>> = candidates.into_iter().map(Some).collect();
        Ok(order
            .into_iter()
            .filter_map(|index| slots[index].take())
            .collect())
    }
}

impl Default for TargetingStrategy {
    fn default() -> Self {
        Self::nobody()
    }
}

impl fmt::Debug for TargetingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetingStrategy")
            .field("relation", &self.relation)
            .field("multi_target", &self.multi_target)
            .field("prioritize_by_distance", &self.prioritize_by_distance)
            .field("condition", &self.condition.is_some())
            .field("comparator", &self.comparator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityId;
    use crate::entities::{Combatant, EntityRegistry, TeamId};
    use glam::Vec2;

    struct Arena {
        registry: EntityRegistry,
        hero: EntityRef,
    }

    /// Hero (team 0) at origin, ally at 3, dead ally at 4, enemies at 2 and 6.
    fn arena() -> Arena {
        let registry = EntityRegistry::new();
        let hero = registry.add(Combatant::new(EntityId(1), TeamId(0)));
        registry.add(Combatant::new(EntityId(2), TeamId(1)).with_position(Vec2::new(6.0, 0.0)));
        registry.add(Combatant::new(EntityId(3), TeamId(0)).with_position(Vec2::new(3.0, 0.0)));
        let mut fallen = Combatant::new(EntityId(4), TeamId(0)).with_position(Vec2::new(4.0, 0.0));
        fallen.die().unwrap();
        registry.add(fallen);
        registry.add(Combatant::new(EntityId(5), TeamId(1)).with_position(Vec2::new(2.0, 0.0)));
        Arena { registry, hero }
    }

    fn ids(entities: &[EntityRef]) -> Vec<u32> {
        entities.iter().map(|e| e.id().raw()).collect()
    }

    fn area() -> Shape {
        Shape::circle(Vec2::ZERO, 10.0)
    }

    #[test]
    fn test_enemies_sorted_by_distance() {
        let arena = arena();
        let found = TargetingStrategy::enemies()
            .find_targets(&area(), Some(&arena.hero), &arena.registry)
            .unwrap();
        assert_eq!(ids(&found), vec![5, 2]);
    }

    #[test]
    fn test_friendly_relations() {
        let arena = arena();
        let alive = TargetingStrategy::friendly()
            .find_targets(&area(), Some(&arena.hero), &arena.registry)
            .unwrap();
        assert_eq!(ids(&alive), vec![3]);

        let dead = TargetingStrategy::friendly_dead()
            .find_targets(&area(), Some(&arena.hero), &arena.registry)
            .unwrap();
        assert_eq!(ids(&dead), vec![4]);
    }

    #[test]
    fn test_executor_and_fixed() {
        let arena = arena();
        let far_away = Shape::circle(Vec2::new(500.0, 500.0), 1.0);

        let me = TargetingStrategy::executor()
            .find_targets(&far_away, Some(&arena.hero), &arena.registry)
            .unwrap();
        assert_eq!(ids(&me), vec![1]);

        let fixed = TargetingStrategy::fixed(arena.registry.get(EntityId(2)))
            .with_distance_priority(false)
            .find_targets(&far_away, None, &arena.registry)
            .unwrap();
        assert_eq!(ids(&fixed), vec![2]);
    }

    #[test]
    fn test_no_executor() {
        let arena = arena();
        let strategy = |s: TargetingStrategy| s.find_targets(&area(), None, &arena.registry).unwrap();

        assert!(strategy(TargetingStrategy::executor()).is_empty());
        assert!(strategy(TargetingStrategy::friendly()).is_empty());
        assert_eq!(ids(&strategy(TargetingStrategy::enemies())), vec![1, 2, 3, 5]);
        assert_eq!(strategy(TargetingStrategy::everyone()).len(), 5);
        assert!(strategy(TargetingStrategy::nobody()).is_empty());
    }

    #[test]
    fn test_single_target_prefers_explicit_target() {
        let arena = arena();
        let strategy = TargetingStrategy::enemies().single_target();

        let nearest = strategy
            .find_targets(&area(), Some(&arena.hero), &arena.registry)
            .unwrap();
        assert_eq!(ids(&nearest), vec![5]);
    }

    #[test]
    fn test_explicit_target_outside_candidates_is_ignored() {
        let registry = EntityRegistry::new();
        let mut hero = Combatant::new(EntityId(1), TeamId(0));
        hero.set_target(Some(EntityId(2)));
        let hero = registry.add(hero);
        registry.add(Combatant::new(EntityId(2), TeamId(1)).with_position(Vec2::new(6.0, 0.0)));
        registry.add(Combatant::new(EntityId(3), TeamId(1)).with_position(Vec2::new(2.0, 0.0)));
        registry.add(Combatant::new(EntityId(4), TeamId(0)).with_position(Vec2::new(1.0, 0.0)));

        let strategy = TargetingStrategy::enemies().single_target();
        let chosen = strategy
            .find_targets(&area(), Some(&hero), &registry)
            .unwrap();
        assert_eq!(ids(&chosen), vec![2]);

        let small = Shape::circle(Vec2::ZERO, 3.0);
        let chosen = strategy.find_targets(&small, Some(&hero), &registry).unwrap();
        assert_eq!(ids(&chosen), vec![3]);
    }

    #[test]
    fn test_condition_and_comparator() {
        let arena = arena();
        let strategy = TargetingStrategy::everyone()
            .with_condition(|_, candidate| !candidate.is_dead())
            .with_comparator(|a, b| b.id().cmp(&a.id()));

        let found = strategy
            .find_targets(&area(), Some(&arena.hero), &arena.registry)
            .unwrap();
        assert_eq!(ids(&found), vec![5, 3, 2, 1]);
    }

    #[test]
    fn test_custom_strategy() {
        let arena = arena();
        let strategy = TargetingStrategy::custom(|_, c| c.position().x > 2.5);
        let found = strategy
            .find_targets(&area(), None, &arena.registry)
            .unwrap();
        assert_eq!(ids(&found), vec![2, 3, 4]);
    }
}
