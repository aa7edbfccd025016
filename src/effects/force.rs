//! Force effects: push or pull mobile entities through the physics engine.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::application::EffectApplication;
use super::effect::{EffectBehavior, EffectContext};
use crate::core::{EntityId, Result};
use crate::entities::{CombatEntity, EntityRef};
use crate::physics::{angle_of, project, Force, ForceRef, PhysicsSink};

/// Builds the force for `(target, executor)`.
pub type ForceFactory = Rc<dyn Fn(&dyn CombatEntity, Option<&dyn CombatEntity>) -> ForceRef>;

/// Applies one force to every affected mobile entity.
///
/// An application counts as ended as soon as every force it created has
/// ended, whatever its remaining duration.
pub struct ForceEffect {
    sink: Rc<dyn PhysicsSink>,
    factory: ForceFactory,
    // Forces created per application sequence.
    forces: RefCell<FxHashMap<u64, Vec<(EntityId, ForceRef)>>>,
    // Latest force of this effect on each entity.
    current: RefCell<FxHashMap<EntityId, ForceRef>>,
}

impl ForceEffect {
    /// Build forces with `factory` and hand them to `sink`.
    pub fn new(
        sink: Rc<dyn PhysicsSink>,
        factory: impl Fn(&dyn CombatEntity, Option<&dyn CombatEntity>) -> ForceRef + 'static,
    ) -> Self {
        Self {
            sink,
            factory: Rc::new(factory),
            forces: RefCell::new(FxHashMap::default()),
            current: RefCell::new(FxHashMap::default()),
        }
    }

    /// Push targets `distance` away from the executor.
    ///
    /// Without an executor, targets are pushed along their facing angle.
    pub fn knockback(sink: Rc<dyn PhysicsSink>, strength: f32, distance: f32) -> Self {
        Self::new(sink, move |target, executor| {
            let origin = target.position();
            let angle = match executor {
                Some(executor) if executor.position() != origin => {
                    angle_of(origin - executor.position())
                }
                _ => target.angle(),
            };
            let force = Force::shared(project(origin, angle, distance), strength, 1.0);
            force.set_identifier("knockback");
            force
        })
    }

    /// The force currently applied to `entity` by this effect.
    #[must_use]
    pub fn current_force(&self, entity: EntityId) -> Option<ForceRef> {
        self.current.borrow().get(&entity).cloned()
    }

    fn build_force(&self, ctx: &EffectContext<'_>, entity: &EntityRef) -> Result<Option<ForceRef>> {
        let target = entity.borrow()?;
        if !target.is_mobile() {
            return Ok(None);
        }

        let force = match ctx.executor {
            Some(executor) if executor.ptr_eq(entity) => (self.factory)(&*target, Some(&*target)),
            Some(executor) => {
                let executor = executor.borrow()?;
                (self.factory)(&*target, Some(&*executor))
            }
            None => (self.factory)(&*target, None),
        };
        Ok(Some(force))
    }
}

impl EffectBehavior for ForceEffect {
    fn apply(&self, ctx: &EffectContext<'_>, entity: &EntityRef) -> Result<()> {
        let Some(force) = self.build_force(ctx, entity)? else {
            return Ok(());
        };

        if let Some(previous) = self
            .current
            .borrow_mut()
            .insert(entity.id(), Rc::clone(&force))
        {
            previous.end();
        }
        self.forces
            .borrow_mut()
            .entry(ctx.application.sequence())
            .or_default()
            .push((entity.id(), Rc::clone(&force)));

        self.sink.apply_force(entity, force);
        Ok(())
    }

    fn cease(&self, ctx: &EffectContext<'_>, entity: &EntityRef) -> Result<()> {
        let sequence = ctx.application.sequence();
        let force = {
            let mut forces = self.forces.borrow_mut();
            let Some(created) = forces.get_mut(&sequence) else {
                return Ok(());
            };
            let force = created
                .iter()
                .position(|(id, _)| *id == entity.id())
                .map(|index| created.swap_remove(index).1);
            if created.is_empty() {
                forces.remove(&sequence);
            }
            force
        };

        let Some(force) = force else {
            return Ok(());
        };
        force.end();

        let mut current = self.current.borrow_mut();
        if current
            .get(&entity.id())
            .is_some_and(|latest| Rc::ptr_eq(latest, &force))
        {
            current.remove(&entity.id());
        }
        Ok(())
    }

    fn has_custom_ended(&self, application: &EffectApplication) -> bool {
        self.forces
            .borrow()
            .get(&application.sequence())
            .is_some_and(|created| {
                !created.is_empty() && created.iter().all(|(_, force)| force.has_ended())
            })
    }
}

impl fmt::Debug for ForceEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForceEffect")
            .field("applications", &self.forces.borrow().len())
            .field("current", &self.current.borrow().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EngineContext, GameLoop};
    use crate::effects::{Effect, TargetingStrategy};
    use crate::entities::{Combatant, EntityRegistry, TeamId};
    use crate::physics::Shape;
    use glam::Vec2;

    #[derive(Default)]
    struct RecordingPhysics {
        applied: RefCell<Vec<(EntityId, ForceRef)>>,
    }

    impl PhysicsSink for RecordingPhysics {
        fn apply_force(&self, entity: &EntityRef, force: ForceRef) {
            self.applied.borrow_mut().push((entity.id(), force));
        }
    }

    #[test]
    fn test_only_mobile_entities_get_forces() {
        let registry = Rc::new(EntityRegistry::new());
        let ctx = EngineContext::with_game_loop(Rc::new(GameLoop::default()), registry.clone());
        let physics = Rc::new(RecordingPhysics::default());
        let hero = registry.add(Combatant::new(EntityId(1), TeamId(0)));
        registry.add(
            Combatant::new(EntityId(2), TeamId(1))
                .with_position(Vec2::new(0.0, 2.0))
                .mobile(),
        );
        registry.add(Combatant::new(EntityId(3), TeamId(1)).with_position(Vec2::new(2.0, 0.0)));

        let effect = Effect::builder(&ctx, TargetingStrategy::enemies())
            .with_executor(hero)
            .with_behavior(ForceEffect::knockback(physics.clone(), 100.0, 10.0))
            .build();
        effect.apply(&Shape::circle(Vec2::ZERO, 5.0)).unwrap();

        let applied = physics.applied.borrow();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].0, EntityId(2));
        let location = applied[0].1.location();
        assert!((location - Vec2::new(0.0, 12.0)).length() < 1e-4);
    }

    #[test]
    fn test_cease_ends_force() {
        let registry = Rc::new(EntityRegistry::new());
        let ctx = EngineContext::with_game_loop(Rc::new(GameLoop::default()), registry.clone());
        let physics = Rc::new(RecordingPhysics::default());
        registry.add(Combatant::new(EntityId(1), TeamId(0)).mobile());

        let effect = Effect::builder(&ctx, TargetingStrategy::everyone())
            .with_behavior(ForceEffect::knockback(physics.clone(), 100.0, 10.0))
            .build();
        let first = effect.apply(&Shape::circle(Vec2::ZERO, 5.0)).unwrap();
        let second = effect.apply(&Shape::circle(Vec2::ZERO, 5.0)).unwrap();

        let applied = physics.applied.borrow().clone();
        assert!(applied[0].1.has_ended());
        assert!(!applied[1].1.has_ended());

        effect.cease(&second).unwrap();
        assert!(applied[1].1.has_ended());
        assert!(effect.cease(&first).unwrap());
    }
}
