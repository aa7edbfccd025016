//! Abilities: castable bundles of effects with a cooldown.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use glam::Vec2;

use super::attributes::{AbilityAttributes, AbilityInfo, CastType};
use super::execution::AbilityExecution;
use crate::core::{to_seconds, EngineContext, Listener, ListenerId, Listeners, Millis, Result};
use crate::effects::{Effect, EffectBuilder, EffectEvent, TargetRelation, TargetingStrategy};
use crate::entities::EntityRef;
use crate::physics::{project, Shape};

/// A skill an entity can cast.
///
/// The ability owns its effects and reuses them for every cast. Each cast
/// starts an [`AbilityExecution`] that applies the effects to the impact area
/// as their delays elapse.
///
/// ```
/// use std::rc::Rc;
/// use rust_combat::abilities::{Ability, AbilityInfo};
/// use rust_combat::core::{EngineContext, EntityId, GameLoop};
/// use rust_combat::entities::{Combatant, EntityRegistry, TeamId};
///
/// let game_loop = Rc::new(GameLoop::default());
/// let registry = Rc::new(EntityRegistry::new());
/// let ctx = EngineContext::with_game_loop(game_loop.clone(), registry.clone());
/// let hero = registry.add(Combatant::new(EntityId(1), TeamId(0)));
///
/// let dash = Ability::new(&ctx, AbilityInfo::new("Dash").with_cooldown(500), hero);
/// game_loop.set_time(100);
/// assert!(dash.cast().unwrap().is_some());
/// assert!(dash.cast().unwrap().is_none());
///
/// game_loop.set_time(350);
/// assert_eq!(dash.remaining_cooldown().unwrap(), 250);
/// ```
pub struct Ability {
    context: EngineContext,
    info: RefCell<AbilityInfo>,
    attributes: RefCell<AbilityAttributes>,
    executor: EntityRef,
    effects: RefCell<Vec<Rc<Effect>>>,
    cast_listeners: Listeners<Rc<AbilityExecution>>,
    current: RefCell<Option<Rc<AbilityExecution>>>,
    this: Weak<Ability>,
}

impl Ability {
    /// Create an ability cast by `executor`.
    pub fn new(context: &EngineContext, info: AbilityInfo, executor: EntityRef) -> Rc<Self> {
        let attributes = AbilityAttributes::new(&info);
        Rc::new_cyclic(|this| Self {
            context: context.clone(),
            info: RefCell::new(info),
            attributes: RefCell::new(attributes),
            executor,
            effects: RefCell::new(Vec::new()),
            cast_listeners: Listeners::new(),
            current: RefCell::new(None),
            this: this.clone(),
        })
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> String {
        self.info.borrow().name.clone()
    }

    /// Rename the ability.
    pub fn set_name(&self, name: impl Into<String>) {
        self.info.borrow_mut().name = name.into();
    }

    /// Display description.
    #[must_use]
    pub fn description(&self) -> String {
        self.info.borrow().description.clone()
    }

    /// Change the description.
    pub fn set_description(&self, description: impl Into<String>) {
        self.info.borrow_mut().description = description.into();
    }

    /// How the ability is triggered.
    #[must_use]
    pub fn cast_type(&self) -> CastType {
        self.info.borrow().cast_type
    }

    /// Change how the ability is triggered.
    pub fn set_cast_type(&self, cast_type: CastType) {
        self.info.borrow_mut().cast_type = cast_type;
    }

    /// Check whether effects hit every candidate.
    #[must_use]
    pub fn is_multi_target(&self) -> bool {
        self.info.borrow().multi_target
    }

    /// Change whether effects created from now on hit every candidate.
    pub fn set_multi_target(&self, multi_target: bool) {
        self.info.borrow_mut().multi_target = multi_target;
    }

    /// The description the ability was created from, with later renames applied.
    #[must_use]
    pub fn info(&self) -> AbilityInfo {
        self.info.borrow().clone()
    }

    /// Modifiable numbers.
    #[must_use]
    pub fn attributes(&self) -> Ref<'_, AbilityAttributes> {
        self.attributes.borrow()
    }

    /// Modifiable numbers, mutably.
    pub fn attributes_mut(&self) -> RefMut<'_, AbilityAttributes> {
        self.attributes.borrow_mut()
    }

    /// Casting entity.
    #[must_use]
    pub fn executor(&self) -> &EntityRef {
        &self.executor
    }

    /// Engine services.
    #[must_use]
    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    /// Add an effect applied by every cast.
    pub fn add_effect(&self, effect: Rc<Effect>) {
        self.effects.borrow_mut().push(effect);
    }

    /// Effects applied by every cast, in the order they were added.
    #[must_use]
    pub fn effects(&self) -> Vec<Rc<Effect>> {
        self.effects.borrow().clone()
    }

    /// A targeting strategy honouring the multi-target flag.
    #[must_use]
    pub fn targeting(&self, relation: TargetRelation) -> TargetingStrategy {
        TargetingStrategy::new(relation).with_multi_target(self.is_multi_target())
    }

    /// Start an effect for this ability: executed by the ability's executor,
    /// targeting `relation`, lasting the ability's duration.
    pub fn effect_builder(&self, relation: TargetRelation) -> Result<EffectBuilder> {
        let duration = self.attributes.borrow().duration_millis()?;
        Ok(EffectBuilder::new(&self.context, self.targeting(relation))
            .with_executor(self.executor.clone())
            .with_duration(duration))
    }

    /// Cast the ability.
    ///
    /// Returns `None` if the executor is dead or the ability is on cooldown.
    pub fn cast(&self) -> Result<Option<Rc<AbilityExecution>>> {
        if !self.can_cast()? {
            tracing::debug!(ability = %self.name(), executor = %self.executor.id(), "cast denied");
            return Ok(None);
        }
        let Some(this) = self.this.upgrade() else {
            return Ok(None);
        };

        let execution = AbilityExecution::new(&this)?;
        *self.current.borrow_mut() = Some(Rc::clone(&execution));
        tracing::debug!(
            ability = %self.name(),
            executor = %self.executor.id(),
            effects = self.effects.borrow().len(),
            "ability cast"
        );
        self.cast_listeners.notify(&execution);
        Ok(Some(execution))
    }

    /// Check whether the executor is alive and the ability is off cooldown.
    pub fn can_cast(&self) -> Result<bool> {
        let dead = self.executor.borrow()?.is_dead();
        Ok(!dead && !self.is_on_cooldown()?)
    }

    /// Check whether the last cast is within the cooldown.
    pub fn is_on_cooldown(&self) -> Result<bool> {
        let Some(since) = self.since_last_cast() else {
            return Ok(false);
        };
        Ok(since < self.attributes.borrow().cooldown_millis()?)
    }

    /// Milliseconds until the ability can be cast again.
    ///
    /// Zero if the ability was never cast or the executor is dead.
    pub fn remaining_cooldown(&self) -> Result<Millis> {
        let Some(since) = self.since_last_cast() else {
            return Ok(0);
        };
        if self.executor.borrow()?.is_dead() {
            return Ok(0);
        }
        let cooldown = self.attributes.borrow().cooldown_millis()?;
        Ok((cooldown - since).max(0))
    }

    /// [`remaining_cooldown`](Self::remaining_cooldown) in seconds.
    pub fn remaining_cooldown_secs(&self) -> Result<f32> {
        self.remaining_cooldown().map(to_seconds)
    }

    /// Modified cooldown in seconds.
    pub fn cooldown_secs(&self) -> Result<f32> {
        self.attributes.borrow().cooldown_millis().map(to_seconds)
    }

    /// Check whether the last cast is within the ability duration.
    pub fn is_active(&self) -> Result<bool> {
        let Some(since) = self.since_last_cast() else {
            return Ok(false);
        };
        Ok(since < self.attributes.borrow().duration_millis()?)
    }

    /// The latest execution.
    #[must_use]
    pub fn current_execution(&self) -> Option<Rc<AbilityExecution>> {
        self.current.borrow().clone()
    }

    /// Point the impact area is measured from.
    pub fn pivot(&self) -> Result<Vec2> {
        let offset = self.info.borrow().origin_offset;
        Ok(self.executor.borrow()?.position() + offset)
    }

    /// Impact area in the executor's facing direction.
    pub fn calculate_impact_area(&self) -> Result<Shape> {
        let angle = self.executor.borrow()?.angle();
        self.calculate_impact_area_at(angle)
    }

    /// Impact area facing `angle` degrees.
    ///
    /// A circle of radius `impact` when `impact_angle` is a multiple of 360,
    /// otherwise a sector of that spread; centred `range / 2` in front of the
    /// pivot.
    pub fn calculate_impact_area_at(&self, angle: f32) -> Result<Shape> {
        let pivot = self.pivot()?;
        let attributes = self.attributes.borrow();
        let impact = attributes.impact.get()? as f32;
        let impact_angle = attributes.impact_angle.get()?;
        let range = attributes.range.get()? as f32;

        let center = project(pivot, angle, range * 0.5);
        if impact_angle % 360 == 0 {
            Ok(Shape::circle(center, impact))
        } else {
            Ok(Shape::sector(center, impact, angle, impact_angle as f32))
        }
    }

    /// Everything the ability could reach: a circle of radius `impact / 2`
    /// around the pivot.
    pub fn calculate_potential_impact_area(&self) -> Result<Shape> {
        let pivot = self.pivot()?;
        let impact = self.attributes.borrow().impact.get()? as f32;
        Ok(Shape::circle(pivot, impact * 0.5))
    }

    /// Register a callback fired after every successful cast.
    pub fn on_cast(&self, listener: impl Fn(&Rc<AbilityExecution>) + 'static) -> ListenerId {
        self.cast_listeners.add(listener)
    }

    /// Remove a cast callback.
    pub fn remove_cast_listener(&self, id: ListenerId) -> bool {
        self.cast_listeners.remove(id)
    }

    /// Register one callback on every effect and, recursively, their follow-ups.
    pub fn on_effect_applied(&self, listener: impl Fn(&EffectEvent) + 'static) {
        let listener: Listener<EffectEvent> = Rc::new(listener);
        for effect in self.effects() {
            visit_chain(&effect, &mut |e: &Effect| {
                e.on_applied_shared(Rc::clone(&listener));
            });
        }
    }

    /// Register one callback on every effect and, recursively, their follow-ups.
    pub fn on_effect_ceased(&self, listener: impl Fn(&EffectEvent) + 'static) {
        let listener: Listener<EffectEvent> = Rc::new(listener);
        for effect in self.effects() {
            visit_chain(&effect, &mut |e: &Effect| {
                e.on_ceased_shared(Rc::clone(&listener));
            });
        }
    }

    fn since_last_cast(&self) -> Option<Millis> {
        let started = self.current.borrow().as_ref()?.started_at();
        Some(self.context.clock().since(started))
    }
}

/// Visit `effect` and its follow-ups depth first.
fn visit_chain(effect: &Rc<Effect>, visit: &mut dyn FnMut(&Effect)) {
    visit(effect);
    for follow_up in effect.follow_ups() {
        visit_chain(&follow_up, visit);
    }
}

impl fmt::Debug for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ability")
            .field("info", &self.info.borrow())
            .field("executor", &self.executor)
            .field("effects", &self.effects.borrow().len())
            .field("casting", &self.current.borrow().is_some())
            .finish()
    }
}
