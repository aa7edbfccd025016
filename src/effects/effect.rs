//! The timed effect engine.
//!
//! An [`Effect`] is applied to an impact area, selects its targets through a
//! [`TargetingStrategy`], and records one [`EffectApplication`] per
//! application. While it has appliances it is attached to the tick scheduler;
//! each update ceases the appliances that ran out (or that the behavior reports
//! as ended), applies the follow-up effects to the same area, and detaches once
//! nothing is left.
//!
//! What an effect actually does to an entity is an [`EffectBehavior`]:
//! attribute modifiers, forces, sounds, damage, or anything a game defines.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use im::Vector;

use super::application::EffectApplication;
use super::targeting::TargetingStrategy;
use crate::core::{
    CombatError, EffectId, EngineContext, Listener, ListenerId, Listeners, Millis, Result, Updatable,
};
use crate::entities::EntityRef;
use crate::physics::Shape;

/// Fired when an effect is applied to, or ceased on, one entity.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectEvent {
    /// The effect.
    pub effect: EffectId,
    /// The entity it was applied to or ceased on.
    pub entity: EntityRef,
}

/// What a behavior sees while it runs.
#[derive(Clone, Copy, Debug)]
pub struct EffectContext<'a> {
    /// The running effect.
    pub effect: EffectId,
    /// The entity executing the effect, if any.
    pub executor: Option<&'a EntityRef>,
    /// Engine services.
    pub engine: &'a EngineContext,
    /// The application being applied or ceased.
    pub application: &'a EffectApplication,
}

/// The variant-specific part of an effect.
///
/// Every hook has a no-op default. Entities are not borrowed while a hook runs.
pub trait EffectBehavior {
    /// Apply to one entity.
    fn apply(&self, ctx: &EffectContext<'_>, entity: &EntityRef) -> Result<()> {
        let _ = (ctx, entity);
        Ok(())
    }

    /// Undo the effect on one entity.
    fn cease(&self, ctx: &EffectContext<'_>, entity: &EntityRef) -> Result<()> {
        let _ = (ctx, entity);
        Ok(())
    }

    /// Called once per application, after every entity has been applied to.
    fn on_applied(&self, ctx: &EffectContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Check whether an application ended before its duration ran out.
    fn has_custom_ended(&self, application: &EffectApplication) -> bool {
        let _ = application;
        false
    }
}

/// A behavior that does nothing beyond bookkeeping.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBehavior;

impl EffectBehavior for NoBehavior {}

/// Builds an [`Effect`].
///
/// ```
/// use std::rc::Rc;
/// use glam::Vec2;
/// use rust_combat::core::{EngineContext, GameLoop};
/// use rust_combat::effects::{EffectBuilder, TargetingStrategy};
/// use rust_combat::entities::EntityRegistry;
/// use rust_combat::physics::Shape;
///
/// let game_loop = Rc::new(GameLoop::default());
/// let ctx = EngineContext::with_game_loop(game_loop.clone(), Rc::new(EntityRegistry::new()));
///
/// let effect = EffectBuilder::new(&ctx, TargetingStrategy::everyone())
///     .with_name("aura")
///     .with_duration(500)
///     .build();
///
/// let application = effect.apply(&Shape::circle(Vec2::ZERO, 10.0)).unwrap();
/// assert!(application.is_empty());
/// assert!(effect.has_active_appliances());
/// assert_eq!(game_loop.updatable_count(), 1);
/// ```
pub struct EffectBuilder {
    context: EngineContext,
    targeting: TargetingStrategy,
    name: Option<String>,
    executor: Option<EntityRef>,
    delay: Millis,
    duration: Millis,
    behavior: Box<dyn EffectBehavior>,
    follow_ups: Vec<Rc<Effect>>,
}

impl EffectBuilder {
    /// Start building an effect selecting targets with `targeting`.
    pub fn new(context: &EngineContext, targeting: TargetingStrategy) -> Self {
        Self {
            context: context.clone(),
            targeting,
            name: None,
            executor: None,
            delay: 0,
            duration: 0,
            behavior: Box::new(NoBehavior),
            follow_ups: Vec::new(),
        }
    }

    /// Name used in logs.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Entity executing the effect.
    #[must_use]
    pub fn with_executor(mut self, executor: EntityRef) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Delay after an ability cast before the effect is applied.
    #[must_use]
    pub fn with_delay(mut self, delay: Millis) -> Self {
        self.delay = delay;
        self
    }

    /// How long each application lasts. Zero or less never expires.
    #[must_use]
    pub fn with_duration(mut self, duration: Millis) -> Self {
        self.duration = duration;
        self
    }

    /// What the effect does to entities.
    #[must_use]
    pub fn with_behavior(mut self, behavior: impl EffectBehavior + 'static) -> Self {
        self.behavior = Box::new(behavior);
        self
    }

    /// Apply `effect` to the same area whenever an application ceases.
    #[must_use]
    pub fn with_follow_up(mut self, effect: Rc<Effect>) -> Self {
        self.follow_ups.push(effect);
        self
    }

    /// Build the shared effect.
    pub fn build(self) -> Rc<Effect> {
        let id = self.context.next_effect_id();
        Rc::new_cyclic(|this| Effect {
            id,
            name: self.name.unwrap_or_else(|| id.to_string()),
            context: self.context,
            targeting: self.targeting,
            executor: self.executor,
            delay: Cell::new(self.delay),
            duration: Cell::new(self.duration),
            behavior: self.behavior,
            appliances: RefCell::new(Vector::new()),
            next_sequence: Cell::new(0),
            follow_ups: RefCell::new(self.follow_ups),
            applied_listeners: Listeners::new(),
            ceased_listeners: Listeners::new(),
            this: this.clone(),
        })
    }
}

/// A timed, targetable behavior with follow-up chaining.
pub struct Effect {
    id: EffectId,
    name: String,
    context: EngineContext,
    targeting: TargetingStrategy,
    executor: Option<EntityRef>,
    delay: Cell<Millis>,
    duration: Cell<Millis>,
    behavior: Box<dyn EffectBehavior>,
    appliances: RefCell<Vector<EffectApplication>>,
    next_sequence: Cell<u64>,
    follow_ups: RefCell<Vec<Rc<Effect>>>,
    applied_listeners: Listeners<EffectEvent>,
    ceased_listeners: Listeners<EffectEvent>,
    this: Weak<Effect>,
}

impl Effect {
    /// Start building an effect.
    pub fn builder(context: &EngineContext, targeting: TargetingStrategy) -> EffectBuilder {
        EffectBuilder::new(context, targeting)
    }

    /// Unique id.
    #[must_use]
    pub fn id(&self) -> EffectId {
        self.id
    }

    /// Name used in logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Targeting strategy.
    #[must_use]
    pub fn targeting(&self) -> &TargetingStrategy {
        &self.targeting
    }

    /// Executing entity.
    #[must_use]
    pub fn executor(&self) -> Option<&EntityRef> {
        self.executor.as_ref()
    }

    /// Delay after a cast before the effect is applied.
    #[must_use]
    pub fn delay(&self) -> Millis {
        self.delay.get()
    }

    /// Change the delay.
    pub fn set_delay(&self, delay: Millis) {
        self.delay.set(delay);
    }

    /// Duration of one application.
    #[must_use]
    pub fn duration(&self) -> Millis {
        self.duration.get()
    }

    /// Change the duration. Running applications use the new value.
    pub fn set_duration(&self, duration: Millis) {
        self.duration.set(duration);
    }

    /// Apply the effect to every target inside `area`.
    ///
    /// The application is recorded, and the effect attached to the scheduler,
    /// even when no entity is selected. If the behavior fails on some entities
    /// the others are still applied to; the failed ones are dropped from the
    /// record and the first error is returned.
    pub fn apply(&self, area: &Shape) -> Result<EffectApplication> {
        let (application, failure) = self.apply_recorded(area)?;
        failure.map_or(Ok(application), Err)
    }

    /// Apply like [`apply`](Self::apply), but hand back the recorded
    /// application alongside the first per-entity error.
    ///
    /// Fails without recording anything only if target selection fails.
    pub(crate) fn apply_recorded(
        &self,
        area: &Shape,
    ) -> Result<(EffectApplication, Option<CombatError>)> {
        let targets = self.targeting.find_targets(
            area,
            self.executor.as_ref(),
            self.context.targets().as_ref(),
        )?;

        let sequence = self.next_sequence.get();
        self.next_sequence.set(sequence + 1);
        let mut application = EffectApplication::new(sequence, targets, *area, self.context.now());
        self.appliances.borrow_mut().push_back(application.clone());
        self.attach();

        let mut failure = None;
        let mut failed = Vec::new();
        {
            let ctx = self.effect_context(&application);
            for entity in application.affected() {
                if let Err(err) = self.apply_to(&ctx, entity) {
                    tracing::warn!(effect = %self.id, entity = %entity.id(), %err, "effect not applied");
                    failed.push(entity.clone());
                    failure.get_or_insert(err);
                }
            }
        }

        if !failed.is_empty() {
            application = application.without(&failed);
            let mut appliances = self.appliances.borrow_mut();
            if let Some(record) = appliances.iter_mut().find(|a| a.sequence() == sequence) {
                *record = application.clone();
            }
        }

        if let Err(err) = self.behavior.on_applied(&self.effect_context(&application)) {
            failure.get_or_insert(err);
        }

        tracing::debug!(
            effect = %self.id,
            name = %self.name,
            targets = application.affected().len(),
            "effect applied"
        );
        Ok((application, failure))
    }

    /// Cease one application early, running teardown and follow-ups.
    ///
    /// Returns `false` if the application is not active.
    pub fn cease(&self, application: &EffectApplication) -> Result<bool> {
        let removed = {
            let mut appliances = self.appliances.borrow_mut();
            let index = appliances
                .iter()
                .position(|a| a.sequence() == application.sequence());
            index.map(|index| appliances.remove(index))
        };
        let Some(application) = removed else {
            return Ok(false);
        };

        let mut failure = None;
        let ctx = self.effect_context(&application);
        for entity in application.affected() {
            if let Err(err) = self.cease_on(&ctx, entity) {
                tracing::warn!(effect = %self.id, entity = %entity.id(), %err, "effect teardown failed");
                failure.get_or_insert(err);
            }
        }
        tracing::debug!(
            effect = %self.id,
            name = %self.name,
            sequence = application.sequence(),
            "appliance ceased"
        );

        for follow_up in self.follow_ups() {
            if let Err(err) = follow_up.apply(application.impact_area()) {
                failure.get_or_insert(err);
            }
        }

        if !self.has_active_appliances() {
            self.detach();
        }
        failure.map_or(Ok(true), Err)
    }

    /// Cease every active application and detach.
    ///
    /// Every application is ceased even if some fail; the first error is
    /// returned.
    pub fn cease_all(&self) -> Result<()> {
        let appliances = self.active_appliances();
        let mut failure = None;
        for application in &appliances {
            if let Err(err) = self.cease(application) {
                failure.get_or_insert(err);
            }
        }
        self.detach();
        failure.map_or(Ok(()), Err)
    }

    /// Check whether any active application affects `entity`.
    #[must_use]
    pub fn is_active(&self, entity: &EntityRef) -> bool {
        self.appliances.borrow().iter().any(|a| a.contains(entity))
    }

    /// Check whether any application is active.
    #[must_use]
    pub fn has_active_appliances(&self) -> bool {
        !self.appliances.borrow().is_empty()
    }

    /// Check whether `application` has not ceased yet.
    #[must_use]
    pub fn is_application_active(&self, application: &EffectApplication) -> bool {
        self.appliances
            .borrow()
            .iter()
            .any(|a| a.sequence() == application.sequence())
    }

    /// Snapshot of the active applications, oldest first.
    #[must_use]
    pub fn active_appliances(&self) -> Vector<EffectApplication> {
        self.appliances.borrow().clone()
    }

    /// Add an effect applied whenever an application of this one ceases.
    pub fn add_follow_up(&self, effect: Rc<Effect>) {
        self.follow_ups.borrow_mut().push(effect);
    }

    /// Follow-up effects.
    #[must_use]
    pub fn follow_ups(&self) -> Vec<Rc<Effect>> {
        self.follow_ups.borrow().clone()
    }

    /// Register a callback fired after the effect is applied to an entity.
    pub fn on_applied(&self, listener: impl Fn(&EffectEvent) + 'static) -> ListenerId {
        self.applied_listeners.add(listener)
    }

    /// Register a shared applied callback.
    pub fn on_applied_shared(&self, listener: Listener<EffectEvent>) -> ListenerId {
        self.applied_listeners.add_shared(listener)
    }

    /// Remove an applied callback.
    pub fn remove_applied_listener(&self, id: ListenerId) -> bool {
        self.applied_listeners.remove(id)
    }

    /// Register a callback fired after the effect ceased on an entity.
    pub fn on_ceased(&self, listener: impl Fn(&EffectEvent) + 'static) -> ListenerId {
        self.ceased_listeners.add(listener)
    }

    /// Register a shared ceased callback.
    pub fn on_ceased_shared(&self, listener: Listener<EffectEvent>) -> ListenerId {
        self.ceased_listeners.add_shared(listener)
    }

    /// Remove a ceased callback.
    pub fn remove_ceased_listener(&self, id: ListenerId) -> bool {
        self.ceased_listeners.remove(id)
    }

    fn effect_context<'a>(&'a self, application: &'a EffectApplication) -> EffectContext<'a> {
        EffectContext {
            effect: self.id,
            executor: self.executor.as_ref(),
            engine: &self.context,
            application,
        }
    }

    fn apply_to(&self, ctx: &EffectContext<'_>, entity: &EntityRef) -> Result<()> {
        entity.borrow_mut()?.applied_effects_mut().add(self.id);
        if let Err(err) = self.behavior.apply(ctx, entity) {
            entity.borrow_mut()?.applied_effects_mut().remove(self.id);
            return Err(err);
        }
        self.applied_listeners.notify(&EffectEvent {
            effect: self.id,
            entity: entity.clone(),
        });
        Ok(())
    }

    fn cease_on(&self, ctx: &EffectContext<'_>, entity: &EntityRef) -> Result<()> {
        entity.borrow_mut()?.applied_effects_mut().remove(self.id);
        self.behavior.cease(ctx, entity)?;
        self.ceased_listeners.notify(&EffectEvent {
            effect: self.id,
            entity: entity.clone(),
        });
        Ok(())
    }

    fn has_expired(&self, application: &EffectApplication, now: Millis) -> bool {
        let duration = self.duration.get();
        self.behavior.has_custom_ended(application)
            || (duration > 0 && now - application.applied_at() > duration)
    }

    fn as_updatable(&self) -> Option<Rc<dyn Updatable>> {
        self.this.upgrade().map(|this| this as Rc<dyn Updatable>)
    }

    fn attach(&self) {
        let Some(updatable) = self.as_updatable() else {
            return;
        };
        let scheduler = self.context.scheduler();
        if !scheduler.is_attached(&updatable) {
            scheduler.attach(updatable);
            tracing::debug!(effect = %self.id, name = %self.name, "effect attached");
        }
    }

    fn detach(&self) {
        let Some(updatable) = self.as_updatable() else {
            return;
        };
        let scheduler = self.context.scheduler();
        if scheduler.is_attached(&updatable) {
            scheduler.detach(&updatable);
            tracing::debug!(effect = %self.id, name = %self.name, "effect detached");
        }
    }
}

impl Updatable for Effect {
    fn update(&self) -> Result<()> {
        let now = self.context.now();
        let expired: Vec<EffectApplication> = self
            .appliances
            .borrow()
            .iter()
            .filter(|a| self.has_expired(a, now))
            .cloned()
            .collect();

        let mut failure = None;
        for application in &expired {
            if let Err(err) = self.cease(application) {
                failure.get_or_insert(err);
            }
        }

        if !self.has_active_appliances() {
            self.detach();
        }
        failure.map_or(Ok(()), Err)
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("targeting", &self.targeting)
            .field("executor", &self.executor)
            .field("delay", &self.delay.get())
            .field("duration", &self.duration.get())
            .field("appliances", &self.appliances.borrow().len())
            .field("follow_ups", &self.follow_ups.borrow().len())
            .finish()
    }
}
