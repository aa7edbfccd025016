//! One in-flight cast of an ability.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use glam::Vec2;

use super::ability::Ability;
use crate::core::{EngineContext, Millis, Result, Updatable};
use crate::effects::{Effect, EffectApplication};
use crate::physics::Shape;

/// Tracks one cast until every effect it applied has ceased.
///
/// The execution attaches itself to the scheduler when created. Each update
/// applies the effects whose delay has elapsed, once each, to the impact area
/// captured at cast time. It detaches when the ability has no effects, when
/// every effect was applied and none of its applications is still active, or
/// when the ability itself is gone.
pub struct AbilityExecution {
    ability: Weak<Ability>,
    context: EngineContext,
    started_at: Millis,
    cast_location: Vec2,
    impact_area: Shape,
    applied_effects: RefCell<Vec<Rc<Effect>>>,
    applications: RefCell<Vec<(Rc<Effect>, EffectApplication)>>,
    this: Weak<AbilityExecution>,
}

impl AbilityExecution {
    /// Start executing `ability` now and attach to the scheduler.
    pub fn new(ability: &Rc<Ability>) -> Result<Rc<Self>> {
        let context = ability.context().clone();
        let cast_location = ability.pivot()?;
        let impact_area = ability.calculate_impact_area()?;
        let started_at = context.now();

        let execution = Rc::new_cyclic(|this| Self {
            ability: Rc::downgrade(ability),
            context,
            started_at,
            cast_location,
            impact_area,
            applied_effects: RefCell::new(Vec::new()),
            applications: RefCell::new(Vec::new()),
            this: this.clone(),
        });

        let updatable: Rc<dyn Updatable> = execution.clone();
        execution.context.scheduler().attach(updatable);
        Ok(execution)
    }

    /// The executed ability, unless it has been dropped.
    #[must_use]
    pub fn ability(&self) -> Option<Rc<Ability>> {
        self.ability.upgrade()
    }

    /// Game time of the cast.
    #[must_use]
    pub fn started_at(&self) -> Millis {
        self.started_at
    }

    /// Pivot position at cast time.
    #[must_use]
    pub fn cast_location(&self) -> Vec2 {
        self.cast_location
    }

    /// Impact area captured at cast time.
    #[must_use]
    pub fn impact_area(&self) -> &Shape {
        &self.impact_area
    }

    /// Effects applied so far, in application order.
    #[must_use]
    pub fn applied_effects(&self) -> Vec<Rc<Effect>> {
        self.applied_effects.borrow().clone()
    }

    /// Check whether `effect` has been applied by this execution.
    #[must_use]
    pub fn has_applied(&self, effect: &Rc<Effect>) -> bool {
        self.applied_effects
            .borrow()
            .iter()
            .any(|applied| Rc::ptr_eq(applied, effect))
    }

    /// Applications made by this execution.
    #[must_use]
    pub fn applications(&self) -> Vec<EffectApplication> {
        self.applications
            .borrow()
            .iter()
            .map(|(_, application)| application.clone())
            .collect()
    }

    /// Check whether any application made by this execution is still active.
    #[must_use]
    pub fn has_active_effects(&self) -> bool {
        self.applications
            .borrow()
            .iter()
            .any(|(effect, application)| effect.is_application_active(application))
    }

    /// Stop the execution: detach and cease every application it made.
    ///
    /// Ceasing runs the usual teardown and follow-ups.
    pub fn cancel(&self) -> Result<()> {
        self.detach();
        let applications = self.applications.borrow().clone();
        let mut failure = None;
        for (effect, application) in &applications {
            if let Err(err) = effect.cease(application) {
                failure.get_or_insert(err);
            }
        }
        failure.map_or(Ok(()), Err)
    }

    fn detach(&self) {
        let Some(this) = self.this.upgrade() else {
            return;
        };
        let updatable: Rc<dyn Updatable> = this;
        let scheduler = self.context.scheduler();
        if scheduler.is_attached(&updatable) {
            scheduler.detach(&updatable);
            tracing::debug!(started_at = self.started_at, "ability execution detached");
        }
    }
}

impl Updatable for AbilityExecution {
    fn update(&self) -> Result<()> {
        let Some(ability) = self.ability.upgrade() else {
            self.detach();
            return Ok(());
        };

        let elapsed = self.context.clock().since(self.started_at);
        let effects = ability.effects();
        let mut failure = None;
        for effect in &effects {
            if self.has_applied(effect) || elapsed < effect.delay() {
                continue;
            }
            // Nothing is recorded when target selection fails; retry next tick.
            let (application, error) = match effect.apply_recorded(&self.impact_area) {
                Ok(applied) => applied,
                Err(err) => {
                    failure.get_or_insert(err);
                    continue;
                }
            };
            self.applied_effects.borrow_mut().push(Rc::clone(effect));
            self.applications
                .borrow_mut()
                .push((Rc::clone(effect), application));
            if let Some(err) = error {
                failure.get_or_insert(err);
            }
        }

        let all_applied = effects.iter().all(|effect| self.has_applied(effect));
        if effects.is_empty() || (all_applied && !self.has_active_effects()) {
            self.detach();
        }
        failure.map_or(Ok(()), Err)
    }
}

impl fmt::Debug for AbilityExecution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbilityExecution")
            .field("started_at", &self.started_at)
            .field("cast_location", &self.cast_location)
            .field("impact_area", &self.impact_area)
            .field("applied_effects", &self.applied_effects.borrow().len())
            .finish()
    }
}
