//! The injected service bundle.
//!
//! Effects and abilities never reach for a global game instance. They are built
//! with an [`EngineContext`] holding the clock, the tick scheduler and the
//! target lookup they need, which keeps the engine testable with a bare
//! [`GameLoop`] and an [`EntityRegistry`](crate::entities::EntityRegistry).

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use super::config::EngineConfig;
use super::entity::EffectId;
use super::rng::GameRng;
use super::scheduler::{GameLoop, TickScheduler};
use super::time::{GameClock, Millis};
use crate::entities::TargetLookup;

/// Shared handles to the engine's external collaborators.
///
/// Cloning is cheap; clones share the effect id counter.
#[derive(Clone)]
pub struct EngineContext {
    clock: Rc<dyn GameClock>,
    scheduler: Rc<dyn TickScheduler>,
    targets: Rc<dyn TargetLookup>,
    config: EngineConfig,
    next_effect_id: Rc<Cell<u32>>,
}

impl EngineContext {
    /// Create a context from independent collaborators.
    pub fn new(
        clock: Rc<dyn GameClock>,
        scheduler: Rc<dyn TickScheduler>,
        targets: Rc<dyn TargetLookup>,
        config: EngineConfig,
    ) -> Self {
        Self {
            clock,
            scheduler,
            targets,
            config,
            next_effect_id: Rc::new(Cell::new(0)),
        }
    }

    /// Create a context where one [`GameLoop`] is both clock and scheduler.
    pub fn with_game_loop(game_loop: Rc<GameLoop>, targets: Rc<dyn TargetLookup>) -> Self {
        let config = game_loop.config().clone();
        Self::new(game_loop.clone(), game_loop, targets, config)
    }

    /// Game clock.
    #[must_use]
    pub fn clock(&self) -> &Rc<dyn GameClock> {
        &self.clock
    }

    /// Current game time.
    #[must_use]
    pub fn now(&self) -> Millis {
        self.clock.now()
    }

    /// Tick scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &Rc<dyn TickScheduler> {
        &self.scheduler
    }

    /// Target lookup service.
    #[must_use]
    pub fn targets(&self) -> &Rc<dyn TargetLookup> {
        &self.targets
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Hand out the next unique effect id.
    pub fn next_effect_id(&self) -> EffectId {
        let id = self.next_effect_id.get();
        self.next_effect_id.set(id.wrapping_add(1));
        EffectId(id)
    }

    /// A deterministic random stream for a named consumer.
    #[must_use]
    pub fn rng_for(&self, context: &str) -> GameRng {
        GameRng::new(self.config.rng_seed).for_context(context)
    }
}

impl fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineContext")
            .field("now", &self.clock.now())
            .field("config", &self.config)
            .field("next_effect_id", &self.next_effect_id.get())
            .finish()
    }
}
