//! Tick scheduling.
//!
//! Effects and ability executions register themselves with a [`TickScheduler`]
//! while they have work to do and detach once they are done. [`GameLoop`] is the
//! engine's scheduler and clock in one: it advances game time and updates every
//! attached [`Updatable`] once per tick.
//!
//! ## Re-entrancy
//!
//! Updatables routinely attach or detach other updatables (an expiring effect
//! applies its follow-ups, an ability execution detaches itself). `tick` works
//! on a snapshot of the attached set and skips anything detached earlier in the
//! same tick; anything attached during a tick is first updated on the next one.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::config::EngineConfig;
use super::error::Result;
use super::time::{GameClock, Millis};

/// Something that is updated once per game tick.
pub trait Updatable {
    /// Advance this updatable by one tick.
    fn update(&self) -> Result<()>;
}

/// Attaches and detaches per-frame updatables.
pub trait TickScheduler {
    /// Attach an updatable. Attaching the same handle twice has no effect.
    fn attach(&self, updatable: Rc<dyn Updatable>);

    /// Detach an updatable. Detaching an unknown handle has no effect.
    fn detach(&self, updatable: &Rc<dyn Updatable>);

    /// Check whether the handle is attached.
    fn is_attached(&self, updatable: &Rc<dyn Updatable>) -> bool;
}

/// Handle identity for updatables (data pointer only).
fn same_updatable(a: &Rc<dyn Updatable>, b: &Rc<dyn Updatable>) -> bool {
    std::ptr::eq(
        Rc::as_ptr(a) as *const (),
        Rc::as_ptr(b) as *const (),
    )
}

/// The game loop: clock plus tick scheduler.
///
/// ```
/// use rust_combat::core::{EngineConfig, GameClock, GameLoop};
///
/// let game_loop = GameLoop::new(EngineConfig::default().with_time_scale(2.0));
/// game_loop.tick(100).unwrap();
/// assert_eq!(game_loop.now(), 200);
///
/// game_loop.set_paused(true);
/// game_loop.tick(100).unwrap();
/// assert_eq!(game_loop.now(), 200);
/// ```
pub struct GameLoop {
    config: EngineConfig,
    time: Cell<Millis>,
    ticks: Cell<u64>,
    time_scale: Cell<f32>,
    paused: Cell<bool>,
    updatables: RefCell<Vec<Rc<dyn Updatable>>>,
}

impl GameLoop {
    /// Create a loop at game time zero.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            time: Cell::new(0),
            ticks: Cell::new(0),
            time_scale: Cell::new(config.time_scale),
            paused: Cell::new(false),
            updatables: RefCell::new(Vec::new()),
            config,
        }
    }

    /// The configuration this loop was built with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Advance game time by `delta` (scaled) and update all attached updatables.
    ///
    /// Does nothing while paused. Returns the first update error once every
    /// attached updatable has run.
    pub fn tick(&self, delta: Millis) -> Result<()> {
        if self.paused.get() {
            return Ok(());
        }

        let scaled = (delta as f64 * f64::from(self.time_scale.get())).round() as Millis;
        self.time.set(self.time.get() + scaled);
        self.ticks.set(self.ticks.get() + 1);
        tracing::trace!(tick = self.ticks.get(), time = self.time.get(), "game loop tick");

        self.update_attached()
    }

    /// Tick by the configured frame interval.
    pub fn step(&self) -> Result<()> {
        self.tick(self.config.tick_interval())
    }

    /// Update all attached updatables without advancing time.
    ///
    /// A failing updatable does not keep the others from being updated; the
    /// first error is returned once every one has run.
    pub fn update_attached(&self) -> Result<()> {
        let snapshot: Vec<Rc<dyn Updatable>> = self.updatables.borrow().clone();
        let mut failure = None;
        for updatable in &snapshot {
            if !self.is_attached(updatable) {
                continue;
            }
            if let Err(err) = updatable.update() {
                tracing::warn!(%err, "updatable failed");
                failure.get_or_insert(err);
            }
        }
        failure.map_or(Ok(()), Err)
    }

    /// Jump to an absolute game time without updating anything.
    pub fn set_time(&self, time: Millis) {
        self.time.set(time);
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }

    /// Current time scale.
    #[must_use]
    pub fn time_scale(&self) -> f32 {
        self.time_scale.get()
    }

    /// Change the time scale (1.0 = real time).
    pub fn set_time_scale(&self, scale: f32) {
        self.time_scale.set(scale.max(0.0));
    }

    /// Check if the loop is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    /// Pause or resume the loop.
    pub fn set_paused(&self, paused: bool) {
        self.paused.set(paused);
    }

    /// Number of attached updatables.
    #[must_use]
    pub fn updatable_count(&self) -> usize {
        self.updatables.borrow().len()
    }
}

impl GameClock for GameLoop {
    fn now(&self) -> Millis {
        self.time.get()
    }
}

impl TickScheduler for GameLoop {
    fn attach(&self, updatable: Rc<dyn Updatable>) {
        let mut updatables = self.updatables.borrow_mut();
        if !updatables.iter().any(|u| same_updatable(u, &updatable)) {
            updatables.push(updatable);
        }
    }

    fn detach(&self, updatable: &Rc<dyn Updatable>) {
        self.updatables
            .borrow_mut()
            .retain(|u| !same_updatable(u, updatable));
    }

    fn is_attached(&self, updatable: &Rc<dyn Updatable>) -> bool {
        self.updatables
            .borrow()
            .iter()
            .any(|u| same_updatable(u, updatable))
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for GameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLoop")
            .field("time", &self.time.get())
            .field("ticks", &self.ticks.get())
            .field("time_scale", &self.time_scale.get())
            .field("paused", &self.paused.get())
            .field("updatables", &self.updatable_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CombatError, EntityId};
    use std::rc::Weak;

    struct Counter {
        calls: Cell<u32>,
    }

    impl Updatable for Counter {
        fn update(&self) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            Ok(())
        }
    }

    struct Failing;

    impl Updatable for Failing {
        fn update(&self) -> Result<()> {
            Err(CombatError::EntityBorrowed(EntityId(9)))
        }
    }

    /// Detaches itself (and optionally another updatable) on first update.
    struct Detacher {
        game_loop: Weak<GameLoop>,
        this: RefCell<Option<Rc<dyn Updatable>>>,
        other: RefCell<Option<Rc<dyn Updatable>>>,
    }

    impl Updatable for Detacher {
        fn update(&self) -> Result<()> {
            if let Some(game_loop) = self.game_loop.upgrade() {
                if let Some(this) = self.this.borrow().as_ref() {
                    game_loop.detach(this);
                }
                if let Some(other) = self.other.borrow().as_ref() {
                    game_loop.detach(other);
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_attach_is_idempotent() {
        let game_loop = GameLoop::default();
        let counter: Rc<dyn Updatable> = Rc::new(Counter { calls: Cell::new(0) });

        game_loop.attach(counter.clone());
        game_loop.attach(counter.clone());
        assert_eq!(game_loop.updatable_count(), 1);
        assert!(game_loop.is_attached(&counter));

        game_loop.detach(&counter);
        game_loop.detach(&counter);
        assert_eq!(game_loop.updatable_count(), 0);
    }

    #[test]
    fn test_tick_updates_and_advances_time() {
        let game_loop = GameLoop::default();
        let counter = Rc::new(Counter { calls: Cell::new(0) });
        game_loop.attach(counter.clone());

        game_loop.tick(16).unwrap();
        game_loop.tick(16).unwrap();

        assert_eq!(counter.calls.get(), 2);
        assert_eq!(game_loop.now(), 32);
        assert_eq!(game_loop.ticks(), 2);
    }

    #[test]
    fn test_pause_and_time_scale() {
        let game_loop = GameLoop::default();
        let counter = Rc::new(Counter { calls: Cell::new(0) });
        game_loop.attach(counter.clone());

        game_loop.set_paused(true);
        game_loop.tick(100).unwrap();
        assert_eq!(game_loop.now(), 0);
        assert_eq!(counter.calls.get(), 0);

        game_loop.set_paused(false);
        game_loop.set_time_scale(0.5);
        game_loop.tick(100).unwrap();
        assert_eq!(game_loop.now(), 50);
        assert_eq!(counter.calls.get(), 1);
    }

    #[test]
    fn test_failing_updatable_does_not_starve_others() {
        let game_loop = GameLoop::default();
        let counter = Rc::new(Counter { calls: Cell::new(0) });
        game_loop.attach(Rc::new(Failing));
        game_loop.attach(counter.clone());

        assert_eq!(
            game_loop.tick(10),
            Err(CombatError::EntityBorrowed(EntityId(9)))
        );
        assert_eq!(counter.calls.get(), 1);
        assert_eq!(game_loop.now(), 10);

        assert!(game_loop.tick(10).is_err());
        assert_eq!(counter.calls.get(), 2);
    }

    #[test]
    fn test_step_uses_configured_interval() {
        let game_loop = GameLoop::new(EngineConfig::default().with_updates_per_second(50));
        game_loop.step().unwrap();
        assert_eq!(game_loop.now(), 20);
    }

    #[test]
    fn test_detached_during_tick_is_skipped() {
        let game_loop = Rc::new(GameLoop::default());
        let counter = Rc::new(Counter { calls: Cell::new(0) });
        let counter_handle: Rc<dyn Updatable> = counter.clone();

        let detacher = Rc::new(Detacher {
            game_loop: Rc::downgrade(&game_loop),
            this: RefCell::new(None),
            other: RefCell::new(Some(counter_handle.clone())),
        });
        let detacher_handle: Rc<dyn Updatable> = detacher.clone();
        *detacher.this.borrow_mut() = Some(detacher_handle.clone());

        game_loop.attach(detacher_handle);
        game_loop.attach(counter_handle);

        game_loop.tick(10).unwrap();

        assert_eq!(counter.calls.get(), 0);
        assert_eq!(game_loop.updatable_count(), 0);

        // break the self-reference cycle
        detacher.this.borrow_mut().take();
    }
}
