//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use rust_combat::audio::{AudioSink, Sound};
use rust_combat::core::{EngineContext, EntityId, GameLoop};
use rust_combat::entities::{Combatant, EntityRef, EntityRegistry, TeamId};
use rust_combat::physics::{ForceRef, PhysicsSink};

/// A game loop, a registry and the context wiring them together.
pub struct World {
    pub game_loop: Rc<GameLoop>,
    pub registry: Rc<EntityRegistry>,
    pub ctx: EngineContext,
}

impl World {
    pub fn new() -> Self {
        let game_loop = Rc::new(GameLoop::default());
        let registry = Rc::new(EntityRegistry::new());
        let ctx = EngineContext::with_game_loop(game_loop.clone(), registry.clone());
        Self {
            game_loop,
            registry,
            ctx,
        }
    }

    /// Register a default combatant at `(x, y)`.
    pub fn spawn(&self, id: u32, team: u32, x: f32, y: f32) -> EntityRef {
        self.registry
            .add(Combatant::new(EntityId(id), TeamId(team)).with_position(Vec2::new(x, y)))
    }

    /// Register a prepared combatant.
    pub fn spawn_with(&self, combatant: Combatant) -> EntityRef {
        self.registry.add(combatant)
    }
}

/// Physics sink that keeps every applied force.
#[derive(Default)]
pub struct RecordingPhysics {
    pub applied: RefCell<Vec<(EntityId, ForceRef)>>,
}

impl RecordingPhysics {
    pub fn forces(&self) -> Vec<ForceRef> {
        self.applied.borrow().iter().map(|(_, f)| f.clone()).collect()
    }
}

impl PhysicsSink for RecordingPhysics {
    fn apply_force(&self, entity: &EntityRef, force: ForceRef) {
        self.applied.borrow_mut().push((entity.id(), force));
    }
}

/// Audio sink that keeps every played sound.
#[derive(Default)]
pub struct RecordingAudio {
    pub played: RefCell<Vec<(String, EntityId)>>,
}

impl AudioSink for RecordingAudio {
    fn play_sound(&self, sound: &Sound, entity: &EntityRef) {
        self.played
            .borrow_mut()
            .push((sound.name.clone(), entity.id()));
    }
}

/// Install a test subscriber when `RUST_LOG` is set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
