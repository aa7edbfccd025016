//! Core engine types: identifiers, errors, listeners, game time, scheduling,
//! RNG, configuration and the injected service context.
//!
//! Everything here is independent of attributes and effects. The rest of the
//! crate builds on these pieces and receives its collaborators through
//! [`EngineContext`] instead of a global game instance.

pub mod entity;
pub mod error;
pub mod listeners;
pub mod time;
pub mod scheduler;
pub mod rng;
pub mod config;
pub mod context;

pub use entity::{EffectId, EntityId};
pub use error::{CombatError, Result};
pub use listeners::{Listener, ListenerId, Listeners};
pub use time::{to_seconds, GameClock, Millis};
pub use scheduler::{GameLoop, TickScheduler, Updatable};
pub use rng::{GameRng, GameRngState};
pub use config::EngineConfig;
pub use context::EngineContext;
