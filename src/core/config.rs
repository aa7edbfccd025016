//! Engine configuration.
//!
//! Games configure the engine at startup with an [`EngineConfig`]. Loading it
//! from disk is the caller's business; the struct is plain serde data.

use serde::{Deserialize, Serialize};

use super::time::Millis;

/// Runtime configuration shared by the game loop and the engine context.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Nominal number of game ticks per second.
    pub updates_per_second: u32,

    /// Game time multiplier applied to every tick (1.0 = real time).
    pub time_scale: f32,

    /// Seed for every random stream the engine hands out.
    pub rng_seed: u64,
}

impl EngineConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tick rate. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_updates_per_second(mut self, updates_per_second: u32) -> Self {
        self.updates_per_second = updates_per_second.max(1);
        self
    }

    /// Set the time scale. Negative values are treated as 0.
    #[must_use]
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale.max(0.0);
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Nominal length of one tick in game milliseconds.
    #[must_use]
    pub fn tick_interval(&self) -> Millis {
        1000 / Millis::from(self.updates_per_second.max(1))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            updates_per_second: 60,
            time_scale: 1.0,
            rng_seed: 42,
        }
    }
}
