//! Audio cues.
//!
//! The engine never mixes audio. Sound effects pick a [`Sound`] and hand it to an
//! [`AudioSink`] together with the entity it should play on.

use serde::{Deserialize, Serialize};

use crate::entities::EntityRef;

/// A named sound resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sound {
    /// Resource name.
    pub name: String,
    /// Playback volume in `[0, 1]`.
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_volume() -> f32 {
    1.0
}

impl Sound {
    /// Create a sound at full volume.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            volume: default_volume(),
        }
    }

    /// Set the volume, clamped into `[0, 1]`.
    #[must_use]
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }
}

/// Plays sounds on entities.
pub trait AudioSink {
    /// Play `sound` at `entity`'s location.
    fn play_sound(&self, sound: &Sound, entity: &EntityRef);
}
