//! Game time.
//!
//! All durations in the engine are measured in game milliseconds against an
//! injected [`GameClock`], never wall-clock time. Pausing or scaling the clock
//! pauses or scales effect expiry and cooldowns with it.

/// Game time in milliseconds. Used for both timestamps and durations.
pub type Millis = i64;

/// A monotonic game-time source.
pub trait GameClock {
    /// Current game time.
    fn now(&self) -> Millis;

    /// Milliseconds elapsed since `timestamp`.
    fn since(&self, timestamp: Millis) -> Millis {
        self.now() - timestamp
    }
}

/// Convert game milliseconds to seconds.
#[must_use]
pub fn to_seconds(millis: Millis) -> f32 {
    millis as f32 * 0.001
}
