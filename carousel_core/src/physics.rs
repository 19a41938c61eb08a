// Velocity integration for the track. Frame-rate independent decay.

use crate::layout::wrap;
use crate::types::PhysicsSettings;

/// Scroll offset and velocity of the track.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    /// Always in `[0, track)`.
    pub scroll_x: f64,
    /// Logical px per second. Positive moves cards left.
    pub velocity: f64,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one frame of `dt` seconds.
    pub fn integrate(&mut self, dt: f64, track: f64, settings: &PhysicsSettings) {
        let dt = dt.max(0.0);
        self.scroll_x = wrap(self.scroll_x + self.velocity * dt, track);
        self.velocity *= decay_factor(dt, settings);
        if self.velocity.abs() < settings.velocity_epsilon {
            self.velocity = 0.0;
        }
    }

    /// Move the track directly, bypassing velocity (drag).
    pub fn shift(&mut self, delta: f64, track: f64) {
        self.scroll_x = wrap(self.scroll_x + delta, track);
    }

    pub fn add_impulse(&mut self, impulse: f64) {
        if impulse.is_finite() {
            self.velocity += impulse;
        }
    }

    /// Replace the velocity, e.g. on drag release. Non-finite values are ignored.
    pub fn set_velocity(&mut self, velocity: f64) {
        if velocity.is_finite() {
            self.velocity = velocity;
        }
    }
}

/// `friction^(dt * baseline_fps)`: one friction step per baseline frame.
pub fn decay_factor(dt: f64, settings: &PhysicsSettings) -> f64 {
    settings.friction.powf(dt.max(0.0) * settings.baseline_fps)
}
