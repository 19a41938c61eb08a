// Wheel and pointer input. Turns raw events into velocity impulses, direct drags, or clicks.
// Click vs drag is decided only by displacement since pointer-down, never by elapsed time.

use crate::types::{CardTransform, InputSettings, Timestamp};

/// Pointer state between down and up.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PointerTrack {
    start_x: f64,
    last_x: f64,
    last_time: Timestamp,
    /// Last instantaneous velocity estimate, px/s.
    velocity: f64,
    /// Card reported under the pointer at pointer-down.
    target: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GesturePhase {
    Idle,
    /// Down, but not moved past the threshold yet. Still a click candidate.
    Pressed(PointerTrack),
    /// Past the threshold. The pointer owns scroll_x until release.
    Dragging(PointerTrack),
}

/// How a pointer gesture ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// Nothing to do (no gesture, or cancelled).
    None,
    /// Never crossed the threshold. `target` is the card the host saw under the pointer.
    Click { target: Option<usize>, x: f64 },
    /// Drag ended; hand this velocity to the integrator.
    Release { velocity: f64 },
}

/// Pointer gesture state machine: `Idle → Pressed → Dragging → Idle`.
#[derive(Debug, Clone)]
pub struct GestureController {
    settings: InputSettings,
    phase: GesturePhase,
}

impl GestureController {
    pub fn new(settings: InputSettings) -> Self {
        GestureController {
            settings,
            phase: GesturePhase::Idle,
        }
    }

    /// Velocity impulse for one wheel event. The dominant axis wins.
    pub fn wheel_impulse(&self, delta_x: f64, delta_y: f64) -> f64 {
        let delta = if delta_x.abs() > delta_y.abs() {
            delta_x
        } else {
            delta_y
        };
        delta * self.settings.wheel_sensitivity * self.settings.wheel_scale
    }

    pub fn pointer_down(&mut self, x: f64, now: Timestamp, target: Option<usize>) {
        self.phase = GesturePhase::Pressed(PointerTrack {
            start_x: x,
            last_x: x,
            last_time: now,
            velocity: 0.0,
            target,
        });
    }

    /// Feed a pointer move. Returns the scroll delta to apply when dragging.
    pub fn pointer_move(&mut self, x: f64, now: Timestamp) -> Option<f64> {
        let mut track = match self.phase {
            GesturePhase::Idle => return None,
            GesturePhase::Pressed(track) => {
                if (x - track.start_x).abs() <= self.settings.drag_threshold {
                    return None;
                }
                tracing::trace!(start_x = track.start_x, x, "press became a drag");
                track
            }
            GesturePhase::Dragging(track) => track,
        };

        let dx = x - track.last_x;
        let dt = now
            .millis_since(track.last_time)
            .max(self.settings.min_move_interval_ms)
            / 1000.0;
        let velocity = dx / dt;
        track.velocity = if velocity.is_finite() { velocity } else { 0.0 };
        track.last_x = x;
        track.last_time = now;
        self.phase = GesturePhase::Dragging(track);

        Some(-dx * self.settings.drag_sensitivity)
    }

    pub fn pointer_up(&mut self) -> GestureOutcome {
        let outcome = match self.phase {
            GesturePhase::Idle => GestureOutcome::None,
            GesturePhase::Pressed(track) => GestureOutcome::Click {
                target: track.target,
                x: track.last_x,
            },
            GesturePhase::Dragging(track) => GestureOutcome::Release {
                velocity: -track.velocity * self.settings.drag_sensitivity,
            },
        };
        self.phase = GesturePhase::Idle;
        outcome
    }

    /// Pointer capture lost. No click, no momentum.
    pub fn pointer_cancel(&mut self) {
        self.phase = GesturePhase::Idle;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, GesturePhase::Dragging(_))
    }
}

/// Card under `x` (px from viewport center) in a rendered frame.
/// Overlaps resolve to the nearest card (highest z-index).
pub fn hit_test(cards: &[CardTransform], x: f64, card_width: f64) -> Option<usize> {
    cards
        .iter()
        .filter(|card| (x - card.position).abs() <= card_width * card.scale / 2.0)
        .max_by_key(|card| card.z_index)
        .map(|card| card.index)
}
