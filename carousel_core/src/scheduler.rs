// Frame loop bookkeeping. The host's requestAnimationFrame callback calls in with a
// handle; a cancelled or superseded handle is rejected so stale callbacks do nothing.

use crate::error::CarouselError;
use crate::types::Timestamp;

/// Token for one armed frame loop. Invalid after `cancel` or the next `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u32);

impl FrameHandle {
    pub fn from_raw(raw: u32) -> Self {
        FrameHandle(raw)
    }

    pub fn as_raw(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct FrameScheduler {
    armed: Option<FrameHandle>,
    next_id: u32,
    last_tick: Option<Timestamp>,
    max_dt: f64,
}

impl FrameScheduler {
    pub fn new(max_dt: f64) -> Self {
        FrameScheduler {
            armed: None,
            next_id: 1,
            last_tick: None,
            max_dt,
        }
    }

    /// Arm a new loop, invalidating any previous handle.
    pub fn start(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);
        self.armed = Some(handle);
        self.last_tick = None;
        tracing::debug!(handle = handle.0, "frame loop started");
        handle
    }

    /// Returns false if `handle` was not the armed loop.
    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        if self.armed == Some(handle) {
            self.armed = None;
            self.last_tick = None;
            tracing::debug!(handle = handle.0, "frame loop cancelled");
            true
        } else {
            false
        }
    }

    pub fn is_armed(&self, handle: FrameHandle) -> bool {
        self.armed == Some(handle)
    }

    pub fn is_running(&self) -> bool {
        self.armed.is_some()
    }

    pub fn armed(&self) -> Option<FrameHandle> {
        self.armed
    }

    /// Seconds since the previous tick, clamped to `[0, max_dt]`. The first tick is 0.
    pub fn advance(&mut self, handle: FrameHandle, now: Timestamp) -> Result<f64, CarouselError> {
        if !self.is_armed(handle) {
            return Err(CarouselError::StaleFrame { handle: handle.0 });
        }
        let dt = match self.last_tick {
            Some(last) => (now.millis_since(last) / 1000.0).clamp(0.0, self.max_dt),
            None => 0.0,
        };
        self.last_tick = Some(now);
        Ok(dt)
    }
}
