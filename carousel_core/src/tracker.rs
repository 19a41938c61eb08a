// Active-item tracking and background video crossfade.
// State is Active(i) only; a change of closest card plays the new video and
// schedules the old one's pause after a grace delay.

use crate::types::{Timestamp, VideoDirective, VideoSettings};

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingPause {
    index: usize,
    due: Timestamp,
}

/// Tracks the centered card and the videos waiting to be paused.
#[derive(Debug, Clone)]
pub struct ActiveTracker {
    settings: VideoSettings,
    active: Option<usize>,
    pending: Vec<PendingPause>,
}

impl ActiveTracker {
    pub fn new(settings: VideoSettings) -> Self {
        ActiveTracker {
            settings,
            active: None,
            pending: Vec::new(),
        }
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Forget everything (new catalog).
    pub fn reset(&mut self) {
        self.active = None;
        self.pending.clear();
    }

    /// Feed this frame's closest index. Returns the directives for a transition,
    /// or nothing when the active card did not change.
    pub fn update(&mut self, closest: Option<usize>, now: Timestamp) -> Vec<VideoDirective> {
        let Some(next) = closest else {
            return Vec::new();
        };
        if self.active == Some(next) {
            return Vec::new();
        }

        let previous = self.active.replace(next);
        tracing::debug!(?previous, active = next, "active card changed");

        // A pause queued for the card that just came back is void.
        self.pending.retain(|p| p.index != next);
        if let Some(prev) = previous {
            self.pending.push(PendingPause {
                index: prev,
                due: now.offset_millis(self.settings.pause_grace_ms),
            });
        }

        vec![VideoDirective::Play {
            index: next,
            start_at: self.settings.start_offset,
        }]
    }

    /// Pauses whose grace period has run out. Cards that became active again are skipped.
    pub fn drain_due_pauses(&mut self, now: Timestamp) -> Vec<VideoDirective> {
        let active = self.active;
        let mut due = Vec::new();
        self.pending.retain(|p| {
            if p.due > now {
                return true;
            }
            if Some(p.index) != active {
                due.push(VideoDirective::Pause { index: p.index });
            }
            false
        });
        due
    }
}

impl VideoSettings {
    /// Where to seek a video that is about to play, if it has not reached the start offset.
    pub fn seek_on_play(&self, current_time: f64) -> Option<f64> {
        if current_time < self.start_offset {
            Some(self.start_offset)
        } else {
            None
        }
    }

    /// Jump back to the start offset once playback reaches the loop end.
    pub fn loop_seek(&self, current_time: f64) -> Option<f64> {
        if current_time >= self.loop_end {
            Some(self.start_offset)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(t: f64) -> Timestamp {
        Timestamp::from_millis(t)
    }

    #[test]
    fn initial_activation_plays_without_pause() {
        let mut tracker = ActiveTracker::new(VideoSettings::default());
        let directives = tracker.update(Some(0), ms(0.0));
        assert_eq!(
            directives,
            vec![VideoDirective::Play {
                index: 0,
                start_at: 10.0
            }]
        );
        assert_eq!(tracker.active(), Some(0));
        assert!(tracker.drain_due_pauses(ms(60_000.0)).is_empty());
    }

    #[test]
    fn unchanged_index_is_silent() {
        let mut tracker = ActiveTracker::new(VideoSettings::default());
        tracker.update(Some(1), ms(0.0));
        assert!(tracker.update(Some(1), ms(16.0)).is_empty());
        assert!(tracker.update(None, ms(32.0)).is_empty());
        assert_eq!(tracker.active(), Some(1));
    }

    #[test]
    fn previous_video_pauses_after_grace() {
        let mut tracker = ActiveTracker::new(VideoSettings::default());
        tracker.update(Some(0), ms(0.0));
        tracker.update(Some(1), ms(100.0));

        assert!(tracker.drain_due_pauses(ms(1099.0)).is_empty());
        assert_eq!(
            tracker.drain_due_pauses(ms(1100.0)),
            vec![VideoDirective::Pause { index: 0 }]
        );
        assert!(tracker.drain_due_pauses(ms(60_000.0)).is_empty());
    }

    #[test]
    fn returning_card_is_not_paused() {
        let mut tracker = ActiveTracker::new(VideoSettings::default());
        tracker.update(Some(0), ms(0.0));
        tracker.update(Some(1), ms(100.0));
        tracker.update(Some(0), ms(200.0));

        // Only card 1 is paused; card 0's pending pause was voided.
        assert_eq!(
            tracker.drain_due_pauses(ms(5000.0)),
            vec![VideoDirective::Pause { index: 1 }]
        );
    }

    #[test]
    fn video_window() {
        let video = VideoSettings::default();
        assert_eq!(video.seek_on_play(0.0), Some(10.0));
        assert_eq!(video.seek_on_play(12.5), None);
        assert_eq!(video.loop_seek(19.9), None);
        assert_eq!(video.loop_seek(20.0), Some(10.0));
    }
}
