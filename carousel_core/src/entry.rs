// Startup sequence: compositing warm-up over one full track cycle, then staggered
// entry tweens for the cards in view. The frame loop starts only after both.

use serde::{Deserialize, Serialize};

use crate::layout::{wrap, TrackLayout};
use crate::transform::{css_transform, RenderedFrame};
use crate::types::{EntrySettings, Timestamp};

/// Scroll offsets for the warm-up passes: `step * fraction` apart, covering
/// the whole track starting from `scroll_x`. Empty for an empty track.
pub fn warmup_offsets(layout: &TrackLayout, scroll_x: f64, step_fraction: f64) -> Vec<f64> {
    if layout.is_empty() || step_fraction <= 0.0 {
        return Vec::new();
    }
    let stride = layout.step() * step_fraction;
    if stride <= 0.0 {
        return Vec::new();
    }
    let passes = (layout.track() / stride).ceil() as usize;
    (0..passes)
        .map(|i| wrap(scroll_x + i as f64 * stride, layout.track()))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
struct EntryCard {
    index: usize,
    position: f64,
    rotation_deg: f64,
    depth: f64,
    scale: f64,
    steady_css: String,
    /// Seconds after the sequence starts.
    delay: f64,
}

/// One card's state during the entry sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryCardFrame {
    pub index: usize,
    pub opacity: f64,
    pub css: String,
}

/// Entry state for one animation frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryFrame {
    pub cards: Vec<EntryCardFrame>,
    pub complete: bool,
}

/// Staggered fade/rise of the cards in view, from collapsed to steady state.
#[derive(Debug, Clone)]
pub struct EntryAnimation {
    settings: EntrySettings,
    cards: Vec<EntryCard>,
    started: Timestamp,
}

impl EntryAnimation {
    /// Pick the cards within `visible_fraction * viewport_width` of center from a
    /// steady-state frame, ordered left to right.
    pub fn plan(
        frame: &RenderedFrame,
        viewport_width: f64,
        settings: EntrySettings,
        started: Timestamp,
    ) -> Self {
        let reach = viewport_width * settings.visible_fraction;
        let mut visible: Vec<_> = frame
            .cards
            .iter()
            .filter(|card| card.position.abs() < reach)
            .collect();
        visible.sort_by(|a, b| a.position.total_cmp(&b.position));

        let cards = visible
            .into_iter()
            .enumerate()
            .map(|(order, card)| EntryCard {
                index: card.index,
                position: card.position,
                rotation_deg: card.rotation_deg,
                depth: card.depth,
                scale: card.scale,
                steady_css: card.css.clone(),
                delay: order as f64 * settings.stagger,
            })
            .collect();

        tracing::debug!(started = started.as_millis(), "entry animation planned");

        EntryAnimation {
            settings,
            cards,
            started,
        }
    }

    /// Seconds from start until the last tween ends.
    pub fn total_duration(&self) -> f64 {
        match self.cards.last() {
            Some(last) => last.delay + self.settings.duration,
            None => 0.0,
        }
    }

    pub fn is_complete(&self, now: Timestamp) -> bool {
        now.millis_since(self.started) / 1000.0 >= self.total_duration()
    }

    pub fn sample(&self, now: Timestamp) -> EntryFrame {
        let elapsed = now.millis_since(self.started).max(0.0) / 1000.0;
        let s = &self.settings;

        let cards = self
            .cards
            .iter()
            .map(|card| {
                let linear = ((elapsed - card.delay) / s.duration).clamp(0.0, 1.0);
                let p = s.easing.apply(linear);
                let css = if p >= 0.999 {
                    card.steady_css.clone()
                } else {
                    let scale = s.start_scale + (card.scale - s.start_scale) * p;
                    css_transform(
                        card.position,
                        card.depth,
                        card.rotation_deg,
                        scale,
                        Some(s.start_offset_y * (1.0 - p)),
                    )
                };
                EntryCardFrame {
                    index: card.index,
                    opacity: p,
                    css,
                }
            })
            .collect();

        EntryFrame {
            cards,
            complete: self.is_complete(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::render;
    use crate::types::VisualSettings;

    fn frame_for(count: usize) -> RenderedFrame {
        let layout = TrackLayout::new(count, 300.0, 400.0, 28.0);
        render(&layout, 0.0, 640.0, &VisualSettings::default())
    }

    #[test]
    fn warmup_covers_full_cycle() {
        let layout = TrackLayout::new(3, 300.0, 400.0, 28.0);
        let offsets = warmup_offsets(&layout, 100.0, 0.5);
        // 984 / 164 = 6 passes.
        assert_eq!(offsets.len(), 6);
        assert_eq!(offsets[0], 100.0);
        assert!(offsets.iter().all(|&o| (0.0..984.0).contains(&o)));
        assert!((offsets[5] - wrap(100.0 + 5.0 * 164.0, 984.0)).abs() < 1e-9);
    }

    #[test]
    fn warmup_on_empty_track_is_empty() {
        let layout = TrackLayout::new(0, 300.0, 400.0, 28.0);
        assert!(warmup_offsets(&layout, 0.0, 0.5).is_empty());
    }

    #[test]
    fn plans_only_visible_cards_left_to_right() {
        // Viewport 1280: reach 768. Positions 0, ±328, ±656 qualify; ±984 do not.
        let frame = frame_for(9);
        let anim = EntryAnimation::plan(
            &frame,
            1280.0,
            EntrySettings::default(),
            Timestamp::from_millis(0.0),
        );
        let order: Vec<usize> = anim
            .sample(Timestamp::from_millis(0.0))
            .cards
            .iter()
            .map(|c| c.index)
            .collect();
        assert_eq!(order, vec![7, 8, 0, 1, 2]);
        assert!((anim.total_duration() - (4.0 * 0.05 + 0.6)).abs() < 1e-9);
    }

    #[test]
    fn starts_collapsed_and_ends_steady() {
        let frame = frame_for(3);
        let anim = EntryAnimation::plan(
            &frame,
            1280.0,
            EntrySettings::default(),
            Timestamp::from_millis(1000.0),
        );

        let first = anim.sample(Timestamp::from_millis(1000.0));
        assert!(!first.complete);
        assert!(first.cards.iter().all(|c| c.opacity == 0.0));
        assert!(first.cards[0].css.contains("scale(0.92) translateY(40px)"));

        let end = 1000.0 + anim.total_duration() * 1000.0 + 1.0;
        let done = anim.sample(Timestamp::from_millis(end));
        assert!(done.complete);
        for card in &done.cards {
            assert_eq!(card.opacity, 1.0);
            assert_eq!(card.css, frame.cards[card.index].css);
        }
    }

    #[test]
    fn later_cards_lag_behind() {
        let frame = frame_for(3);
        let anim = EntryAnimation::plan(
            &frame,
            1280.0,
            EntrySettings::default(),
            Timestamp::from_millis(0.0),
        );
        let mid = anim.sample(Timestamp::from_millis(200.0));
        assert!(mid.cards[0].opacity > mid.cards[1].opacity);
        assert!(mid.cards[1].opacity > mid.cards[2].opacity);
    }

    #[test]
    fn nothing_visible_completes_immediately() {
        let anim = EntryAnimation::plan(
            &RenderedFrame::default(),
            1280.0,
            EntrySettings::default(),
            Timestamp::from_millis(0.0),
        );
        assert!(anim.is_complete(Timestamp::from_millis(0.0)));
        assert!(anim.sample(Timestamp::from_millis(0.0)).cards.is_empty());
    }
}
