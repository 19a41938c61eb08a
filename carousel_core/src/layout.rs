// Card layout on an infinite, wrapping 1-D track.
// Every position query short-circuits on an empty track instead of dividing by zero.

/// `((n % m) + m) % m`. Zero when the track is empty.
pub fn wrap(n: f64, m: f64) -> f64 {
    if m <= 0.0 || !n.is_finite() {
        return 0.0;
    }
    let r = ((n % m) + m) % m;
    // `-tiny % m + m` can round up to exactly `m`.
    if r >= m {
        0.0
    } else {
        r
    }
}

/// Fixed logical slots for N cards: `x_i = i * (card_width + gap)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackLayout {
    card_width: f64,
    card_height: f64,
    gap: f64,
    step: f64,
    track: f64,
    positions: Vec<f64>,
}

impl TrackLayout {
    pub fn new(count: usize, card_width: f64, card_height: f64, gap: f64) -> Self {
        let mut layout = TrackLayout {
            card_width,
            card_height,
            gap,
            step: 0.0,
            track: 0.0,
            positions: vec![0.0; count],
        };
        layout.relayout();
        layout
    }

    fn relayout(&mut self) {
        self.step = self.card_width + self.gap;
        self.track = self.positions.len() as f64 * self.step;
        let step = self.step;
        for (i, x) in self.positions.iter_mut().enumerate() {
            *x = i as f64 * step;
        }
    }

    /// Apply a fresh measurement of the reference card and return `scroll_x`
    /// rescaled so the same fraction of the track sits at center.
    ///
    /// Non-positive measurements keep the previous size (the card was not
    /// rendered yet).
    pub fn remeasure(&mut self, card_width: f64, card_height: f64, scroll_x: f64) -> f64 {
        let old_track = self.track;

        if card_width > 0.0 {
            self.card_width = card_width;
        }
        if card_height > 0.0 {
            self.card_height = card_height;
        }
        self.relayout();

        tracing::debug!(
            step = self.step,
            track = self.track,
            old_track,
            "carousel remeasured"
        );

        if old_track <= 0.0 {
            return 0.0;
        }
        wrap((scroll_x / old_track) * self.track, self.track)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.track <= 0.0
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn track(&self) -> f64 {
        self.track
    }

    pub fn card_width(&self) -> f64 {
        self.card_width
    }

    pub fn card_height(&self) -> f64 {
        self.card_height
    }

    /// Unwrapped logical slot of card `index`.
    pub fn slot(&self, index: usize) -> Option<f64> {
        self.positions.get(index).copied()
    }

    /// Shortest signed distance from center to card `index`, in `(-track/2, track/2]`.
    pub fn wrapped_position(&self, index: usize, scroll_x: f64) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let x = self.slot(index)?;
        Some(self.wrap_to_center(x - scroll_x))
    }

    /// Wrapped positions of every card, in creation order. Empty when the track is.
    pub fn wrapped_positions(&self, scroll_x: f64) -> Vec<f64> {
        if self.is_empty() {
            return Vec::new();
        }
        self.positions
            .iter()
            .map(|&x| self.wrap_to_center(x - scroll_x))
            .collect()
    }

    fn wrap_to_center(&self, pos: f64) -> f64 {
        let half = self.track / 2.0;
        let mut pos = wrap(pos, self.track);
        if pos > half {
            pos -= self.track;
        }
        pos
    }
}
