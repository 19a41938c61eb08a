// Screen transforms: perspective rotation, depth, scale, stacking and depth-of-field blur.
// Pure functions of a card's wrapped position so the warm-up pass can replay them.

use crate::layout::TrackLayout;
use crate::types::{CardTransform, VisualSettings};

/// Rotation, depth and scale for one wrapped position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformComponents {
    /// `pos / half_viewport`, clamped to [-1, 1].
    pub norm: f64,
    pub rotation_deg: f64,
    pub depth: f64,
    pub scale: f64,
}

impl TransformComponents {
    pub fn compute(position: f64, half_viewport: f64, settings: &VisualSettings) -> Self {
        let norm = if half_viewport > 0.0 {
            (position / half_viewport).clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let inv = 1.0 - norm.abs();

        TransformComponents {
            norm,
            rotation_deg: -norm * settings.max_rotation,
            depth: inv * settings.max_depth,
            scale: settings.min_scale + inv * settings.scale_range,
        }
    }

    /// Stacking order: nearer cards (greater depth) paint on top.
    pub fn z_index(&self, settings: &VisualSettings) -> i32 {
        settings.z_index_base + self.depth.round() as i32
    }

    /// Depth-of-field blur for cards outside the core set.
    pub fn blur(&self, settings: &VisualSettings) -> f64 {
        settings.blur_strength * self.norm.abs().powf(settings.blur_exponent)
    }

    pub fn css(&self, position: f64) -> String {
        css_transform(position, self.depth, self.rotation_deg, self.scale, None)
    }
}

/// `translate3d(x,-50%,z) rotateY(ry) scale(s)`, with an optional trailing `translateY`.
pub fn css_transform(
    x: f64,
    depth: f64,
    rotation_deg: f64,
    scale: f64,
    offset_y: Option<f64>,
) -> String {
    let mut css = format!(
        "translate3d({}px,-50%,{}px) rotateY({}deg) scale({})",
        fmt_num(x),
        fmt_num(depth),
        fmt_num(rotation_deg),
        fmt_num(scale)
    );
    if let Some(y) = offset_y {
        css.push_str(&format!(" translateY({}px)", fmt_num(y)));
    }
    css
}

// Four decimals, trailing zeros trimmed.
fn fmt_num(v: f64) -> String {
    let s = format!("{:.4}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Index whose wrapped position is closest to zero. Ties keep the lower index.
pub fn closest_index(positions: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, pos) in positions.iter().enumerate() {
        let dist = pos.abs();
        match best {
            Some((_, d)) if dist >= d => {}
            _ => best = Some((i, dist)),
        }
    }
    best.map(|(i, _)| i)
}

/// True for the closest card and its two circular neighbors.
pub fn is_core(index: usize, closest: usize, count: usize) -> bool {
    if count == 0 {
        return false;
    }
    let prev = (closest + count - 1) % count;
    let next = (closest + 1) % count;
    index == closest || index == prev || index == next
}

/// One rendered frame: every card's transform plus the closest index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderedFrame {
    pub closest: Option<usize>,
    pub cards: Vec<CardTransform>,
}

/// Compute transforms for all cards at `scroll_x`. Empty track renders nothing.
pub fn render(
    layout: &TrackLayout,
    scroll_x: f64,
    half_viewport: f64,
    settings: &VisualSettings,
) -> RenderedFrame {
    let positions = layout.wrapped_positions(scroll_x);
    let Some(closest) = closest_index(&positions) else {
        return RenderedFrame::default();
    };
    let count = positions.len();

    let cards = positions
        .iter()
        .enumerate()
        .map(|(index, &position)| {
            let c = TransformComponents::compute(position, half_viewport, settings);
            let blur = if is_core(index, closest, count) {
                0.0
            } else {
                c.blur(settings)
            };
            CardTransform {
                index,
                position,
                rotation_deg: c.rotation_deg,
                depth: c.depth,
                scale: c.scale,
                z_index: c.z_index(settings),
                blur,
                active: index == closest,
                css: c.css(position),
            }
        })
        .collect();

    RenderedFrame {
        closest: Some(closest),
        cards,
    }
}
