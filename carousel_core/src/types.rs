// Strong typing over loose numbers. Frame timestamps, configuration, and the wire types handed to JS.

use serde::{Deserialize, Serialize};

use crate::catalog::Movie;
use crate::error::CarouselError;

/// Frame timestamp in milliseconds, as delivered by `requestAnimationFrame`
/// and `performance.now()`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
pub struct Timestamp(f64);

impl Timestamp {
    pub fn from_millis(ms: f64) -> Self {
        Timestamp(ms)
    }

    pub fn as_millis(&self) -> f64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`. Negative when clocks go backwards.
    pub fn millis_since(&self, earlier: Timestamp) -> f64 {
        self.0 - earlier.0
    }

    pub fn offset_millis(&self, ms: f64) -> Self {
        Timestamp(self.0 + ms)
    }
}

/// Lifecycle of a carousel instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase")]
pub enum Phase {
    /// Waiting for the movie list.
    Loading,
    /// The movie list could not be fetched. Nothing downstream runs.
    Failed { message: String },
    /// Laid out and tracked, entry sequence not started.
    Ready,
    /// Entry tweens in flight. Input is ignored.
    Entering,
    /// Frame loop owns the track.
    Running,
}

/// Engine configuration passed from JS. Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub physics: PhysicsSettings,
    #[serde(default)]
    pub input: InputSettings,
    #[serde(default)]
    pub visual: VisualSettings,
    #[serde(default)]
    pub video: VideoSettings,
    #[serde(default)]
    pub entry: EntrySettings,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        CarouselConfig {
            api_base: default_api_base(),
            layout: LayoutSettings::default(),
            physics: PhysicsSettings::default(),
            input: InputSettings::default(),
            visual: VisualSettings::default(),
            video: VideoSettings::default(),
            entry: EntrySettings::default(),
        }
    }
}

impl CarouselConfig {
    /// Reject values that would break the physics or layout math.
    pub fn validate(&self) -> Result<(), CarouselError> {
        let p = &self.physics;
        if !(p.friction > 0.0 && p.friction < 1.0) {
            return Err(CarouselError::InvalidConfig(format!(
                "friction must be in (0, 1), got {}",
                p.friction
            )));
        }
        if p.velocity_epsilon < 0.0 || p.max_frame_dt <= 0.0 || p.baseline_fps <= 0.0 {
            return Err(CarouselError::InvalidConfig(
                "velocity_epsilon must be >= 0, max_frame_dt and baseline_fps > 0".to_string(),
            ));
        }

        let l = &self.layout;
        if l.card_width <= 0.0 || l.card_height <= 0.0 || l.gap < 0.0 {
            return Err(CarouselError::InvalidConfig(format!(
                "card size must be positive and gap non-negative, got {}x{} gap {}",
                l.card_width, l.card_height, l.gap
            )));
        }

        if self.input.drag_threshold < 0.0 {
            return Err(CarouselError::InvalidConfig(
                "drag_threshold must be >= 0".to_string(),
            ));
        }
        if !(self.input.min_move_interval_ms > 0.0) {
            return Err(CarouselError::InvalidConfig(format!(
                "min_move_interval_ms must be positive, got {}",
                self.input.min_move_interval_ms
            )));
        }

        if self.video.loop_end <= self.video.start_offset {
            return Err(CarouselError::InvalidConfig(format!(
                "video loop_end ({}) must be after start_offset ({})",
                self.video.loop_end, self.video.start_offset
            )));
        }

        if !(self.entry.duration > 0.0) {
            return Err(CarouselError::InvalidConfig(
                "entry duration must be positive".to_string(),
            ));
        }
        let fraction = self.entry.warmup_step_fraction;
        if !(MIN_WARMUP_STEP_FRACTION..=1.0).contains(&fraction) {
            return Err(CarouselError::InvalidConfig(format!(
                "warmup_step_fraction must be in [{MIN_WARMUP_STEP_FRACTION}, 1], got {fraction}"
            )));
        }

        Ok(())
    }
}

/// Warm-up renders `1 / fraction` passes per card; below this the pass count explodes.
pub const MIN_WARMUP_STEP_FRACTION: f64 = 0.05;

fn default_api_base() -> String {
    "http://localhost:3000/api".to_string()
}

/// Card geometry used until the host reports a real measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutSettings {
    #[serde(default = "default_card_width")]
    pub card_width: f64,
    #[serde(default = "default_card_height")]
    pub card_height: f64,
    #[serde(default = "default_gap")]
    pub gap: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        LayoutSettings {
            card_width: default_card_width(),
            card_height: default_card_height(),
            gap: default_gap(),
        }
    }
}

fn default_card_width() -> f64 {
    300.0
}

fn default_card_height() -> f64 {
    400.0
}

fn default_gap() -> f64 {
    28.0
}

/// Velocity decay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsSettings {
    /// Per-frame velocity multiplier at the baseline frame rate.
    #[serde(default = "default_friction")]
    pub friction: f64,
    /// Velocity below this magnitude snaps to zero.
    #[serde(default = "default_velocity_epsilon")]
    pub velocity_epsilon: f64,
    /// Frame rate the friction constant was tuned at.
    #[serde(default = "default_baseline_fps")]
    pub baseline_fps: f64,
    /// Upper bound on a single frame's dt (seconds). Stops tab-resume jumps.
    #[serde(default = "default_max_frame_dt")]
    pub max_frame_dt: f64,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        PhysicsSettings {
            friction: default_friction(),
            velocity_epsilon: default_velocity_epsilon(),
            baseline_fps: default_baseline_fps(),
            max_frame_dt: default_max_frame_dt(),
        }
    }
}

fn default_friction() -> f64 {
    0.9
}

fn default_velocity_epsilon() -> f64 {
    0.02
}

fn default_baseline_fps() -> f64 {
    60.0
}

fn default_max_frame_dt() -> f64 {
    0.1
}

/// Wheel and pointer tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSettings {
    #[serde(default = "default_wheel_sensitivity")]
    pub wheel_sensitivity: f64,
    /// Multiplier turning wheel deltas into velocity units.
    #[serde(default = "default_wheel_scale")]
    pub wheel_scale: f64,
    #[serde(default = "default_drag_sensitivity")]
    pub drag_sensitivity: f64,
    /// Pixels of travel before a press becomes a drag.
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold: f64,
    /// Floor for the time between two moves in the velocity estimate (ms).
    #[serde(default = "default_min_move_interval_ms")]
    pub min_move_interval_ms: f64,
}

impl Default for InputSettings {
    fn default() -> Self {
        InputSettings {
            wheel_sensitivity: default_wheel_sensitivity(),
            wheel_scale: default_wheel_scale(),
            drag_sensitivity: default_drag_sensitivity(),
            drag_threshold: default_drag_threshold(),
            min_move_interval_ms: default_min_move_interval_ms(),
        }
    }
}

fn default_wheel_sensitivity() -> f64 {
    0.6
}

fn default_wheel_scale() -> f64 {
    20.0
}

fn default_drag_sensitivity() -> f64 {
    1.0
}

fn default_drag_threshold() -> f64 {
    5.0
}

fn default_min_move_interval_ms() -> f64 {
    1.0
}

/// Perspective and depth-of-field settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualSettings {
    #[serde(default = "default_max_rotation")]
    pub max_rotation: f64,
    #[serde(default = "default_max_depth")]
    pub max_depth: f64,
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    #[serde(default = "default_scale_range")]
    pub scale_range: f64,
    #[serde(default = "default_blur_strength")]
    pub blur_strength: f64,
    #[serde(default = "default_blur_exponent")]
    pub blur_exponent: f64,
    #[serde(default = "default_z_index_base")]
    pub z_index_base: i32,
}

impl Default for VisualSettings {
    fn default() -> Self {
        VisualSettings {
            max_rotation: default_max_rotation(),
            max_depth: default_max_depth(),
            min_scale: default_min_scale(),
            scale_range: default_scale_range(),
            blur_strength: default_blur_strength(),
            blur_exponent: default_blur_exponent(),
            z_index_base: default_z_index_base(),
        }
    }
}

fn default_max_rotation() -> f64 {
    28.0
}

fn default_max_depth() -> f64 {
    140.0
}

fn default_min_scale() -> f64 {
    0.92
}

fn default_scale_range() -> f64 {
    0.1
}

fn default_blur_strength() -> f64 {
    2.0
}

fn default_blur_exponent() -> f64 {
    1.1
}

fn default_z_index_base() -> i32 {
    1000
}

/// Background trailer playback window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSettings {
    /// Seconds into the trailer where background playback begins.
    #[serde(default = "default_video_start")]
    pub start_offset: f64,
    /// Playback jumps back to `start_offset` once it reaches this point.
    #[serde(default = "default_video_loop_end")]
    pub loop_end: f64,
    /// Delay before the previous video is paused, so the crossfade can finish.
    #[serde(default = "default_pause_grace_ms")]
    pub pause_grace_ms: f64,
}

impl Default for VideoSettings {
    fn default() -> Self {
        VideoSettings {
            start_offset: default_video_start(),
            loop_end: default_video_loop_end(),
            pause_grace_ms: default_pause_grace_ms(),
        }
    }
}

fn default_video_start() -> f64 {
    10.0
}

fn default_video_loop_end() -> f64 {
    20.0
}

fn default_pause_grace_ms() -> f64 {
    1000.0
}

/// Startup warm-up and entry tween settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySettings {
    /// Per-card tween length (seconds).
    #[serde(default = "default_entry_duration")]
    pub duration: f64,
    /// Delay between consecutive cards (seconds).
    #[serde(default = "default_entry_stagger")]
    pub stagger: f64,
    #[serde(default = "default_entry_start_scale")]
    pub start_scale: f64,
    /// Downward offset (px) cards rise from.
    #[serde(default = "default_entry_start_offset_y")]
    pub start_offset_y: f64,
    /// Cards within this fraction of the viewport width from center animate in.
    #[serde(default = "default_entry_visible_fraction")]
    pub visible_fraction: f64,
    /// Warm-up advances by this fraction of a step per pass.
    #[serde(default = "default_warmup_step_fraction")]
    pub warmup_step_fraction: f64,
    #[serde(default = "default_entry_easing")]
    pub easing: EasingType,
}

impl Default for EntrySettings {
    fn default() -> Self {
        EntrySettings {
            duration: default_entry_duration(),
            stagger: default_entry_stagger(),
            start_scale: default_entry_start_scale(),
            start_offset_y: default_entry_start_offset_y(),
            visible_fraction: default_entry_visible_fraction(),
            warmup_step_fraction: default_warmup_step_fraction(),
            easing: default_entry_easing(),
        }
    }
}

fn default_entry_duration() -> f64 {
    0.6
}

fn default_entry_stagger() -> f64 {
    0.05
}

fn default_entry_start_scale() -> f64 {
    0.92
}

fn default_entry_start_offset_y() -> f64 {
    40.0
}

fn default_entry_visible_fraction() -> f64 {
    0.6
}

fn default_warmup_step_fraction() -> f64 {
    0.5
}

fn default_entry_easing() -> EasingType {
    EasingType::EaseOutQuart
}

/// Easing curve for entry tweens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EasingType {
    Linear,
    EaseOutCubic,
    /// Strong deceleration. Matches the tweening library's `power3.out`.
    EaseOutQuart,
    EaseInOut,
}

impl EasingType {
    /// Map linear progress `t` in [0, 1] onto the curve.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingType::Linear => t,
            EasingType::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            EasingType::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            EasingType::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Screen transform for one card in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardTransform {
    pub index: usize,
    /// Wrapped position relative to viewport center (px).
    pub position: f64,
    pub rotation_deg: f64,
    pub depth: f64,
    pub scale: f64,
    pub z_index: i32,
    /// Blur radius in px. Zero for the core set.
    pub blur: f64,
    /// Closest card to center.
    pub active: bool,
    /// Composed CSS `transform` value.
    pub css: String,
}

/// Instruction for the host's background video elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VideoDirective {
    /// Show and play `index`; seek to `start_at` if playback is before it.
    Play { index: usize, start_at: f64 },
    /// Pause `index`.
    Pause { index: usize },
}

/// Everything the host needs to paint one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameOutput {
    pub scroll_x: f64,
    pub velocity: f64,
    pub active_index: Option<usize>,
    pub cards: Vec<CardTransform>,
    pub video: Vec<VideoDirective>,
}

/// Discrete events raised by input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CarouselEvent {
    /// A click landed on a card; the host opens the showcase.
    CardSelected { index: usize, movie: Movie },
    /// A drag ended and handed its momentum to the physics loop.
    DragReleased { velocity: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_conversions() {
        let ts = Timestamp::from_millis(1500.0);
        assert_eq!(ts.as_millis(), 1500.0);
        assert_eq!(ts.offset_millis(500.0).millis_since(ts), 500.0);
    }

    #[test]
    fn empty_config_uses_tuned_defaults() {
        let config: CarouselConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.physics.friction, 0.9);
        assert_eq!(config.input.drag_threshold, 5.0);
        assert_eq!(config.layout.gap, 28.0);
        assert_eq!(config.visual.max_rotation, 28.0);
        assert_eq!(config.api_base, "http://localhost:3000/api");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: CarouselConfig =
            serde_json::from_str(r#"{"physics":{"friction":0.8}}"#).unwrap();
        assert_eq!(config.physics.friction, 0.8);
        assert_eq!(config.physics.velocity_epsilon, 0.02);
    }

    #[test]
    fn rejects_friction_out_of_range() {
        let mut config = CarouselConfig::default();
        config.physics.friction = 1.0;
        assert!(matches!(
            config.validate(),
            Err(CarouselError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_zero_move_interval() {
        let config: CarouselConfig =
            serde_json::from_str(r#"{"input":{"min_move_interval_ms":0}}"#).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_move_interval_ms"));
    }

    #[test]
    fn rejects_tiny_warmup_stride() {
        let mut config = CarouselConfig::default();
        config.entry.warmup_step_fraction = 1e-9;
        assert!(config.validate().is_err());
        config.entry.warmup_step_fraction = f64::NAN;
        assert!(config.validate().is_err());
        config.entry.warmup_step_fraction = MIN_WARMUP_STEP_FRACTION;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn easing_bounds() {
        for easing in [
            EasingType::Linear,
            EasingType::EaseOutCubic,
            EasingType::EaseOutQuart,
            EasingType::EaseInOut,
        ] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
            assert!(easing.apply(0.5) >= 0.0 && easing.apply(0.5) <= 1.0);
        }
        assert!(EasingType::EaseOutQuart.apply(0.5) > EasingType::Linear.apply(0.5));
    }

    #[test]
    fn video_directive_is_tagged() {
        let json = serde_json::to_string(&VideoDirective::Pause { index: 3 }).unwrap();
        assert_eq!(json, r#"{"type":"Pause","index":3}"#);
    }
}
