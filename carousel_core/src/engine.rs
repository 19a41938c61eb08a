// Carousel context: one instance per page view, owning layout, physics, input,
// tracking and the startup sequence. The JS facade in lib.rs is a thin wrapper.

use crate::catalog::Movie;
use crate::discovery;
use crate::entry::{warmup_offsets, EntryAnimation, EntryFrame};
use crate::error::CarouselError;
use crate::history::ContinueWatching;
use crate::input::{hit_test, GestureController, GestureOutcome};
use crate::layout::{wrap, TrackLayout};
use crate::physics::ScrollState;
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::showcase::{Showcase, ShowcaseView};
use crate::tracker::ActiveTracker;
use crate::transform::{render, RenderedFrame};
use crate::types::*;

pub struct CarouselEngine {
    config: CarouselConfig,
    phase: Phase,
    movies: Vec<Movie>,
    layout: TrackLayout,
    scroll: ScrollState,
    gestures: GestureController,
    tracker: ActiveTracker,
    scheduler: FrameScheduler,
    warmup: Option<Vec<f64>>,
    warmed: bool,
    entry: Option<EntryAnimation>,
    entry_complete: bool,
    showcase: Showcase,
    history: ContinueWatching,
    viewport_width: f64,
    last_frame: RenderedFrame,
}

impl CarouselEngine {
    pub fn new(config: CarouselConfig) -> Result<Self, CarouselError> {
        config.validate()?;
        let layout = TrackLayout::new(
            0,
            config.layout.card_width,
            config.layout.card_height,
            config.layout.gap,
        );

        Ok(CarouselEngine {
            gestures: GestureController::new(config.input.clone()),
            tracker: ActiveTracker::new(config.video.clone()),
            scheduler: FrameScheduler::new(config.physics.max_frame_dt),
            config,
            phase: Phase::Loading,
            movies: Vec::new(),
            layout,
            scroll: ScrollState::new(),
            warmup: None,
            warmed: false,
            entry: None,
            entry_complete: false,
            showcase: Showcase::new(),
            history: ContinueWatching::new(),
            viewport_width: 0.0,
            last_frame: RenderedFrame::default(),
        })
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn movie(&self, index: usize) -> Result<&Movie, CarouselError> {
        self.movies.get(index).ok_or(CarouselError::CardOutOfRange {
            index,
            count: self.movies.len(),
        })
    }

    pub fn layout(&self) -> &TrackLayout {
        &self.layout
    }

    pub fn scroll(&self) -> ScrollState {
        self.scroll
    }

    pub fn active_index(&self) -> Option<usize> {
        self.tracker.active()
    }

    pub fn last_frame(&self) -> &RenderedFrame {
        &self.last_frame
    }

    /// Lay out a freshly fetched catalog and pick the initial active card.
    /// Returns the directive that starts its background video.
    pub fn load(
        &mut self,
        movies: Vec<Movie>,
        viewport_width: f64,
        now: Timestamp,
    ) -> Vec<VideoDirective> {
        let settings = &self.config.layout;
        self.layout = TrackLayout::new(
            movies.len(),
            settings.card_width,
            settings.card_height,
            settings.gap,
        );
        self.movies = movies;
        self.viewport_width = viewport_width.max(0.0);
        self.scroll = ScrollState::new();
        self.gestures.pointer_cancel();
        self.tracker.reset();
        self.warmup = None;
        self.warmed = false;
        self.entry = None;
        self.entry_complete = false;
        self.showcase.close();
        if let Some(handle) = self.scheduler.armed() {
            self.scheduler.cancel(handle);
        }

        tracing::info!(
            count = self.movies.len(),
            track = self.layout.track(),
            "carousel laid out"
        );

        self.render_current();
        self.phase = Phase::Ready;
        self.tracker.update(self.last_frame.closest, now)
    }

    /// The fetch failed. Nothing downstream may run.
    pub fn load_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(reason = %message, "could not load movies");
        self.phase = Phase::Failed { message };
    }

    /// Reference card or viewport changed size. Keeps the same fraction of the
    /// track centered.
    pub fn measure(&mut self, card_width: f64, card_height: f64, viewport_width: f64) -> &RenderedFrame {
        self.scroll.scroll_x = self
            .layout
            .remeasure(card_width, card_height, self.scroll.scroll_x);
        if viewport_width > 0.0 {
            self.viewport_width = viewport_width;
        }
        self.render_current()
    }

    /// Jump the track so `scroll_x` (wrapped) is at center. Velocity is kept.
    pub fn scroll_to(&mut self, scroll_x: f64) -> &RenderedFrame {
        self.scroll.scroll_x = wrap(scroll_x, self.layout.track());
        self.render_current()
    }

    /// Center card `index` and stop any momentum.
    pub fn focus_card(&mut self, index: usize) -> Result<&RenderedFrame, CarouselError> {
        let slot = self.layout.slot(index).ok_or(CarouselError::CardOutOfRange {
            index,
            count: self.layout.len(),
        })?;
        self.scroll.velocity = 0.0;
        Ok(self.scroll_to(slot))
    }

    fn half_viewport(&self) -> f64 {
        self.viewport_width * 0.5
    }

    fn render_current(&mut self) -> &RenderedFrame {
        self.last_frame = render(
            &self.layout,
            self.scroll.scroll_x,
            self.half_viewport(),
            &self.config.visual,
        );
        &self.last_frame
    }

    /// Plan the compositing warm-up over one full cycle. Returns the pass count.
    pub fn begin_warmup(&mut self) -> Result<usize, CarouselError> {
        self.require_phase(|p| matches!(p, Phase::Ready), "warm-up needs a laid out carousel")?;
        let offsets = warmup_offsets(
            &self.layout,
            self.scroll.scroll_x,
            self.config.entry.warmup_step_fraction,
        );
        let passes = offsets.len();
        self.warmup = Some(offsets);
        self.warmed = false;
        Ok(passes)
    }

    /// Transforms for warm-up pass `pass`. Computed on demand; the scroll and
    /// tracking state are not touched.
    pub fn warmup_pass(&self, pass: usize) -> Result<RenderedFrame, CarouselError> {
        let offset = self
            .warmup
            .as_ref()
            .and_then(|offsets| offsets.get(pass))
            .copied()
            .ok_or(CarouselError::InvalidPhase {
                reason: "warm-up pass was not planned",
            })?;
        Ok(render(
            &self.layout,
            offset,
            self.half_viewport(),
            &self.config.visual,
        ))
    }

    /// End the warm-up and return the steady frame at the original scroll.
    pub fn finish_warmup(&mut self) -> Result<&RenderedFrame, CarouselError> {
        self.require_phase(|p| matches!(p, Phase::Ready), "warm-up needs a laid out carousel")?;
        let passes = self
            .warmup
            .take()
            .ok_or(CarouselError::InvalidPhase {
                reason: "warm-up was not started",
            })?
            .len();
        self.warmed = true;
        tracing::debug!(passes, "compositing warm-up done");
        Ok(self.render_current())
    }

    /// Start the entry tweens for the cards currently in view.
    pub fn begin_entry(&mut self, now: Timestamp) -> Result<EntryFrame, CarouselError> {
        self.require_phase(|p| matches!(p, Phase::Ready), "entry needs a laid out carousel")?;
        if !self.warmed {
            return Err(CarouselError::InvalidPhase {
                reason: "the warm-up has not finished",
            });
        }

        let anim = EntryAnimation::plan(
            &self.last_frame,
            self.viewport_width,
            self.config.entry.clone(),
            now,
        );
        let frame = anim.sample(now);
        self.entry_complete = frame.complete;
        self.entry = Some(anim);
        self.phase = Phase::Entering;
        Ok(frame)
    }

    pub fn entry_frame(&mut self, now: Timestamp) -> Result<EntryFrame, CarouselError> {
        self.require_phase(|p| matches!(p, Phase::Entering), "no entry animation running")?;
        let anim = self
            .entry
            .as_ref()
            .ok_or(CarouselError::InvalidPhase { reason: "entry animation missing" })?;
        let frame = anim.sample(now);
        self.entry_complete = frame.complete;
        Ok(frame)
    }

    /// Arm the frame loop. Only after the entry sequence has finished.
    pub fn start(&mut self) -> Result<FrameHandle, CarouselError> {
        let ready = match self.phase {
            Phase::Entering => self.entry_complete,
            Phase::Running => true,
            _ => false,
        };
        if !ready {
            return Err(CarouselError::InvalidPhase {
                reason: "the entry sequence has not finished",
            });
        }
        self.entry = None;
        self.phase = Phase::Running;
        Ok(self.scheduler.start())
    }

    /// Stop future frames. The handle is dead afterwards.
    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        self.scheduler.cancel(handle)
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// One tick: integrate, render, track.
    pub fn frame(&mut self, handle: FrameHandle, now: Timestamp) -> Result<FrameOutput, CarouselError> {
        let dt = self.scheduler.advance(handle, now)?;
        self.scroll
            .integrate(dt, self.layout.track(), &self.config.physics);
        self.render_current();

        let mut video = self.tracker.update(self.last_frame.closest, now);
        if self.showcase.is_open() {
            video.retain(|d| !matches!(d, VideoDirective::Play { .. }));
        }
        video.extend(self.tracker.drain_due_pauses(now));

        Ok(FrameOutput {
            scroll_x: self.scroll.scroll_x,
            velocity: self.scroll.velocity,
            active_index: self.tracker.active(),
            cards: self.last_frame.cards.clone(),
            video,
        })
    }

    fn accepts_input(&self) -> bool {
        matches!(self.phase, Phase::Running) && !self.layout.is_empty()
    }

    /// Wheel impulse. Returns false when input is ignored.
    pub fn wheel(&mut self, delta_x: f64, delta_y: f64) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let impulse = self.gestures.wheel_impulse(delta_x, delta_y);
        self.scroll.add_impulse(impulse);
        true
    }

    /// `target` is the card the host found under the pointer, if any.
    pub fn pointer_down(&mut self, client_x: f64, now: Timestamp, target: Option<usize>) -> bool {
        if !self.accepts_input() {
            return false;
        }
        self.gestures.pointer_down(client_x, now, target);
        true
    }

    pub fn pointer_move(&mut self, client_x: f64, now: Timestamp) {
        if let Some(delta) = self.gestures.pointer_move(client_x, now) {
            self.scroll.shift(delta, self.layout.track());
        }
    }

    /// Resolve the gesture: a click selects a card, a drag hands off momentum.
    pub fn pointer_up(&mut self) -> Option<CarouselEvent> {
        match self.gestures.pointer_up() {
            GestureOutcome::None => None,
            GestureOutcome::Release { velocity } => {
                self.scroll.set_velocity(velocity);
                Some(CarouselEvent::DragReleased {
                    velocity: self.scroll.velocity,
                })
            }
            GestureOutcome::Click { target, x } => {
                let index = target.or_else(|| {
                    hit_test(
                        &self.last_frame.cards,
                        x - self.half_viewport(),
                        self.layout.card_width(),
                    )
                })?;
                let movie = self.movies.get(index)?.clone();
                Some(CarouselEvent::CardSelected { index, movie })
            }
        }
    }

    pub fn pointer_cancel(&mut self) {
        self.gestures.pointer_cancel();
    }

    pub fn is_dragging(&self) -> bool {
        self.gestures.is_dragging()
    }

    /// Open the detail overlay. Background video pauses while it is up.
    pub fn open_showcase(
        &mut self,
        index: usize,
    ) -> Result<(ShowcaseView, Vec<VideoDirective>), CarouselError> {
        let movie = self.movies.get(index).ok_or(CarouselError::CardOutOfRange {
            index,
            count: self.movies.len(),
        })?;
        let view = self.showcase.open(index, movie);
        let video = self
            .tracker
            .active()
            .map(|i| vec![VideoDirective::Pause { index: i }])
            .unwrap_or_default();
        Ok((view, video))
    }

    /// Close the overlay and resume the active background video.
    pub fn close_showcase(&mut self) -> Vec<VideoDirective> {
        if self.showcase.close().is_none() {
            return Vec::new();
        }
        self.tracker
            .active()
            .map(|index| {
                vec![VideoDirective::Play {
                    index,
                    start_at: self.config.video.start_offset,
                }]
            })
            .unwrap_or_default()
    }

    pub fn showcase(&self) -> &Showcase {
        &self.showcase
    }

    pub fn showcase_mut(&mut self) -> &mut Showcase {
        &mut self.showcase
    }

    pub fn search(&self, query: &str) -> Vec<usize> {
        discovery::search(&self.movies, query)
    }

    pub fn first_match(&self, query: &str) -> Option<usize> {
        discovery::first_match(&self.movies, query)
    }

    pub fn recommendations(&self, base: Option<usize>) -> Vec<usize> {
        let base = base.and_then(|i| self.movies.get(i));
        discovery::recommendations(&self.movies, base, discovery::DEFAULT_RECOMMENDATIONS)
    }

    pub fn history(&self) -> &ContinueWatching {
        &self.history
    }

    pub fn restore_history(&mut self, raw: Option<&str>) {
        self.history = ContinueWatching::from_json(raw);
    }

    pub fn record_watch(&mut self, index: usize, progress: u8) -> Result<(), CarouselError> {
        let movie = self.movies.get(index).ok_or(CarouselError::CardOutOfRange {
            index,
            count: self.movies.len(),
        })?;
        self.history.record(movie, progress);
        Ok(())
    }

    fn require_phase(
        &self,
        allowed: impl Fn(&Phase) -> bool,
        reason: &'static str,
    ) -> Result<(), CarouselError> {
        if allowed(&self.phase) {
            Ok(())
        } else {
            Err(CarouselError::InvalidPhase { reason })
        }
    }
}
