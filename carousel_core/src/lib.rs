// carousel_core: Resonance Rust/WASM carousel engine
// Layout, physics, input and transforms live here; JS only measures, paints and plays video.

mod catalog;
mod discovery;
mod engine;
mod entry;
mod error;
mod history;
mod input;
mod layout;
mod logging;
mod physics;
mod scheduler;
mod showcase;
mod tracker;
mod transform;
mod types;

#[cfg(target_arch = "wasm32")]
mod browser;

use serde::Serialize;
use wasm_bindgen::prelude::*;

pub use catalog::{
    parse_catalog, ApiResponse, CatalogRequest, Movie, MovieDraft, MovieRecord, UserProfile,
};
pub use discovery::{find_by_title, first_match, recommendations, search};
pub use engine::CarouselEngine;
pub use entry::{EntryAnimation, EntryCardFrame, EntryFrame};
pub use error::CarouselError;
pub use history::{ContinueWatching, WatchEntry, STORAGE_KEY};
pub use input::{hit_test, GestureController, GestureOutcome};
pub use layout::{wrap, TrackLayout};
pub use physics::ScrollState;
pub use scheduler::{FrameHandle, FrameScheduler};
pub use showcase::{Showcase, ShowcaseRatings, ShowcaseTab, ShowcaseView};
pub use tracker::ActiveTracker;
pub use transform::{closest_index, render, RenderedFrame, TransformComponents};
pub use types::*;

/// Initialize panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init();
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[derive(Serialize)]
struct ShowcaseUpdate<'a> {
    view: ShowcaseView,
    movie: &'a Movie,
    ratings: ShowcaseRatings,
    video: Vec<VideoDirective>,
}

/// Carousel interface exposed to JavaScript.
/// Structured values cross the boundary as JSON strings.
#[wasm_bindgen]
pub struct Carousel {
    engine: CarouselEngine,
}

#[wasm_bindgen]
impl Carousel {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<Carousel, JsValue> {
        let config: CarouselConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;

        Ok(Carousel {
            engine: CarouselEngine::new(config)?,
        })
    }

    /// Lay out the `/movies` response body. Returns the initial video directives.
    pub fn load_catalog(
        &mut self,
        movies_json: &str,
        viewport_width: f64,
        now_ms: f64,
    ) -> Result<String, JsValue> {
        let movies = parse_catalog(movies_json)?;
        let video = self
            .engine
            .load(movies, viewport_width, Timestamp::from_millis(now_ms));
        to_json(&video)
    }

    pub fn load_failed(&mut self, message: &str) {
        self.engine.load_failed(message);
    }

    /// Current lifecycle phase as `{ "phase": ... }`.
    pub fn phase(&self) -> Result<String, JsValue> {
        to_json(self.engine.phase())
    }

    pub fn card_count(&self) -> usize {
        self.engine.movies().len()
    }

    /// Reference card and viewport sizes. Returns the re-rendered cards.
    pub fn measure(
        &mut self,
        card_width: f64,
        card_height: f64,
        viewport_width: f64,
    ) -> Result<String, JsValue> {
        let frame = self.engine.measure(card_width, card_height, viewport_width);
        to_json(&frame.cards)
    }

    /// Plan the compositing warm-up. Returns how many passes to paint.
    pub fn begin_warmup(&mut self) -> Result<usize, JsValue> {
        Ok(self.engine.begin_warmup()?)
    }

    /// Card transforms for one warm-up pass. Paint it, then ask for the next.
    pub fn warmup_pass(&self, pass: usize) -> Result<String, JsValue> {
        let frame = self.engine.warmup_pass(pass)?;
        to_json(&frame.cards)
    }

    /// Steady cards at the original scroll. Entry may begin afterwards.
    pub fn finish_warmup(&mut self) -> Result<String, JsValue> {
        let frame = self.engine.finish_warmup()?;
        to_json(&frame.cards)
    }

    pub fn begin_entry(&mut self, now_ms: f64) -> Result<String, JsValue> {
        let frame = self.engine.begin_entry(Timestamp::from_millis(now_ms))?;
        to_json(&frame)
    }

    pub fn entry_frame(&mut self, now_ms: f64) -> Result<String, JsValue> {
        let frame = self.engine.entry_frame(Timestamp::from_millis(now_ms))?;
        to_json(&frame)
    }

    /// Arm the frame loop. Pass the returned handle to every `frame` call.
    pub fn start(&mut self) -> Result<u32, JsValue> {
        Ok(self.engine.start()?.as_raw())
    }

    pub fn cancel(&mut self, handle: u32) -> bool {
        self.engine.cancel(FrameHandle::from_raw(handle))
    }

    /// One animation frame. `now_ms` is the requestAnimationFrame timestamp.
    pub fn frame(&mut self, handle: u32, now_ms: f64) -> Result<String, JsValue> {
        let output = self
            .engine
            .frame(FrameHandle::from_raw(handle), Timestamp::from_millis(now_ms))?;
        to_json(&output)
    }

    /// Returns false when the event was ignored; the host should not preventDefault then.
    pub fn wheel(&mut self, delta_x: f64, delta_y: f64) -> bool {
        self.engine.wheel(delta_x, delta_y)
    }

    /// `card` is the index of the card element under the pointer, if the host found one.
    pub fn pointer_down(&mut self, client_x: f64, now_ms: f64, card: Option<u32>) -> bool {
        self.engine.pointer_down(
            client_x,
            Timestamp::from_millis(now_ms),
            card.map(|c| c as usize),
        )
    }

    pub fn pointer_move(&mut self, client_x: f64, now_ms: f64) {
        self.engine
            .pointer_move(client_x, Timestamp::from_millis(now_ms));
    }

    /// `CarouselEvent` JSON, or undefined when the gesture produced nothing.
    pub fn pointer_up(&mut self) -> Result<Option<String>, JsValue> {
        self.engine.pointer_up().map(|e| to_json(&e)).transpose()
    }

    pub fn pointer_cancel(&mut self) {
        self.engine.pointer_cancel();
    }

    pub fn is_dragging(&self) -> bool {
        self.engine.is_dragging()
    }

    /// Center a card, e.g. the result of an Enter-key search.
    pub fn focus_card(&mut self, index: usize) -> Result<String, JsValue> {
        let frame = self.engine.focus_card(index)?;
        to_json(&frame.cards)
    }

    /// Indices of matching titles.
    pub fn search(&self, query: &str) -> Result<String, JsValue> {
        to_json(&self.engine.search(query))
    }

    pub fn first_match(&self, query: &str) -> Option<usize> {
        self.engine.first_match(query)
    }

    /// Movies related to `title` (or the catalog head when absent), as JSON.
    pub fn recommendations(&self, title: Option<String>) -> Result<String, JsValue> {
        let base = title.and_then(|t| find_by_title(self.engine.movies(), &t));
        let movies: Vec<&Movie> = self
            .engine
            .recommendations(base)
            .into_iter()
            .filter_map(|i| self.engine.movies().get(i))
            .collect();
        to_json(&movies)
    }

    pub fn movie(&self, index: usize) -> Result<String, JsValue> {
        to_json(self.engine.movie(index)?)
    }

    /// Open the detail overlay on `index`.
    pub fn open_showcase(&mut self, index: usize) -> Result<String, JsValue> {
        let (view, video) = self.engine.open_showcase(index)?;
        let movie = self.engine.movie(index)?;
        to_json(&ShowcaseUpdate {
            view,
            movie,
            ratings: ShowcaseRatings::derive(&movie.rating),
            video,
        })
    }

    /// Directives that resume the background video.
    pub fn close_showcase(&mut self) -> Result<String, JsValue> {
        to_json(&self.engine.close_showcase())
    }

    /// `tab` is one of "overview", "related", "trailers".
    pub fn switch_tab(&mut self, tab: &str) -> Result<String, JsValue> {
        let tab: ShowcaseTab = serde_json::from_value(serde_json::Value::String(tab.to_string()))
            .map_err(|e| JsValue::from_str(&format!("Unknown tab: {}", e)))?;
        to_json(&self.engine.showcase_mut().switch_tab(tab))
    }

    /// Fullscreen trailer view, or undefined when there is no trailer.
    pub fn watch_now(&mut self) -> Result<Option<String>, JsValue> {
        self.engine
            .showcase_mut()
            .watch_now()
            .map(|v| to_json(&v))
            .transpose()
    }

    pub fn exit_fullscreen(&mut self) -> Result<String, JsValue> {
        to_json(&self.engine.showcase_mut().exit_fullscreen())
    }

    /// Seek target when a background video starts playing, if it needs one.
    pub fn seek_on_play(&self, current_time: f64) -> Option<f64> {
        self.engine.config().video.seek_on_play(current_time)
    }

    /// Seek target on `timeupdate` once the preview window has been played through.
    pub fn loop_seek(&self, current_time: f64) -> Option<f64> {
        self.engine.config().video.loop_seek(current_time)
    }

    pub fn restore_history(&mut self, raw: Option<String>) {
        self.engine.restore_history(raw.as_deref());
    }

    /// Record a watch and return the list to persist.
    pub fn record_watch(&mut self, index: usize, progress: u8) -> Result<String, JsValue> {
        self.engine.record_watch(index, progress)?;
        Ok(self.engine.history().to_json()?)
    }

    pub fn history(&self) -> Result<String, JsValue> {
        Ok(self.engine.history().to_json()?)
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl Carousel {
    /// Load "continue watching" from localStorage.
    pub fn restore_stored_history(&mut self) {
        let raw = browser::load_item(STORAGE_KEY);
        self.engine.restore_history(raw.as_deref());
    }

    /// Record a watch with simulated progress and persist the list.
    pub fn watch(&mut self, index: usize) -> Result<String, JsValue> {
        self.engine.record_watch(index, browser::random_progress())?;
        let json = self.engine.history().to_json()?;
        browser::store_item(STORAGE_KEY, &json);
        Ok(json)
    }
}

/// Fetch `GET {api_base}/movies`. Resolves to the raw body for `Carousel::load_catalog`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn fetch_movies(api_base: String) -> Result<String, JsValue> {
    let body = browser::send(&api_base, &CatalogRequest::ListMovies).await?;
    parse_catalog(&body)?;
    Ok(body)
}

/// Create (no `id`) or update a movie from an admin form draft.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn save_movie(api_base: String, id: Option<i32>, draft_json: String) -> Result<(), JsValue> {
    let draft: MovieDraft = serde_json::from_str(&draft_json).map_err(CarouselError::from)?;
    let request = match id {
        Some(id) => CatalogRequest::UpdateMovie {
            id: id.into(),
            draft,
        },
        None => CatalogRequest::CreateMovie(draft),
    };
    let body = browser::send(&api_base, &request).await?;
    let response: ApiResponse = serde_json::from_str(&body).map_err(CarouselError::from)?;
    Ok(response.into_result()?)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn delete_movie(api_base: String, id: i32) -> Result<(), JsValue> {
    let body = browser::send(&api_base, &CatalogRequest::DeleteMovie { id: id.into() }).await?;
    let response: ApiResponse = serde_json::from_str(&body).map_err(CarouselError::from)?;
    Ok(response.into_result()?)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn admin_login(api_base: String, username: String, password: String) -> Result<(), JsValue> {
    let body = browser::send(&api_base, &CatalogRequest::Login { username, password }).await?;
    let response: ApiResponse = serde_json::from_str(&body).map_err(CarouselError::from)?;
    Ok(response.into_result()?)
}

/// Firebase client config as served by the backend, passed through untouched.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn firebase_config(api_base: String) -> Result<String, JsValue> {
    Ok(browser::send(&api_base, &CatalogRequest::FirebaseConfig).await?)
}

/// Push the signed-in user's profile to the backend.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn sync_user(api_base: String, profile_json: String) -> Result<String, JsValue> {
    let profile: UserProfile = serde_json::from_str(&profile_json).map_err(CarouselError::from)?;
    Ok(browser::send(&api_base, &CatalogRequest::SyncUser(profile)).await?)
}
