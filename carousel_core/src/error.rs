// Typed errors with thiserror. Surface meaningful messages to JS.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Carousel error types.
#[derive(Error, Debug)]
pub enum CarouselError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Could not load movies: {0}")]
    Network(String),

    #[error("Malformed movie catalog: {0}")]
    Catalog(String),

    #[error("Card index {index} out of range for {count} cards")]
    CardOutOfRange { index: usize, count: usize },

    #[error("Frame handle {handle} is no longer scheduled")]
    StaleFrame { handle: u32 },

    #[error("Out of sequence: {reason}")]
    InvalidPhase { reason: &'static str },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CarouselError {
    fn from(err: serde_json::Error) -> Self {
        CarouselError::Serialization(err.to_string())
    }
}

impl From<CarouselError> for JsValue {
    fn from(err: CarouselError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
