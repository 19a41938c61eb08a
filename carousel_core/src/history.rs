// "Continue watching": a bounded, most-recent-first list persisted as JSON in local storage.

use serde::{Deserialize, Serialize};

use crate::catalog::Movie;
use crate::error::CarouselError;

pub const STORAGE_KEY: &str = "resonance_continue_watching";
pub const MAX_ENTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub title: String,
    pub cover: String,
    /// Percent watched, 0-100.
    pub progress: u8,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContinueWatching {
    entries: Vec<WatchEntry>,
}

impl ContinueWatching {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the stored list. Missing or malformed data yields an empty list.
    pub fn from_json(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::new();
        };
        match serde_json::from_str::<Option<Vec<WatchEntry>>>(raw) {
            Ok(entries) => {
                let mut list = ContinueWatching {
                    entries: entries.unwrap_or_default(),
                };
                list.entries.truncate(MAX_ENTRIES);
                list
            }
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable continue-watching list");
                Self::new()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, CarouselError> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    /// Move `movie` to the front, replacing any older entry with the same title.
    pub fn record(&mut self, movie: &Movie, progress: u8) {
        self.entries.retain(|e| e.title != movie.title);
        self.entries.insert(
            0,
            WatchEntry {
                title: movie.title.clone(),
                cover: movie.cover.clone(),
                progress: progress.min(100),
            },
        );
        self.entries.truncate(MAX_ENTRIES);
    }

    pub fn entries(&self) -> &[WatchEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
