// Detail overlay model: derived ratings and the Overview / Related / Trailers tab machine.

use serde::{Deserialize, Serialize};

use crate::catalog::Movie;

const TBA: &str = "TBA";

/// Ratings panel. Only the IMDb score is stored; the others are derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowcaseRatings {
    pub imdb: String,
    pub rotten_tomatoes: String,
    pub metacritic: String,
}

impl ShowcaseRatings {
    pub fn derive(rating: &str) -> Self {
        let score = rating.trim().parse::<f64>().ok().filter(|r| r.is_finite());
        match score {
            Some(r) => ShowcaseRatings {
                imdb: rating.to_string(),
                rotten_tomatoes: format!("{}%", (r * 10.0).round() as i64),
                metacritic: format!("{}", (r * 8.0).round() as i64),
            },
            None => ShowcaseRatings {
                imdb: rating.to_string(),
                rotten_tomatoes: TBA.to_string(),
                metacritic: TBA.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShowcaseTab {
    #[default]
    Overview,
    Related,
    Trailers,
}

/// What the overlay should show right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowcaseView {
    pub tab: ShowcaseTab,
    pub hero_visible: bool,
    pub trailer_visible: bool,
    pub play_trailer: bool,
    pub fullscreen: bool,
}

/// Open/closed overlay with its selected movie and tab.
#[derive(Debug, Clone, Default)]
pub struct Showcase {
    movie: Option<usize>,
    tab: ShowcaseTab,
    fullscreen: bool,
    has_trailer: bool,
}

impl Showcase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open on `index`, always starting at the Overview tab.
    pub fn open(&mut self, index: usize, movie: &Movie) -> ShowcaseView {
        self.movie = Some(index);
        self.has_trailer = movie.has_trailer();
        self.fullscreen = false;
        self.switch_tab(ShowcaseTab::Overview)
    }

    pub fn close(&mut self) -> Option<usize> {
        self.fullscreen = false;
        self.tab = ShowcaseTab::Overview;
        self.movie.take()
    }

    pub fn is_open(&self) -> bool {
        self.movie.is_some()
    }

    pub fn movie(&self) -> Option<usize> {
        self.movie
    }

    pub fn switch_tab(&mut self, tab: ShowcaseTab) -> ShowcaseView {
        self.tab = tab;
        self.view()
    }

    /// "Watch now": fullscreen trailer, independent of the tab.
    pub fn watch_now(&mut self) -> Option<ShowcaseView> {
        if !self.is_open() || !self.has_trailer {
            return None;
        }
        self.fullscreen = true;
        Some(self.view())
    }

    /// Fullscreen ended: fall back to whatever the tab shows.
    pub fn exit_fullscreen(&mut self) -> ShowcaseView {
        self.fullscreen = false;
        self.view()
    }

    pub fn view(&self) -> ShowcaseView {
        let trailer = self.fullscreen || self.tab == ShowcaseTab::Trailers;
        ShowcaseView {
            tab: self.tab,
            hero_visible: !trailer,
            trailer_visible: trailer,
            play_trailer: trailer && self.has_trailer,
            fullscreen: self.fullscreen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MovieRecord;

    fn movie(trailer: Option<&str>) -> Movie {
        Movie::from_record(MovieRecord {
            title: "Heat".to_string(),
            trailer_url: trailer.map(str::to_string),
            ..Default::default()
        })
    }

    #[test]
    fn ratings_are_derived_from_imdb() {
        let r = ShowcaseRatings::derive("8.3");
        assert_eq!(r.imdb, "8.3");
        assert_eq!(r.rotten_tomatoes, "83%");
        assert_eq!(r.metacritic, "66");
    }

    #[test]
    fn unparsable_rating_is_tba() {
        for raw in ["TBA", "N/A", ""] {
            let r = ShowcaseRatings::derive(raw);
            assert_eq!(r.rotten_tomatoes, "TBA");
            assert_eq!(r.metacritic, "TBA");
        }
    }

    #[test]
    fn opens_on_overview_with_hero() {
        let mut s = Showcase::new();
        s.switch_tab(ShowcaseTab::Trailers);
        let view = s.open(3, &movie(Some("t.mp4")));
        assert_eq!(view.tab, ShowcaseTab::Overview);
        assert!(view.hero_visible);
        assert!(!view.play_trailer);
        assert_eq!(s.movie(), Some(3));
    }

    #[test]
    fn trailers_tab_plays_video() {
        let mut s = Showcase::new();
        s.open(0, &movie(Some("t.mp4")));
        let view = s.switch_tab(ShowcaseTab::Trailers);
        assert!(view.trailer_visible && view.play_trailer && !view.hero_visible);
        let view = s.switch_tab(ShowcaseTab::Related);
        assert!(view.hero_visible && !view.play_trailer);
    }

    #[test]
    fn fullscreen_exit_restores_tab_view() {
        let mut s = Showcase::new();
        s.open(0, &movie(Some("t.mp4")));
        let full = s.watch_now().unwrap();
        assert!(full.fullscreen && full.play_trailer);
        let back = s.exit_fullscreen();
        assert!(back.hero_visible && !back.play_trailer);

        s.switch_tab(ShowcaseTab::Trailers);
        s.watch_now();
        let back = s.exit_fullscreen();
        assert!(back.trailer_visible && back.play_trailer);
    }

    #[test]
    fn watch_now_needs_trailer() {
        let mut s = Showcase::new();
        assert!(s.watch_now().is_none());
        s.open(0, &movie(None));
        assert!(s.watch_now().is_none());
    }

    #[test]
    fn tabs_use_host_names() {
        let tab: ShowcaseTab = serde_json::from_str("\"trailers\"").unwrap();
        assert_eq!(tab, ShowcaseTab::Trailers);
        assert_eq!(serde_json::to_string(&ShowcaseTab::Related).unwrap(), "\"related\"");
    }

    #[test]
    fn close_returns_selection() {
        let mut s = Showcase::new();
        s.open(2, &movie(None));
        assert_eq!(s.close(), Some(2));
        assert!(!s.is_open());
        assert_eq!(s.close(), None);
    }
}
