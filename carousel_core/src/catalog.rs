// Movie data source: raw API records, normalization, and the catalog endpoints.
// The backend is external; this module only shapes what goes over the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CarouselError;

pub const DEFAULT_RATING: &str = "N/A";
pub const DEFAULT_DESCRIPTION: &str = "No description available.";
pub const DEFAULT_COVER: &str = "images/default_cover.jpg";
pub const DEFAULT_CHARACTER: &str = "images/default_char.png";

/// Text or number. Database drivers disagree on how ratings and years come back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseField {
    Text(String),
    Number(f64),
}

impl LooseField {
    fn into_text(self) -> Option<String> {
        match self {
            LooseField::Text(s) if s.trim().is_empty() => None,
            LooseField::Text(s) => Some(s),
            LooseField::Number(n) => Some(n.to_string()),
        }
    }
}

/// A movie row exactly as `GET /movies` returns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieRecord {
    #[serde(default)]
    pub movie_id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub rating: Option<LooseField>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub release_year: Option<LooseField>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub character_url: Option<String>,
    #[serde(default)]
    pub trailer_url: Option<String>,
    /// JSON column: an array, or that array encoded as a string.
    #[serde(default)]
    pub cast: Option<Value>,
}

/// A normalized movie. Identity is the title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub title: String,
    pub rating: String,
    pub genre: String,
    pub description: String,
    pub cover: String,
    pub character: String,
    pub trailer: String,
    #[serde(default)]
    pub cast: Vec<Value>,
}

impl Movie {
    /// Fill the defaults the page relies on.
    pub fn from_record(record: MovieRecord) -> Self {
        let poster = non_empty(record.poster_url);
        let character = non_empty(record.character_url)
            .or_else(|| poster.clone())
            .unwrap_or_else(|| DEFAULT_CHARACTER.to_string());
        let cast = parse_cast(&record.title, record.cast);

        Movie {
            rating: record
                .rating
                .and_then(LooseField::into_text)
                .unwrap_or_else(|| DEFAULT_RATING.to_string()),
            genre: record.genre.unwrap_or_default(),
            description: non_empty(record.description)
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            cover: poster.unwrap_or_else(|| DEFAULT_COVER.to_string()),
            character,
            trailer: record.trailer_url.unwrap_or_default(),
            cast,
            title: record.title,
        }
    }

    pub fn has_trailer(&self) -> bool {
        !self.trailer.is_empty()
    }

    /// First `/`-separated genre, lowercased. `"Sci-Fi / Action"` → `"sci-fi"`.
    pub fn primary_genre(&self) -> Option<String> {
        let first = self.genre.split('/').next()?.trim();
        if first.is_empty() {
            None
        } else {
            Some(first.to_lowercase())
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Cast arrives as an array or as a JSON string. Anything unreadable becomes empty.
fn parse_cast(title: &str, cast: Option<Value>) -> Vec<Value> {
    match cast {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(Value::String(raw)) => match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(title, error = %err, "unreadable cast field, using empty cast");
                Vec::new()
            }
        },
        Some(other) => {
            tracing::warn!(title, kind = ?other, "unexpected cast field, using empty cast");
            Vec::new()
        }
    }
}

/// Parse and normalize the body of `GET /movies`, keeping server order.
pub fn parse_catalog(json: &str) -> Result<Vec<Movie>, CarouselError> {
    let records: Vec<MovieRecord> =
        serde_json::from_str(json).map_err(|e| CarouselError::Catalog(e.to_string()))?;

    if records.is_empty() {
        tracing::warn!("movie API connected but returned no movies");
    }

    let movies: Vec<Movie> = records.into_iter().map(Movie::from_record).collect();
    tracing::info!(count = movies.len(), "movies loaded");
    Ok(movies)
}

/// Form payload for creating or editing a movie in the admin panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieDraft {
    pub title: String,
    pub rating: String,
    pub genre: String,
    pub release_year: String,
    pub language: String,
    pub description: String,
    pub poster_url: String,
    pub trailer_url: String,
}

impl MovieDraft {
    /// Prefill the edit form from a stored record.
    pub fn from_record(record: &MovieRecord) -> Self {
        MovieDraft {
            title: record.title.clone(),
            rating: record
                .rating
                .clone()
                .and_then(LooseField::into_text)
                .unwrap_or_default(),
            genre: record.genre.clone().unwrap_or_default(),
            release_year: record
                .release_year
                .clone()
                .and_then(LooseField::into_text)
                .unwrap_or_default(),
            language: record.language.clone().unwrap_or_default(),
            description: record.description.clone().unwrap_or_default(),
            poster_url: record.poster_url.clone().unwrap_or_default(),
            trailer_url: record.trailer_url.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<(), CarouselError> {
        if self.title.trim().is_empty() {
            return Err(CarouselError::Catalog("movie title is required".to_string()));
        }
        Ok(())
    }
}

/// Account details pushed to `/auth/sync` after sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

/// Calls the client makes against the backend API.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogRequest {
    ListMovies,
    CreateMovie(MovieDraft),
    UpdateMovie { id: i64, draft: MovieDraft },
    DeleteMovie { id: i64 },
    Login { username: String, password: String },
    FirebaseConfig,
    SyncUser(UserProfile),
}

impl CatalogRequest {
    pub fn method(&self) -> &'static str {
        match self {
            CatalogRequest::ListMovies | CatalogRequest::FirebaseConfig => "GET",
            CatalogRequest::CreateMovie(_)
            | CatalogRequest::Login { .. }
            | CatalogRequest::SyncUser(_) => "POST",
            CatalogRequest::UpdateMovie { .. } => "PUT",
            CatalogRequest::DeleteMovie { .. } => "DELETE",
        }
    }

    /// Path relative to the API base, leading slash included.
    pub fn path(&self) -> String {
        match self {
            CatalogRequest::ListMovies | CatalogRequest::CreateMovie(_) => "/movies".to_string(),
            CatalogRequest::UpdateMovie { id, .. } | CatalogRequest::DeleteMovie { id } => {
                format!("/movies/{id}")
            }
            CatalogRequest::Login { .. } => "/login".to_string(),
            CatalogRequest::FirebaseConfig => "/config/firebase".to_string(),
            CatalogRequest::SyncUser(_) => "/auth/sync".to_string(),
        }
    }

    pub fn url(&self, api_base: &str) -> String {
        format!("{}{}", api_base.trim_end_matches('/'), self.path())
    }

    /// Calls answered with an `ApiResponse` envelope, even on error statuses.
    pub fn returns_envelope(&self) -> bool {
        matches!(
            self,
            CatalogRequest::CreateMovie(_)
                | CatalogRequest::UpdateMovie { .. }
                | CatalogRequest::DeleteMovie { .. }
                | CatalogRequest::Login { .. }
        )
    }

    /// Decide what a finished HTTP exchange yields. A failed status is an error,
    /// unless the call speaks the envelope and the server sent one: then the body
    /// is returned so its `message` reaches the user.
    pub fn resolve_response(
        &self,
        status: u16,
        status_text: &str,
        body: String,
    ) -> Result<String, CarouselError> {
        if (200..300).contains(&status) {
            return Ok(body);
        }
        if self.returns_envelope() && serde_json::from_str::<ApiResponse>(&body).is_ok() {
            return Ok(body);
        }
        Err(CarouselError::Network(format!(
            "{status} {status_text} from {}",
            self.path()
        )))
    }

    /// JSON body, if the call carries one.
    pub fn body(&self) -> Result<Option<String>, CarouselError> {
        let body = match self {
            CatalogRequest::CreateMovie(draft) | CatalogRequest::UpdateMovie { draft, .. } => {
                draft.validate()?;
                Some(serde_json::to_string(draft)?)
            }
            CatalogRequest::Login { username, password } => Some(serde_json::to_string(
                &serde_json::json!({ "username": username, "password": password }),
            )?),
            CatalogRequest::SyncUser(profile) => Some(serde_json::to_string(profile)?),
            CatalogRequest::ListMovies
            | CatalogRequest::DeleteMovie { .. }
            | CatalogRequest::FirebaseConfig => None,
        };
        Ok(body)
    }
}

/// `{ success, message }` envelope returned by mutating endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiResponse {
    pub fn into_result(self) -> Result<(), CarouselError> {
        if self.success {
            Ok(())
        } else {
            Err(CarouselError::Network(
                self.message
                    .unwrap_or_else(|| "request rejected by server".to_string()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_missing_fields() {
        let movies = parse_catalog(
            r#"[{"title":"Dune","genre":"Sci-Fi","poster_url":"dune.jpg","trailer_url":"dune.mp4"}]"#,
        )
        .unwrap();

        let dune = &movies[0];
        assert_eq!(dune.rating, DEFAULT_RATING);
        assert_eq!(dune.description, DEFAULT_DESCRIPTION);
        assert_eq!(dune.cover, "dune.jpg");
        // Character art falls back to the poster.
        assert_eq!(dune.character, "dune.jpg");
        assert!(dune.cast.is_empty());
    }

    #[test]
    fn missing_poster_uses_placeholders() {
        let movie = Movie::from_record(MovieRecord {
            title: "Untitled".to_string(),
            ..Default::default()
        });
        assert_eq!(movie.cover, DEFAULT_COVER);
        assert_eq!(movie.character, DEFAULT_CHARACTER);
        assert!(!movie.has_trailer());
    }

    #[test]
    fn numeric_rating_is_kept_as_text() {
        let movies = parse_catalog(r#"[{"title":"Heat","rating":8.3}]"#).unwrap();
        assert_eq!(movies[0].rating, "8.3");
    }

    #[test]
    fn cast_string_is_decoded() {
        let movies =
            parse_catalog(r#"[{"title":"Heat","cast":"[\"Pacino\",\"De Niro\"]"}]"#).unwrap();
        assert_eq!(movies[0].cast.len(), 2);
        assert_eq!(movies[0].cast[0], Value::String("Pacino".to_string()));
    }

    #[test]
    fn malformed_cast_falls_back_to_empty() {
        let movies = parse_catalog(r#"[{"title":"Heat","cast":"[not json"}]"#).unwrap();
        assert!(movies[0].cast.is_empty());
    }

    #[test]
    fn preserves_server_order() {
        let movies =
            parse_catalog(r#"[{"title":"B"},{"title":"A"},{"title":"C"}]"#).unwrap();
        let titles: Vec<&str> = movies.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A", "C"]);
    }

    #[test]
    fn empty_catalog_is_not_an_error() {
        assert!(parse_catalog("[]").unwrap().is_empty());
    }

    #[test]
    fn non_array_body_is_rejected() {
        let err = parse_catalog(r#"{"error":"db down"}"#).unwrap_err();
        assert!(matches!(err, CarouselError::Catalog(_)));
    }

    #[test]
    fn primary_genre_takes_first_segment() {
        let movie = Movie::from_record(MovieRecord {
            title: "Alien".to_string(),
            genre: Some("Horror / Sci-Fi".to_string()),
            ..Default::default()
        });
        assert_eq!(movie.primary_genre().as_deref(), Some("horror"));
    }

    #[test]
    fn request_routes() {
        let update = CatalogRequest::UpdateMovie {
            id: 12,
            draft: MovieDraft {
                title: "Heat".to_string(),
                ..Default::default()
            },
        };
        assert_eq!(update.method(), "PUT");
        assert_eq!(
            update.url("http://localhost:3000/api/"),
            "http://localhost:3000/api/movies/12"
        );
        assert!(update.body().unwrap().unwrap().contains("\"title\":\"Heat\""));

        assert_eq!(CatalogRequest::DeleteMovie { id: 3 }.method(), "DELETE");
        assert_eq!(CatalogRequest::FirebaseConfig.path(), "/config/firebase");
        assert!(CatalogRequest::ListMovies.body().unwrap().is_none());
    }

    #[test]
    fn draft_without_title_is_refused() {
        let create = CatalogRequest::CreateMovie(MovieDraft::default());
        assert!(create.body().is_err());
    }

    #[test]
    fn sync_user_uses_firebase_field_names() {
        let body = CatalogRequest::SyncUser(UserProfile {
            uid: "u1".to_string(),
            email: Some("a@b.c".to_string()),
            display_name: None,
            photo_url: Some("p.png".to_string()),
        })
        .body()
        .unwrap()
        .unwrap();
        assert!(body.contains("\"displayName\":null"));
        assert!(body.contains("\"photoURL\":\"p.png\""));
    }

    #[test]
    fn api_response_failure_carries_message() {
        let resp: ApiResponse =
            serde_json::from_str(r#"{"success":false,"message":"Invalid credentials"}"#).unwrap();
        let err = resp.into_result().unwrap_err();
        assert!(err.to_string().contains("Invalid credentials"));
    }

    #[test]
    fn rejected_login_keeps_server_message() {
        let login = CatalogRequest::Login {
            username: "admin".to_string(),
            password: "wrong".to_string(),
        };
        let body = login
            .resolve_response(
                401,
                "Unauthorized",
                r#"{"success":false,"message":"Invalid credentials"}"#.to_string(),
            )
            .unwrap();
        let resp: ApiResponse = serde_json::from_str(&body).unwrap();
        let err = resp.into_result().unwrap_err();
        assert!(err.to_string().contains("Invalid credentials"));
    }

    #[test]
    fn failed_status_without_envelope_is_network_error() {
        let delete = CatalogRequest::DeleteMovie { id: 3 };
        let err = delete
            .resolve_response(502, "Bad Gateway", "<html>".to_string())
            .unwrap_err();
        assert!(matches!(err, CarouselError::Network(ref m) if m.contains("502")));

        let list = CatalogRequest::ListMovies;
        assert!(list
            .resolve_response(500, "Internal Server Error", r#"{"success":false}"#.to_string())
            .is_err());
        assert_eq!(
            list.resolve_response(200, "OK", "[]".to_string()).unwrap(),
            "[]"
        );
    }

    #[test]
    fn edit_form_prefills_from_record() {
        let record: MovieRecord = serde_json::from_str(
            r#"{"movie_id":4,"title":"Heat","rating":8.3,"release_year":1995,"language":"English"}"#,
        )
        .unwrap();
        let draft = MovieDraft::from_record(&record);
        assert_eq!(draft.release_year, "1995");
        assert_eq!(draft.rating, "8.3");
        assert_eq!(draft.language, "English");
    }
}
