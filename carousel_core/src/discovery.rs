// Title search and genre-based recommendations over the loaded catalog.

use crate::catalog::Movie;

pub const DEFAULT_RECOMMENDATIONS: usize = 10;

/// Indices of movies whose title contains `query`, case-insensitively.
/// A blank query matches nothing.
pub fn search(movies: &[Movie], query: &str) -> Vec<usize> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    movies
        .iter()
        .enumerate()
        .filter(|(_, m)| m.title.to_lowercase().contains(&query))
        .map(|(i, _)| i)
        .collect()
}

/// First match for an Enter-key search. `None` means "not found".
pub fn first_match(movies: &[Movie], query: &str) -> Option<usize> {
    search(movies, query).into_iter().next()
}

/// Exact title lookup.
pub fn find_by_title(movies: &[Movie], title: &str) -> Option<usize> {
    movies.iter().position(|m| m.title == title)
}

/// Up to `limit` movies sharing `base`'s primary genre, topped up with the rest
/// of the catalog in order. `base` itself is never recommended.
pub fn recommendations(movies: &[Movie], base: Option<&Movie>, limit: usize) -> Vec<usize> {
    let excluded = |m: &Movie| base.is_some_and(|b| b.title == m.title);
    let mut picks: Vec<usize> = Vec::with_capacity(limit);

    if let Some(genre) = base.and_then(Movie::primary_genre) {
        picks.extend(
            movies
                .iter()
                .enumerate()
                .filter(|(_, m)| !excluded(*m) && m.genre.to_lowercase().contains(&genre))
                .map(|(i, _)| i)
                .take(limit),
        );
    }

    if picks.len() < limit {
        let fill: Vec<usize> = movies
            .iter()
            .enumerate()
            .filter(|(i, m)| !excluded(*m) && !picks.contains(i))
            .map(|(i, _)| i)
            .take(limit - picks.len())
            .collect();
        picks.extend(fill);
    }

    picks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MovieRecord;

    fn movie(title: &str, genre: &str) -> Movie {
        Movie::from_record(MovieRecord {
            title: title.to_string(),
            genre: Some(genre.to_string()),
            ..Default::default()
        })
    }

    fn catalog() -> Vec<Movie> {
        vec![
            movie("Alien", "Horror / Sci-Fi"),
            movie("Heat", "Crime"),
            movie("The Thing", "Horror"),
            movie("Arrival", "Sci-Fi"),
            movie("Halloween", "horror"),
        ]
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let movies = catalog();
        assert_eq!(search(&movies, "  THE "), vec![2]);
        assert_eq!(search(&movies, "a"), vec![0, 1, 3, 4]);
        assert!(search(&movies, "   ").is_empty());
        assert_eq!(first_match(&movies, "hal"), Some(4));
        assert_eq!(first_match(&movies, "zzz"), None);
    }

    #[test]
    fn recommends_same_genre_first() {
        let movies = catalog();
        let recs = recommendations(&movies, Some(&movies[0]), 3);
        assert_eq!(recs, vec![2, 4, 1]);
    }

    #[test]
    fn without_base_lists_catalog_in_order() {
        let movies = catalog();
        assert_eq!(recommendations(&movies, None, 10), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn never_recommends_base_or_duplicates() {
        let movies = catalog();
        let recs = recommendations(&movies, Some(&movies[2]), DEFAULT_RECOMMENDATIONS);
        assert!(!recs.contains(&2));
        let mut sorted = recs.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), recs.len());
        assert_eq!(recs.len(), 4);
    }

    #[test]
    fn exact_title_lookup() {
        let movies = catalog();
        assert_eq!(find_by_title(&movies, "Heat"), Some(1));
        assert_eq!(find_by_title(&movies, "heat"), None);
    }
}
