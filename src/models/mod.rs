use serde::{Deserialize, Serialize};

pub mod profile;

pub use profile::{Mood, Tag, TagKind, TagOrigin, UserProfile};

/// Canonical movie record used everywhere inside the service
///
/// The catalog returns two wire shapes (list endpoints carry bare genre ids,
/// detail endpoints carry embedded genre records); both are normalized into
/// this one type at ingestion so downstream logic never branches on shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    pub genre_ids: Vec<u64>,
}

/// A catalog genre from the static reference list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Raw movie record as returned by TMDB
///
/// List endpoints (popular, search, discover) populate `genre_ids`; the
/// detail endpoint populates `genres` instead. Either may be missing on
/// malformed rows, which normalizes to an empty id list.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genre_ids: Option<Vec<u64>>,
    #[serde(default)]
    pub genres: Option<Vec<TmdbGenre>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub id: u64,
    pub name: String,
}

/// Paged list envelope shared by all TMDB list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[allow(dead_code)] // Page echo; useful when paging logic grows
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

/// Genre reference list envelope from /genre/movie/list
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenreList {
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
}

impl From<TmdbMovie> for Movie {
    fn from(raw: TmdbMovie) -> Self {
        // Prefer the bare id list; fall back to embedded genre records
        let mut genre_ids: Vec<u64> = match (raw.genre_ids, raw.genres) {
            (Some(ids), _) => ids,
            (None, Some(genres)) => genres.into_iter().map(|g| g.id).collect(),
            (None, None) => Vec::new(),
        };

        // A movie carries each genre id at most once
        let mut seen = std::collections::HashSet::new();
        genre_ids.retain(|id| seen.insert(*id));

        Movie {
            id: raw.id,
            title: raw.title,
            poster_path: raw.poster_path,
            genre_ids,
        }
    }
}

impl From<TmdbGenre> for Genre {
    fn from(raw: TmdbGenre) -> Self {
        Genre {
            id: raw.id,
            name: raw.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmdb_movie_with_genre_ids() {
        let json = r#"{
            "id": 27205,
            "title": "Inception",
            "poster_path": "/inception.jpg",
            "genre_ids": [28, 878, 12]
        }"#;

        let raw: TmdbMovie = serde_json::from_str(json).unwrap();
        let movie: Movie = raw.into();
        assert_eq!(movie.id, 27205);
        assert_eq!(movie.title, "Inception");
        assert_eq!(movie.poster_path, Some("/inception.jpg".to_string()));
        assert_eq!(movie.genre_ids, vec![28, 878, 12]);
    }

    #[test]
    fn test_tmdb_movie_with_embedded_genres() {
        let json = r#"{
            "id": 278,
            "title": "The Shawshank Redemption",
            "poster_path": null,
            "genres": [
                {"id": 18, "name": "Drama"},
                {"id": 80, "name": "Crime"}
            ]
        }"#;

        let raw: TmdbMovie = serde_json::from_str(json).unwrap();
        let movie: Movie = raw.into();
        assert_eq!(movie.id, 278);
        assert_eq!(movie.poster_path, None);
        assert_eq!(movie.genre_ids, vec![18, 80]);
    }

    #[test]
    fn test_tmdb_movie_without_genre_data() {
        let json = r#"{"id": 1, "title": "Bare"}"#;

        let raw: TmdbMovie = serde_json::from_str(json).unwrap();
        let movie: Movie = raw.into();
        assert!(movie.genre_ids.is_empty());
    }

    #[test]
    fn test_tmdb_movie_duplicate_genre_ids_collapse() {
        let raw = TmdbMovie {
            id: 7,
            title: "Glitch".to_string(),
            poster_path: None,
            genre_ids: Some(vec![18, 18, 35, 18]),
            genres: None,
        };

        let movie: Movie = raw.into();
        assert_eq!(movie.genre_ids, vec![18, 35]);
    }

    #[test]
    fn test_tmdb_page_defaults() {
        let page: TmdbPage = serde_json::from_str("{}").unwrap();
        assert_eq!(page.page, 0);
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_movie_serde_round_trip() {
        let movie = Movie {
            id: 603,
            title: "The Matrix".to_string(),
            poster_path: Some("/matrix.jpg".to_string()),
            genre_ids: vec![28, 878],
        };

        let json = serde_json::to_string(&movie).unwrap();
        let back: Movie = serde_json::from_str(&json).unwrap();
        assert_eq!(back, movie);
    }
}
