/// Movie catalog provider abstraction
///
/// This module provides a pluggable architecture for catalog backends
/// (TMDB today). Every operation may fail with a transport or payload
/// error; callers on the recommendation path recover by degrading to
/// empty results rather than propagating past the boundary.
use crate::{
    error::AppResult,
    models::{Genre, Movie},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie catalog backends
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Current popular movies, one page at a time (page >= 1)
    async fn fetch_popular(&self, page: u32) -> AppResult<Vec<Movie>>;

    /// Full-text title search
    ///
    /// A blank or whitespace-only query returns an empty list without
    /// touching the network.
    async fn search(&self, query: &str, page: u32) -> AppResult<Vec<Movie>>;

    /// Single movie by id; None when the catalog does not know it
    async fn fetch_details(&self, id: u64) -> AppResult<Option<Movie>>;

    /// Static genre reference list, fetched once per session by callers
    async fn fetch_genres(&self) -> AppResult<Vec<Genre>>;

    /// Discover movies filtered by genre ids, popularity descending
    ///
    /// An empty id slice means an unfiltered discovery query.
    async fn fetch_by_genres(&self, genre_ids: &[u64], page: u32) -> AppResult<Vec<Movie>>;

    /// Catalog-side recommendations seeded by a known movie
    async fn fetch_recommendations_for(&self, id: u64) -> AppResult<Vec<Movie>>;
}
