/// TMDB catalog provider
///
/// Thin client over the TMDB v3 REST API. All list endpoints share the
/// same paged envelope, so one helper does the request/decode work and the
/// trait methods just pick a path and query parameters.
use reqwest::{Client as HttpClient, StatusCode};

use crate::{
    error::{AppError, AppResult},
    models::{Genre, Movie, TmdbGenreList, TmdbMovie, TmdbPage},
    services::providers::CatalogProvider,
};

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }

    /// Joins genre ids into TMDB's comma-separated `with_genres` value
    fn join_genre_ids(genre_ids: &[u64]) -> String {
        genre_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Fetches one paged movie list and normalizes the results
    async fn fetch_movie_page(
        &self,
        path: &str,
        extra_params: &[(&str, String)],
    ) -> AppResult<Vec<Movie>> {
        let url = format!("{}{}", self.api_url, path);

        let mut params: Vec<(&str, String)> = vec![("api_key", self.api_key.clone())];
        params.extend_from_slice(extra_params);

        let response = self.http_client.get(&url).query(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Catalog(format!(
                "TMDB returned status {}: {}",
                status, body
            )));
        }

        let page: TmdbPage = response
            .json()
            .await
            .map_err(|e| AppError::Catalog(format!("Failed to parse TMDB response: {}", e)))?;

        Ok(page.results.into_iter().map(Movie::from).collect())
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn fetch_popular(&self, page: u32) -> AppResult<Vec<Movie>> {
        let movies = self
            .fetch_movie_page("/movie/popular", &[("page", page.to_string())])
            .await?;

        tracing::info!(page, results = movies.len(), "Popular movies fetched");
        Ok(movies)
    }

    async fn search(&self, query: &str, page: u32) -> AppResult<Vec<Movie>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let movies = self
            .fetch_movie_page(
                "/search/movie",
                &[
                    ("query", query.to_string()),
                    ("page", page.to_string()),
                ],
            )
            .await?;

        tracing::info!(query = %query, results = movies.len(), "Movie search completed");
        Ok(movies)
    }

    async fn fetch_details(&self, id: u64) -> AppResult<Option<Movie>> {
        let url = format!("{}/movie/{}", self.api_url, id);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Catalog(format!(
                "TMDB returned status {}: {}",
                status, body
            )));
        }

        let raw: TmdbMovie = response
            .json()
            .await
            .map_err(|e| AppError::Catalog(format!("Failed to parse TMDB response: {}", e)))?;

        Ok(Some(raw.into()))
    }

    async fn fetch_genres(&self) -> AppResult<Vec<Genre>> {
        let url = format!("{}/genre/movie/list", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Catalog(format!(
                "TMDB returned status {}: {}",
                status, body
            )));
        }

        let list: TmdbGenreList = response
            .json()
            .await
            .map_err(|e| AppError::Catalog(format!("Failed to parse TMDB response: {}", e)))?;

        let genres: Vec<Genre> = list.genres.into_iter().map(Genre::from).collect();

        tracing::info!(genres = genres.len(), "Genre reference list fetched");
        Ok(genres)
    }

    async fn fetch_by_genres(&self, genre_ids: &[u64], page: u32) -> AppResult<Vec<Movie>> {
        let mut params = vec![
            ("sort_by", "popularity.desc".to_string()),
            ("page", page.to_string()),
        ];
        if !genre_ids.is_empty() {
            params.push(("with_genres", Self::join_genre_ids(genre_ids)));
        }

        let movies = self.fetch_movie_page("/discover/movie", &params).await?;

        tracing::info!(
            genre_ids = ?genre_ids,
            page,
            results = movies.len(),
            "Discover query completed"
        );
        Ok(movies)
    }

    async fn fetch_recommendations_for(&self, id: u64) -> AppResult<Vec<Movie>> {
        let movies = self
            .fetch_movie_page(
                &format!("/movie/{}/recommendations", id),
                &[("page", "1".to_string())],
            )
            .await?;

        tracing::info!(movie_id = id, results = movies.len(), "Catalog recommendations fetched");
        Ok(movies)
    }
}
