use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{Genre, Mood, Movie, Tag, TagKind, TagOrigin, UserProfile};
use crate::services::{derive, posters};

use super::AppState;

// Request/Response types

/// Movie payload for preference mutations
///
/// Accepts the canonical shape; missing poster/genre data normalizes to
/// empty rather than rejecting the request.
#[derive(Debug, Deserialize)]
pub struct AddMovieRequest {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
}

impl From<AddMovieRequest> for Movie {
    fn from(request: AddMovieRequest) -> Self {
        Movie {
            id: request.id,
            title: request.title,
            poster_path: request.poster_path,
            genre_ids: request.genre_ids,
        }
    }
}

/// Movie payload returned by catalog and recommendation endpoints
///
/// Carries the ready-to-render poster URL alongside the raw path, so
/// clients never rebuild image URLs themselves.
#[derive(Debug, Serialize)]
pub struct MovieResponse {
    pub id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    pub poster_url: String,
    pub genre_ids: Vec<u64>,
}

impl From<Movie> for MovieResponse {
    fn from(movie: Movie) -> Self {
        let poster_url = posters::poster_url(movie.poster_path.as_deref(), None);
        Self {
            id: movie.id,
            title: movie.title,
            poster_path: movie.poster_path,
            poster_url,
            genre_ids: movie.genre_ids,
        }
    }
}

fn movie_responses(movies: Vec<Movie>) -> Vec<MovieResponse> {
    movies.into_iter().map(MovieResponse::from).collect()
}

#[derive(Debug, Deserialize)]
pub struct AddTagRequest {
    pub id: String,
    pub name: String,
    #[serde(default = "default_tag_origin")]
    pub origin: TagOrigin,
    #[serde(default = "default_tag_kind")]
    pub kind: TagKind,
}

fn default_tag_origin() -> TagOrigin {
    TagOrigin::Manual
}

fn default_tag_kind() -> TagKind {
    TagKind::Genre
}

impl From<AddTagRequest> for Tag {
    fn from(request: AddTagRequest) -> Self {
        Tag {
            id: request.id,
            name: request.name,
            origin: request.origin,
            kind: request.kind,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetMoodRequest {
    pub mood: Mood,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    page: Option<u32>,
}

impl PageQuery {
    fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

#[derive(Debug, Deserialize)]
pub struct MoodPageQuery {
    /// Overrides the profile mood when present; unrecognized values
    /// degrade to an unfiltered query
    #[serde(default)]
    mood: Option<String>,
    #[serde(default)]
    page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
    #[serde(default)]
    page: Option<u32>,
}

// Profile handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Current profile snapshot
pub async fn get_profile(State(state): State<AppState>) -> Json<UserProfile> {
    Json(state.store.snapshot().await)
}

/// Reset the profile and discard persisted state
pub async fn clear_profile(State(state): State<AppState>) -> StatusCode {
    state.store.clear().await;
    StatusCode::NO_CONTENT
}

pub async fn add_liked(
    State(state): State<AppState>,
    Json(request): Json<AddMovieRequest>,
) -> StatusCode {
    state.store.add_liked(request.into()).await;
    StatusCode::OK
}

pub async fn remove_liked(State(state): State<AppState>, Path(id): Path<u64>) -> StatusCode {
    state.store.remove_liked(id).await;
    StatusCode::OK
}

pub async fn add_disliked(
    State(state): State<AppState>,
    Json(request): Json<AddMovieRequest>,
) -> StatusCode {
    state.store.add_disliked(request.into()).await;
    StatusCode::OK
}

pub async fn remove_disliked(State(state): State<AppState>, Path(id): Path<u64>) -> StatusCode {
    state.store.remove_disliked(id).await;
    StatusCode::OK
}

pub async fn add_avoided(
    State(state): State<AppState>,
    Json(request): Json<AddMovieRequest>,
) -> StatusCode {
    state.store.add_avoided(request.into()).await;
    StatusCode::OK
}

pub async fn remove_avoided(State(state): State<AppState>, Path(id): Path<u64>) -> StatusCode {
    state.store.remove_avoided(id).await;
    StatusCode::OK
}

pub async fn add_tag(
    State(state): State<AppState>,
    Json(request): Json<AddTagRequest>,
) -> StatusCode {
    state.store.add_tag(request.into()).await;
    StatusCode::OK
}

pub async fn remove_tag(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    state.store.remove_tag(&id).await;
    StatusCode::OK
}

pub async fn set_mood(
    State(state): State<AppState>,
    Json(request): Json<SetMoodRequest>,
) -> StatusCode {
    state.store.set_mood(request.mood).await;
    StatusCode::OK
}

/// Auto tags derived from the liked set's genre frequency
pub async fn auto_tags(State(state): State<AppState>) -> Json<Vec<Tag>> {
    let snapshot = state.store.snapshot().await;
    let genres = state.genres().await;
    Json(derive::derive_tags(&snapshot.liked, &genres))
}

// Recommendation handlers

/// Ranked recommendations from the profile's tags and exclusion sets
pub async fn recommendations(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> Json<Vec<MovieResponse>> {
    let snapshot = state.store.snapshot().await;
    let movies = derive::derive_recommendations(
        state.catalog.as_ref(),
        &snapshot.tags,
        &snapshot.liked_ids(),
        &snapshot.disliked_ids(),
        &snapshot.avoided_ids(),
        params.page(),
    )
    .await;
    Json(movie_responses(movies))
}

/// Mood-based discover candidates
///
/// The query's `mood` overrides the profile mood; a value the service does
/// not recognize degrades to an unfiltered discovery query.
pub async fn mood_recommendations(
    State(state): State<AppState>,
    Query(params): Query<MoodPageQuery>,
) -> Json<Vec<MovieResponse>> {
    let mood = match &params.mood {
        Some(raw) => Mood::parse(raw),
        None => state.store.snapshot().await.mood,
    };
    let page = params.page.unwrap_or(1).max(1);
    let movies = derive::mood_candidates(state.catalog.as_ref(), mood, page).await;
    Json(movie_responses(movies))
}

// Catalog passthrough handlers
//
// Catalog failures surface as empty lists here, never as error responses;
// the UI always has something to render.

pub async fn popular_movies(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> Json<Vec<MovieResponse>> {
    let movies = state
        .catalog
        .fetch_popular(params.page())
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Popular fetch failed, degrading to empty");
            Vec::new()
        });
    Json(movie_responses(movies))
}

pub async fn search_movies(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<MovieResponse>> {
    let page = params.page.unwrap_or(1).max(1);
    let movies = state
        .catalog
        .search(&params.q, page)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, query = %params.q, "Search failed, degrading to empty");
            Vec::new()
        });
    Json(movie_responses(movies))
}

pub async fn movie_details(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<MovieResponse>> {
    let movie = match state.catalog.fetch_details(id).await {
        Ok(movie) => movie,
        Err(e) => {
            tracing::warn!(error = %e, movie_id = id, "Details fetch failed, treating as absent");
            None
        }
    };
    movie
        .map(|m| Json(m.into()))
        .ok_or_else(|| AppError::NotFound(format!("Movie {} not in catalog", id)))
}

pub async fn similar_movies(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Json<Vec<MovieResponse>> {
    let movies = state
        .catalog
        .fetch_recommendations_for(id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, movie_id = id, "Similar fetch failed, degrading to empty");
            Vec::new()
        });
    Json(movie_responses(movies))
}

pub async fn list_genres(State(state): State<AppState>) -> Json<Vec<Genre>> {
    Json(state.genres().await)
}
