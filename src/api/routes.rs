use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Profile
        .route("/profile", get(handlers::get_profile))
        .route("/profile", delete(handlers::clear_profile))
        .route("/profile/liked", post(handlers::add_liked))
        .route("/profile/liked/:id", delete(handlers::remove_liked))
        .route("/profile/disliked", post(handlers::add_disliked))
        .route("/profile/disliked/:id", delete(handlers::remove_disliked))
        .route("/profile/avoided", post(handlers::add_avoided))
        .route("/profile/avoided/:id", delete(handlers::remove_avoided))
        .route("/profile/tags", post(handlers::add_tag))
        .route("/profile/tags/auto", get(handlers::auto_tags))
        .route("/profile/tags/:id", delete(handlers::remove_tag))
        .route("/profile/mood", put(handlers::set_mood))
        // Recommendations
        .route("/recommendations", get(handlers::recommendations))
        .route("/recommendations/mood", get(handlers::mood_recommendations))
        // Catalog
        .route("/movies/popular", get(handlers::popular_movies))
        .route("/movies/search", get(handlers::search_movies))
        .route("/movies/:id", get(handlers::movie_details))
        .route("/movies/:id/similar", get(handlers::similar_movies))
        .route("/genres", get(handlers::list_genres))
}
