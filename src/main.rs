use std::sync::Arc;

use cinemood_api::api::{create_router, AppState};
use cinemood_api::config::Config;
use cinemood_api::services::providers::TmdbProvider;
use cinemood_api::storage::JsonFileStorage;
use cinemood_api::store::PreferenceStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Restore the profile from disk and start the persistence writer
    let storage = Arc::new(JsonFileStorage::new(&config.profile_path));
    let (store, writer_handle) = PreferenceStore::restore(storage).await;

    let catalog = Arc::new(TmdbProvider::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));

    let state = AppState::new(store, catalog);

    // Warm the genre reference list; a failure here degrades and the
    // fetch is retried lazily on first use
    let genres = state.genres().await;
    tracing::info!(genres = genres.len(), "Genre reference list warmed");

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "cinemood API listening");
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Flush pending profile writes before exiting, even when the server
    // stopped with an error
    writer_handle.shutdown().await;
    served?;
    Ok(())
}

/// Resolves when the process receives ctrl-c, ending the session
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            // Without a signal listener the server just runs until killed
            tracing::warn!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
