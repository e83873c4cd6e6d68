use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::models::Genre;
use crate::services::providers::CatalogProvider;
use crate::store::PreferenceStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: PreferenceStore,
    pub catalog: Arc<dyn CatalogProvider>,
    /// Genre reference list, fetched once per session
    genres: Arc<OnceCell<Vec<Genre>>>,
}

impl AppState {
    pub fn new(store: PreferenceStore, catalog: Arc<dyn CatalogProvider>) -> Self {
        Self {
            store,
            catalog,
            genres: Arc::new(OnceCell::new()),
        }
    }

    /// Returns the session's genre reference list
    ///
    /// Fetched from the catalog on first use and cached for the session.
    /// A fetch failure degrades to an empty list and is retried on the
    /// next call instead of being cached.
    pub async fn genres(&self) -> Vec<Genre> {
        match self
            .genres
            .get_or_try_init(|| self.catalog.fetch_genres())
            .await
        {
            Ok(genres) => genres.clone(),
            Err(e) => {
                tracing::warn!(error = %e, "Genre list fetch failed, degrading to empty");
                Vec::new()
            }
        }
    }
}
