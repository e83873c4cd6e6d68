/// Recommendation Deriver
///
/// Stateless transformations from a profile snapshot plus catalog data to
/// derived artifacts: auto tags from genre frequency, mood-based discover
/// candidates, and the tag/exclusion-filtered recommendation list. Catalog
/// failures are recovered here by degrading to empty results; nothing on
/// this path propagates an error to the caller.
use std::collections::HashMap;

use crate::models::{Genre, Mood, Movie, Tag};
use crate::services::providers::CatalogProvider;

/// A discover-style catalog query, always popularity descending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverQuery {
    pub genre_ids: Vec<u64>,
    pub page: u32,
}

/// Derives auto genre tags from a movie collection
///
/// Genre ids are counted once per movie and ranked by descending frequency;
/// ties keep first-encounter order. Names resolve through the reference
/// list, falling back to "Unknown Genre".
pub fn derive_tags(movies: &[Movie], genres: &[Genre]) -> Vec<Tag> {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    let mut order: Vec<u64> = Vec::new();

    for movie in movies {
        let mut seen = std::collections::HashSet::new();
        for &genre_id in &movie.genre_ids {
            // A movie contributes each genre id once, even on dirty data
            if !seen.insert(genre_id) {
                continue;
            }
            let count = counts.entry(genre_id).or_insert(0);
            if *count == 0 {
                order.push(genre_id);
            }
            *count += 1;
        }
    }

    // Stable sort: ties keep first-encounter order
    let mut ranked = order;
    ranked.sort_by(|a, b| counts[b].cmp(&counts[a]));

    ranked
        .into_iter()
        .map(|genre_id| {
            let name = genres
                .iter()
                .find(|g| g.id == genre_id)
                .map(|g| g.name.clone())
                .unwrap_or_else(|| "Unknown Genre".to_string());
            Tag::auto_genre(genre_id, name)
        })
        .collect()
}

/// Builds the discover query for a mood
///
/// An unset or unrecognized mood degrades to an unfiltered query rather
/// than failing.
pub fn mood_discover_query(mood: Option<Mood>, page: u32) -> DiscoverQuery {
    DiscoverQuery {
        genre_ids: mood.map(|m| m.genre_ids().to_vec()).unwrap_or_default(),
        page,
    }
}

/// Fetches mood-based candidates; catalog failure degrades to empty
pub async fn mood_candidates(
    provider: &dyn CatalogProvider,
    mood: Option<Mood>,
    page: u32,
) -> Vec<Movie> {
    let query = mood_discover_query(mood, page);
    match provider.fetch_by_genres(&query.genre_ids, query.page).await {
        Ok(movies) => movies,
        Err(e) => {
            tracing::warn!(error = %e, ?mood, "Mood candidate fetch failed, returning empty");
            Vec::new()
        }
    }
}

/// Derives the ranked recommendation list from tags and exclusion sets
///
/// Genre ids come from the numeric suffix of genre-kind tag ids; tags with
/// unparsable suffixes are dropped silently. With no genre signal and no
/// liked movies the cold-start path falls back to the popular listing.
/// Disliked and avoided ids are always filtered out client-side, since the
/// catalog has no concept of per-user exclusion.
pub async fn derive_recommendations(
    provider: &dyn CatalogProvider,
    tags: &[Tag],
    liked_ids: &[u64],
    disliked_ids: &[u64],
    avoided_ids: &[u64],
    page: u32,
) -> Vec<Movie> {
    let genre_ids: Vec<u64> = tags.iter().filter_map(Tag::genre_id).collect();

    let result = if genre_ids.is_empty() && liked_ids.is_empty() {
        provider.fetch_popular(page).await
    } else {
        provider.fetch_by_genres(&genre_ids, page).await
    };

    let movies = match result {
        Ok(movies) => movies,
        Err(e) => {
            tracing::warn!(error = %e, "Recommendation fetch failed, returning empty");
            Vec::new()
        }
    };

    movies
        .into_iter()
        .filter(|m| !disliked_ids.contains(&m.id) && !avoided_ids.contains(&m.id))
        .collect()
}
