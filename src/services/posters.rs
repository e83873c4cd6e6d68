/// Poster URL derivation
///
/// Pure utility, no network involved: joins the image CDN base, a size
/// preset and the catalog's poster path. Absent paths resolve to a local
/// placeholder asset.
use std::fmt::Display;

const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
const PLACEHOLDER_POSTER: &str = "/assets/poster-placeholder.png";

/// TMDB poster size presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PosterSize {
    W92,
    W154,
    W185,
    /// Medium preset, the default for list views
    #[default]
    W342,
    W500,
    W780,
    Original,
}

impl Display for PosterSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            PosterSize::W92 => "w92",
            PosterSize::W154 => "w154",
            PosterSize::W185 => "w185",
            PosterSize::W342 => "w342",
            PosterSize::W500 => "w500",
            PosterSize::W780 => "w780",
            PosterSize::Original => "original",
        };
        write!(f, "{}", token)
    }
}

/// Builds a fully-qualified poster URL, or the placeholder when the
/// catalog has no poster path
pub fn poster_url(path: Option<&str>, size: Option<PosterSize>) -> String {
    match path {
        Some(path) => format!(
            "{}/{}{}",
            IMAGE_BASE_URL,
            size.unwrap_or_default(),
            path
        ),
        None => PLACEHOLDER_POSTER.to_string(),
    }
}
