use serde::{Deserialize, Serialize};

use super::Movie;

/// How a tag entered the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagOrigin {
    Auto,
    Manual,
}

/// What a tag describes
///
/// Only genre tags exist today; the enum leaves room for decade, director
/// and similar kinds without a wire-format break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum TagKind {
    Genre,
}

/// A preference tag, either user-entered or derived from genre frequency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Unique within the profile; auto genre tags use `genre-<genreId>`
    pub id: String,
    pub name: String,
    pub origin: TagOrigin,
    pub kind: TagKind,
}

impl Tag {
    /// Builds the auto genre tag for a genre id, with its reversible id
    pub fn auto_genre(genre_id: u64, name: impl Into<String>) -> Self {
        Tag {
            id: format!("genre-{}", genre_id),
            name: name.into(),
            origin: TagOrigin::Auto,
            kind: TagKind::Genre,
        }
    }

    /// Recovers the genre id from a genre-kind tag id, if it parses
    pub fn genre_id(&self) -> Option<u64> {
        match self.kind {
            TagKind::Genre => self.id.strip_prefix("genre-")?.parse().ok(),
        }
    }
}

/// The user's current viewing mood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Excited,
    Relaxed,
    Thoughtful,
    Tense,
}

impl Mood {
    /// Lenient parse for mood strings arriving over the wire
    ///
    /// Unrecognized values yield None so callers can degrade instead of
    /// rejecting the request.
    pub fn parse(s: &str) -> Option<Mood> {
        match s.to_ascii_lowercase().as_str() {
            "happy" => Some(Mood::Happy),
            "sad" => Some(Mood::Sad),
            "excited" => Some(Mood::Excited),
            "relaxed" => Some(Mood::Relaxed),
            "thoughtful" => Some(Mood::Thoughtful),
            "tense" => Some(Mood::Tense),
            _ => None,
        }
    }

    /// Fixed, ordered genre ids for each mood (TMDB genre ids)
    pub fn genre_ids(&self) -> &'static [u64] {
        match self {
            Mood::Happy => &[35, 10751],
            Mood::Sad => &[18, 10749],
            Mood::Excited => &[28, 12, 53],
            Mood::Relaxed => &[16, 10751, 35],
            Mood::Thoughtful => &[18, 99, 36],
            Mood::Tense => &[53, 9648, 27],
        }
    }
}

/// The canonical user preference state
///
/// Liked, disliked and avoided are pairwise disjoint by movie id; tag ids
/// are unique. Vectors keep insertion order so persisted profiles and
/// derived tag lists render deterministically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub liked: Vec<Movie>,
    pub disliked: Vec<Movie>,
    pub avoided: Vec<Movie>,
    pub tags: Vec<Tag>,
    pub mood: Option<Mood>,
}

impl UserProfile {
    /// Creates an empty profile
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a movie to the liked set, evicting it from the other two
    ///
    /// Returns whether the profile changed. Adding a movie already liked
    /// is a no-op.
    pub fn add_liked(&mut self, movie: Movie) -> bool {
        Self::add_to_set(&mut self.liked, movie, [&mut self.disliked, &mut self.avoided])
    }

    /// Removes a movie id from the liked set; no-op if absent
    pub fn remove_liked(&mut self, id: u64) -> bool {
        Self::remove_from_set(&mut self.liked, id)
    }

    /// Adds a movie to the disliked set, evicting it from the other two
    pub fn add_disliked(&mut self, movie: Movie) -> bool {
        Self::add_to_set(&mut self.disliked, movie, [&mut self.liked, &mut self.avoided])
    }

    /// Removes a movie id from the disliked set; no-op if absent
    pub fn remove_disliked(&mut self, id: u64) -> bool {
        Self::remove_from_set(&mut self.disliked, id)
    }

    /// Adds a movie to the avoided set, evicting it from the other two
    pub fn add_avoided(&mut self, movie: Movie) -> bool {
        Self::add_to_set(&mut self.avoided, movie, [&mut self.liked, &mut self.disliked])
    }

    /// Removes a movie id from the avoided set; no-op if absent
    pub fn remove_avoided(&mut self, id: u64) -> bool {
        Self::remove_from_set(&mut self.avoided, id)
    }

    /// Appends a tag; duplicate ids are ignored
    pub fn add_tag(&mut self, tag: Tag) -> bool {
        if self.tags.iter().any(|t| t.id == tag.id) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Removes the tag with the given id; no-op if absent
    pub fn remove_tag(&mut self, id: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t.id != id);
        self.tags.len() != before
    }

    /// Overwrites the current mood (last write wins)
    pub fn set_mood(&mut self, mood: Mood) -> bool {
        if self.mood == Some(mood) {
            return false;
        }
        self.mood = Some(mood);
        true
    }

    /// Resets to the empty profile
    pub fn clear(&mut self) -> bool {
        if *self == Self::default() {
            return false;
        }
        *self = Self::default();
        true
    }

    /// Movie ids in the liked set, in insertion order
    pub fn liked_ids(&self) -> Vec<u64> {
        self.liked.iter().map(|m| m.id).collect()
    }

    /// Movie ids in the disliked set, in insertion order
    pub fn disliked_ids(&self) -> Vec<u64> {
        self.disliked.iter().map(|m| m.id).collect()
    }

    /// Movie ids in the avoided set, in insertion order
    pub fn avoided_ids(&self) -> Vec<u64> {
        self.avoided.iter().map(|m| m.id).collect()
    }

    fn add_to_set(target: &mut Vec<Movie>, movie: Movie, others: [&mut Vec<Movie>; 2]) -> bool {
        if target.iter().any(|m| m.id == movie.id) {
            return false;
        }
        for other in others {
            other.retain(|m| m.id != movie.id);
        }
        target.push(movie);
        true
    }

    fn remove_from_set(set: &mut Vec<Movie>, id: u64) -> bool {
        let before = set.len();
        set.retain(|m| m.id != id);
        set.len() != before
    }
}
