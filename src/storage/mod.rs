use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::UserProfile;

/// Durable storage of the profile blob
///
/// The store treats this as an opaque load/save collaborator; backends only
/// need whole-value reads and writes. Save failures are surfaced to the
/// caller but never invalidate the in-memory profile.
#[async_trait::async_trait]
pub trait ProfileStorage: Send + Sync {
    /// Loads the persisted profile, or None if nothing was ever saved
    async fn load(&self) -> AppResult<Option<UserProfile>>;

    /// Persists the full profile, replacing any previous blob
    async fn save(&self, profile: &UserProfile) -> AppResult<()>;

    /// Discards the persisted blob; no-op if nothing was saved
    async fn clear(&self) -> AppResult<()>;
}

/// On-disk envelope around the profile
///
/// The stamp lives outside the profile so load(save(p)) == p holds exactly.
#[derive(Debug, Serialize, Deserialize)]
struct StoredProfile {
    saved_at: DateTime<Utc>,
    profile: UserProfile,
}

/// JSON-file backed storage
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write never leaves a torn blob behind.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[async_trait::async_trait]
impl ProfileStorage for JsonFileStorage {
    async fn load(&self) -> AppResult<Option<UserProfile>> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredProfile = serde_json::from_str(&json)
            .map_err(|e| AppError::Storage(format!("Corrupt profile blob: {}", e)))?;

        tracing::debug!(
            path = %self.path.display(),
            saved_at = %stored.saved_at,
            "Loaded persisted profile"
        );

        Ok(Some(stored.profile))
    }

    async fn save(&self, profile: &UserProfile) -> AppResult<()> {
        let stored = StoredProfile {
            saved_at: Utc::now(),
            profile: profile.clone(),
        };
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| AppError::Storage(format!("Profile serialization error: {}", e)))?;

        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage for ephemeral sessions and tests
#[derive(Default)]
pub struct MemoryStorage {
    blob: Mutex<Option<UserProfile>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProfileStorage for MemoryStorage {
    async fn load(&self) -> AppResult<Option<UserProfile>> {
        Ok(self.blob.lock().unwrap().clone())
    }

    async fn save(&self, profile: &UserProfile) -> AppResult<()> {
        *self.blob.lock().unwrap() = Some(profile.clone());
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        *self.blob.lock().unwrap() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Mood, Movie, Tag};

    fn populated_profile() -> UserProfile {
        let mut profile = UserProfile::new();
        profile.add_liked(Movie {
            id: 603,
            title: "The Matrix".to_string(),
            poster_path: Some("/matrix.jpg".to_string()),
            genre_ids: vec![28, 878],
        });
        profile.add_avoided(Movie {
            id: 8,
            title: "Skip Me".to_string(),
            poster_path: None,
            genre_ids: vec![],
        });
        profile.add_tag(Tag::auto_genre(28, "Action"));
        profile.set_mood(Mood::Excited);
        profile
    }

    fn scratch_file() -> PathBuf {
        std::env::temp_dir().join(format!("cinemood-test-{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_file_storage_round_trip() {
        let path = scratch_file();
        let storage = JsonFileStorage::new(&path);
        let profile = populated_profile();

        storage.save(&profile).await.unwrap();
        let loaded = storage.load().await.unwrap();
        assert_eq!(loaded, Some(profile));

        storage.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_storage_load_missing_is_none() {
        let storage = JsonFileStorage::new(scratch_file());
        assert_eq!(storage.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_storage_clear_is_idempotent() {
        let path = scratch_file();
        let storage = JsonFileStorage::new(&path);

        storage.save(&populated_profile()).await.unwrap();
        storage.clear().await.unwrap();
        storage.clear().await.unwrap();
        assert_eq!(storage.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        let profile = populated_profile();

        assert_eq!(storage.load().await.unwrap(), None);
        storage.save(&profile).await.unwrap();
        assert_eq!(storage.load().await.unwrap(), Some(profile));
        storage.clear().await.unwrap();
        assert_eq!(storage.load().await.unwrap(), None);
    }
}
