use std::sync::Arc;

use tokio::sync::{mpsc, watch, RwLock};

use crate::models::{Mood, Movie, Tag, UserProfile};
use crate::storage::ProfileStorage;

/// Message for the background persistence writer
enum WriteMessage {
    Save(UserProfile),
    Clear,
}

/// Single source of truth for the user's preference state
///
/// All mutations funnel through one write lock, so every operation observes
/// the result of the one before it. Each committed change publishes the new
/// snapshot on a watch channel and enqueues a full-profile write before the
/// lock is released; the single writer task applies writes in order, so an
/// older snapshot can never overtake a newer one on disk.
#[derive(Clone)]
pub struct PreferenceStore {
    profile: Arc<RwLock<UserProfile>>,
    snapshot_tx: Arc<watch::Sender<UserProfile>>,
    write_tx: mpsc::UnboundedSender<WriteMessage>,
}

/// Handle for gracefully shutting down the persistence writer
pub struct StoreWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl StoreWriterHandle {
    /// Signals the writer task to flush pending writes and stop
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Profile writer shutdown signal sent");
    }
}

impl PreferenceStore {
    /// Restores the store from persisted state (or starts empty) and spawns
    /// the background persistence writer
    ///
    /// A load failure degrades to an empty profile with a warning; the
    /// session stays usable and the next committed mutation rewrites the
    /// blob.
    pub async fn restore(storage: Arc<dyn ProfileStorage>) -> (Self, StoreWriterHandle) {
        let profile = match storage.load().await {
            Ok(Some(profile)) => {
                tracing::info!(
                    liked = profile.liked.len(),
                    disliked = profile.disliked.len(),
                    avoided = profile.avoided.len(),
                    tags = profile.tags.len(),
                    "Restored persisted profile"
                );
                profile
            }
            Ok(None) => UserProfile::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Profile load failed, starting empty");
                UserProfile::new()
            }
        };

        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let (snapshot_tx, _) = watch::channel(profile.clone());

        tokio::spawn(async move {
            Self::writer_task(storage, write_rx, shutdown_rx).await;
        });

        let store = Self {
            profile: Arc::new(RwLock::new(profile)),
            snapshot_tx: Arc::new(snapshot_tx),
            write_tx,
        };

        (store, StoreWriterHandle { shutdown_tx })
    }

    /// Returns a clone of the current profile
    pub async fn snapshot(&self) -> UserProfile {
        self.profile.read().await.clone()
    }

    /// Subscribes to committed snapshots
    ///
    /// The receiver always starts at the current snapshot; every committed
    /// mutation publishes the next one.
    pub fn subscribe(&self) -> watch::Receiver<UserProfile> {
        self.snapshot_tx.subscribe()
    }

    pub async fn add_liked(&self, movie: Movie) -> bool {
        self.commit(|p| p.add_liked(movie)).await
    }

    pub async fn remove_liked(&self, id: u64) -> bool {
        self.commit(|p| p.remove_liked(id)).await
    }

    pub async fn add_disliked(&self, movie: Movie) -> bool {
        self.commit(|p| p.add_disliked(movie)).await
    }

    pub async fn remove_disliked(&self, id: u64) -> bool {
        self.commit(|p| p.remove_disliked(id)).await
    }

    pub async fn add_avoided(&self, movie: Movie) -> bool {
        self.commit(|p| p.add_avoided(movie)).await
    }

    pub async fn remove_avoided(&self, id: u64) -> bool {
        self.commit(|p| p.remove_avoided(id)).await
    }

    pub async fn add_tag(&self, tag: Tag) -> bool {
        self.commit(|p| p.add_tag(tag)).await
    }

    pub async fn remove_tag(&self, id: &str) -> bool {
        self.commit(|p| p.remove_tag(id)).await
    }

    pub async fn set_mood(&self, mood: Mood) -> bool {
        self.commit(|p| p.set_mood(mood)).await
    }

    /// Resets to the empty profile and discards the persisted blob
    pub async fn clear(&self) -> bool {
        let mut guard = self.profile.write().await;
        let changed = guard.clear();

        // Publish and enqueue while still holding the lock, so snapshots
        // and writes leave in commit order.
        if changed {
            let _ = self.snapshot_tx.send(guard.clone());
        }
        // The blob is deleted even on a no-op clear: a previous session may
        // have left one behind for an already-empty profile.
        self.enqueue(WriteMessage::Clear);
        changed
    }

    /// Applies one mutation under the write lock and, if it changed the
    /// profile, broadcasts and persists the new snapshot
    ///
    /// The broadcast and the write enqueue happen before the lock is
    /// released (neither suspends); a later commit can never publish or
    /// persist ahead of an earlier one.
    async fn commit(&self, op: impl FnOnce(&mut UserProfile) -> bool) -> bool {
        let mut guard = self.profile.write().await;
        let changed = op(&mut *guard);

        if changed {
            let snapshot = guard.clone();
            // send only fails with no receivers, which is fine
            let _ = self.snapshot_tx.send(snapshot.clone());
            self.enqueue(WriteMessage::Save(snapshot));
        }
        changed
    }

    fn enqueue(&self, msg: WriteMessage) {
        if self.write_tx.send(msg).is_err() {
            tracing::warn!("Profile writer is gone, skipping persistence");
        }
    }

    /// Background task that applies persistence writes in order
    ///
    /// Failures are logged and dropped; the in-memory profile stays
    /// authoritative for the session. On shutdown, pending writes are
    /// flushed before exiting.
    async fn writer_task(
        storage: Arc<dyn ProfileStorage>,
        mut write_rx: mpsc::UnboundedReceiver<WriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Profile writer task started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    Self::apply_write(storage.as_ref(), msg).await;
                }
                _ = shutdown_rx.recv() => {
                    let mut flushed = 0;
                    while let Ok(msg) = write_rx.try_recv() {
                        Self::apply_write(storage.as_ref(), msg).await;
                        flushed += 1;
                    }
                    tracing::info!(flushed, "Profile writer task stopped");
                    break;
                }
            }
        }
    }

    async fn apply_write(storage: &dyn ProfileStorage, msg: WriteMessage) {
        let result = match &msg {
            WriteMessage::Save(profile) => storage.save(profile).await,
            WriteMessage::Clear => storage.clear().await,
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Profile persistence failed, in-memory state kept");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use crate::storage::MemoryStorage;

    fn movie(id: u64) -> Movie {
        Movie {
            id,
            title: format!("Movie {}", id),
            poster_path: None,
            genre_ids: vec![35],
        }
    }

    /// Storage whose saves always fail, for degradation tests
    struct BrokenStorage;

    #[async_trait::async_trait]
    impl ProfileStorage for BrokenStorage {
        async fn load(&self) -> AppResult<Option<UserProfile>> {
            Ok(None)
        }

        async fn save(&self, _profile: &UserProfile) -> AppResult<()> {
            Err(AppError::Storage("disk full".to_string()))
        }

        async fn clear(&self) -> AppResult<()> {
            Err(AppError::Storage("disk full".to_string()))
        }
    }

    #[tokio::test]
    async fn test_mutation_broadcasts_snapshot() {
        let storage = Arc::new(MemoryStorage::new());
        let (store, _handle) = PreferenceStore::restore(storage).await;
        let mut rx = store.subscribe();

        assert!(store.add_liked(movie(1)).await);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().liked_ids(), vec![1]);
    }

    #[tokio::test]
    async fn test_noop_mutation_does_not_broadcast() {
        let storage = Arc::new(MemoryStorage::new());
        let (store, _handle) = PreferenceStore::restore(storage).await;

        store.add_liked(movie(1)).await;
        let mut rx = store.subscribe();
        rx.mark_unchanged();

        assert!(!store.add_liked(movie(1)).await);
        assert!(!store.remove_tag("genre-999").await);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_shutdown_flushes_writes_to_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let (store, handle) = PreferenceStore::restore(storage.clone()).await;

        store.add_disliked(movie(42)).await;
        store.add_liked(movie(42)).await;
        store.set_mood(Mood::Sad).await;

        handle.shutdown().await;
        // Writer drains on the shutdown signal; give the task a beat
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let persisted = storage.load().await.unwrap().unwrap();
        assert_eq!(persisted.liked_ids(), vec![42]);
        assert!(persisted.disliked.is_empty());
        assert_eq!(persisted.mood, Some(Mood::Sad));
    }

    #[tokio::test]
    async fn test_restore_picks_up_persisted_profile() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let (store, handle) = PreferenceStore::restore(storage.clone()).await;
            store.add_liked(movie(7)).await;
            handle.shutdown().await;
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        let (store, _handle) = PreferenceStore::restore(storage).await;
        assert_eq!(store.snapshot().await.liked_ids(), vec![7]);
    }

    #[tokio::test]
    async fn test_clear_discards_persisted_blob() {
        let storage = Arc::new(MemoryStorage::new());
        let (store, handle) = PreferenceStore::restore(storage.clone()).await;

        store.add_liked(movie(1)).await;
        assert!(store.clear().await);

        handle.shutdown().await;
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(store.snapshot().await, UserProfile::new());
        assert_eq!(storage.load().await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_mutations_publish_in_commit_order() {
        let storage = Arc::new(MemoryStorage::new());
        let (store, handle) = PreferenceStore::restore(storage.clone()).await;
        let rx = store.subscribe();

        // Two racing mutations on the same id; whichever commits second
        // must be what both the watch channel and the writer see last.
        for _ in 0..500 {
            let liker = store.clone();
            let disliker = store.clone();
            let like = tokio::spawn(async move { liker.add_liked(movie(1)).await });
            let dislike = tokio::spawn(async move { disliker.add_disliked(movie(1)).await });
            let _ = tokio::join!(like, dislike);

            let current = store.snapshot().await;
            assert_eq!(*rx.borrow(), current, "watch channel lags the profile");
        }

        let final_snapshot = store.snapshot().await;
        handle.shutdown().await;
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let persisted = storage.load().await.unwrap().unwrap();
        assert_eq!(persisted, final_snapshot);
    }

    #[tokio::test]
    async fn test_save_failure_keeps_in_memory_state() {
        let (store, _handle) = PreferenceStore::restore(Arc::new(BrokenStorage)).await;

        assert!(store.add_liked(movie(1)).await);
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(store.snapshot().await.liked_ids(), vec![1]);
    }
}
