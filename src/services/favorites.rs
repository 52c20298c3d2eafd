use serde_json::json;
use std::sync::Arc;

use crate::{
    clock::Clock,
    db::{
        document::object_without_nulls, CacheKey, Collection, DocumentStore, Filter, OrderBy,
        StatusCache,
    },
    error::AppResult,
    models::{user_media_key, FavoriteRecord, MediaId, MediaType},
    services::StatusFlags,
};

/// Per-user favorite markers; a record's existence is the flag
#[derive(Clone)]
pub struct FavoritesStore {
    store: Arc<dyn DocumentStore>,
    flags: StatusFlags,
    clock: Arc<dyn Clock>,
}

fn cache_key(user_id: &str, media_id: MediaId) -> CacheKey {
    CacheKey::Favorite {
        user_id: user_id.to_string(),
        media_id,
    }
}

impl FavoritesStore {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        cache: Arc<dyn StatusCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            flags: StatusFlags::new(cache),
            clock,
        }
    }

    /// Marks a title as favorite. Adding again merges into the stored record,
    /// so fields omitted this time keep their value.
    pub async fn add_to_favorites(
        &self,
        user_id: &str,
        media_id: MediaId,
        media_type: MediaType,
        media_title: &str,
        poster_path: Option<&str>,
    ) -> AppResult<()> {
        let body = object_without_nulls(vec![
            ("userId", Some(json!(user_id))),
            ("mediaId", Some(json!(media_id))),
            ("mediaType", Some(json!(media_type))),
            ("mediaTitle", Some(json!(media_title))),
            ("posterPath", poster_path.map(|p| json!(p))),
            ("addedAt", Some(json!(self.clock.now()))),
        ]);

        self.store
            .set(
                Collection::Favorites,
                &user_media_key(user_id, media_id),
                body,
                true,
            )
            .await
            .map_err(|e| {
                tracing::error!(user_id, media_id, error = %e, "Error adding to favorites");
                e
            })?;

        tracing::info!(user_id, media_id, "Favorite added");
        self.flags.remember(&cache_key(user_id, media_id), true).await;
        Ok(())
    }

    pub async fn remove_from_favorites(&self, user_id: &str, media_id: MediaId) -> AppResult<()> {
        self.store
            .delete(Collection::Favorites, &user_media_key(user_id, media_id))
            .await
            .map_err(|e| {
                tracing::error!(user_id, media_id, error = %e, "Error removing from favorites");
                e
            })?;

        self.flags.remember(&cache_key(user_id, media_id), false).await;
        Ok(())
    }

    /// Cached existence check; `false` when the store cannot be read
    pub async fn check_is_favorite(&self, user_id: &str, media_id: MediaId) -> bool {
        let key = cache_key(user_id, media_id);
        if let Some(cached) = self.flags.lookup(&key).await {
            return cached;
        }

        match self
            .store
            .get(Collection::Favorites, &user_media_key(user_id, media_id))
            .await
        {
            Ok(doc) => {
                let exists = doc.is_some();
                self.flags.remember(&key, exists).await;
                exists
            }
            Err(e) => {
                tracing::error!(user_id, media_id, error = %e, "Error checking favorite status");
                false
            }
        }
    }

    pub async fn clear_favorite_cache(&self, user_id: &str, media_id: MediaId) {
        self.flags.forget(&cache_key(user_id, media_id)).await;
    }

    pub async fn get_favorite_count(&self, user_id: &str) -> u64 {
        self.store
            .count(Collection::Favorites, &[Filter::eq("userId", user_id)])
            .await
            .unwrap_or_else(|e| {
                tracing::error!(user_id, error = %e, "Error getting favorite count");
                0
            })
    }

    /// All of the user's favorites, most recently added first
    pub async fn get_user_favorites(&self, user_id: &str) -> AppResult<Vec<FavoriteRecord>> {
        let docs = self
            .store
            .query(
                Collection::Favorites,
                &[Filter::eq("userId", user_id)],
                Some(OrderBy::desc("addedAt")),
            )
            .await?;

        docs.iter().map(|doc| doc.decode()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::db::cache::MockStatusCache;
    use crate::db::document::MockDocumentStore;
    use crate::db::{MemoryDocumentStore, MemoryStatusCache};
    use crate::error::AppError;
    use chrono::Duration;

    fn favorites() -> (FavoritesStore, Arc<MemoryDocumentStore>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let store = Arc::new(MemoryDocumentStore::new());
        let cache = Arc::new(MemoryStatusCache::new(100, Duration::hours(1), clock.clone()));
        (
            FavoritesStore::new(store.clone(), cache, clock.clone()),
            store,
            clock,
        )
    }

    #[tokio::test]
    async fn test_add_check_remove() {
        let (favorites, _store, _clock) = favorites();

        assert!(!favorites.check_is_favorite("u1", 27205).await);

        favorites
            .add_to_favorites("u1", 27205, MediaType::Movie, "Inception", Some("/i.jpg"))
            .await
            .unwrap();
        assert!(favorites.check_is_favorite("u1", 27205).await);

        favorites.remove_from_favorites("u1", 27205).await.unwrap();
        assert!(!favorites.check_is_favorite("u1", 27205).await);
    }

    #[tokio::test]
    async fn test_negative_result_is_cached_until_cleared() {
        let (favorites, store, clock) = favorites();

        assert!(!favorites.check_is_favorite("u1", 1).await);

        // Written by another process, invisible through the cached flag
        store
            .set(
                Collection::Favorites,
                "u1_1",
                json!({
                    "userId": "u1",
                    "mediaId": 1,
                    "mediaType": "movie",
                    "mediaTitle": "Alien",
                    "addedAt": clock.now(),
                }),
                false,
            )
            .await
            .unwrap();
        assert!(!favorites.check_is_favorite("u1", 1).await);

        favorites.clear_favorite_cache("u1", 1).await;
        assert!(favorites.check_is_favorite("u1", 1).await);
    }

    #[tokio::test]
    async fn test_count_and_listing_are_per_user() {
        let (favorites, _store, clock) = favorites();

        favorites
            .add_to_favorites("u1", 1, MediaType::Movie, "Alien", None)
            .await
            .unwrap();
        clock.advance(Duration::seconds(30));
        favorites
            .add_to_favorites("u1", 2, MediaType::Tv, "Severance", None)
            .await
            .unwrap();
        favorites
            .add_to_favorites("u2", 3, MediaType::Movie, "Heat", None)
            .await
            .unwrap();

        assert_eq!(favorites.get_favorite_count("u1").await, 2);
        assert_eq!(favorites.get_favorite_count("u3").await, 0);

        let listed = favorites.get_user_favorites("u1").await.unwrap();
        let titles: Vec<&str> = listed.iter().map(|f| f.media_title.as_str()).collect();
        assert_eq!(titles, vec!["Severance", "Alien"]);
        assert_eq!(listed[1].poster_path, None);
    }

    #[tokio::test]
    async fn test_add_twice_keeps_one_record() {
        let (favorites, _store, _clock) = favorites();

        for _ in 0..2 {
            favorites
                .add_to_favorites("u1", 1, MediaType::Movie, "Alien", None)
                .await
                .unwrap();
        }

        assert_eq!(favorites.get_favorite_count("u1").await, 1);
    }

    #[tokio::test]
    async fn test_readd_without_poster_keeps_stored_poster() {
        let (favorites, _store, clock) = favorites();

        favorites
            .add_to_favorites("u1", 1, MediaType::Movie, "Alien", Some("/alien.jpg"))
            .await
            .unwrap();
        clock.advance(Duration::minutes(1));
        favorites
            .add_to_favorites("u1", 1, MediaType::Movie, "Alien", None)
            .await
            .unwrap();

        let listed = favorites.get_user_favorites("u1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].poster_path.as_deref(), Some("/alien.jpg"));
        assert_eq!(listed[0].added_at, clock.now());
    }

    #[tokio::test]
    async fn test_broken_cache_falls_back_to_store() {
        let clock = Arc::new(ManualClock::new());
        let store = Arc::new(MemoryDocumentStore::new());
        let mut cache = MockStatusCache::new();
        cache
            .expect_get()
            .returning(|_| Err(AppError::Internal("cache down".to_string())));
        cache
            .expect_set()
            .returning(|_, _| Err(AppError::Internal("cache down".to_string())));

        let favorites = FavoritesStore::new(store, Arc::new(cache), clock);
        favorites
            .add_to_favorites("u1", 1, MediaType::Movie, "Alien", None)
            .await
            .unwrap();

        assert!(favorites.check_is_favorite("u1", 1).await);
    }

    #[tokio::test]
    async fn test_remove_failure_propagates() {
        let clock = Arc::new(ManualClock::new());
        let cache = Arc::new(MemoryStatusCache::new(100, Duration::hours(1), clock.clone()));
        let mut store = MockDocumentStore::new();
        store
            .expect_delete()
            .returning(|_, _| Err(AppError::Internal("write refused".to_string())));

        let favorites = FavoritesStore::new(Arc::new(store), cache.clone(), clock);

        assert!(favorites.remove_from_favorites("u1", 1).await.is_err());
        assert!(cache.is_empty());
    }
}
