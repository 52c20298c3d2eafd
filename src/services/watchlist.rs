use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    clock::Clock,
    db::{
        document::object_without_nulls, CacheKey, Collection, Document, DocumentStore, Filter,
        OrderBy, StatusCache,
    },
    error::{AppError, AppResult},
    models::{
        user_media_key, MediaId, MediaType, WatchStatus, WatchlistEntry, WatchlistEntryInput,
        WatchlistStatusCounts,
    },
    services::{validate_rating, StatusFlags},
};

/// Per-user watch status records with cached existence checks
#[derive(Clone)]
pub struct WatchlistStore {
    store: Arc<dyn DocumentStore>,
    flags: StatusFlags,
    clock: Arc<dyn Clock>,
}

fn cache_key(user_id: &str, media_id: MediaId) -> CacheKey {
    CacheKey::Watchlist {
        user_id: user_id.to_string(),
        media_id,
    }
}

fn validate_entry(media_type: MediaType, entry: &WatchlistEntryInput) -> AppResult<()> {
    if let Some(rating) = entry.rating {
        validate_rating(rating)?;
        if entry.status != WatchStatus::Completed {
            return Err(AppError::InvalidInput(
                "rating can only be set on completed entries".to_string(),
            ));
        }
    }

    if media_type == MediaType::Movie && entry.episodes_watched.is_some() {
        return Err(AppError::InvalidInput(
            "episodesWatched only applies to TV shows".to_string(),
        ));
    }

    check_progress(entry.episodes_watched, entry.total_episodes)
}

fn check_progress(episodes_watched: Option<u32>, total_episodes: Option<u32>) -> AppResult<()> {
    if let (Some(watched), Some(total)) = (episodes_watched, total_episodes) {
        if watched > total {
            return Err(AppError::InvalidInput(format!(
                "episodesWatched ({}) exceeds totalEpisodes ({})",
                watched, total
            )));
        }
    }
    Ok(())
}

fn stored_total_episodes(doc: &Document) -> Option<u32> {
    doc.body
        .get("totalEpisodes")
        .and_then(Value::as_u64)
        .and_then(|total| u32::try_from(total).ok())
}

/// A rating cannot outlive the completed status
fn rating_field(status: WatchStatus, rating: Option<u8>) -> Option<Value> {
    if status == WatchStatus::Completed {
        rating.map(Value::from)
    } else {
        Some(Value::Null)
    }
}

impl WatchlistStore {
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

    /// Creates or merge-updates the user's entry for a title.
    ///
    /// Fields of `entry` left as `None` keep their stored value. Errors are
    /// logged and returned so the caller can roll back.
    pub async fn add_to_watchlist(
        &self,
        user_id: &str,
        media_id: MediaId,
        media_type: MediaType,
        media_title: &str,
        poster_path: Option<&str>,
        entry: WatchlistEntryInput,
    ) -> AppResult<()> {
        validate_entry(media_type, &entry)?;

        let id = user_media_key(user_id, media_id);
        let now = self.clock.now();
        let log_error = |e: AppError| {
            tracing::error!(user_id, media_id, error = %e, "Error adding to watchlist");
            e
        };

        let existing = self
            .store
            .get(Collection::Watchlist, &id)
            .await
            .map_err(log_error)?;

        // Progress is bounded by the stored total when this upsert omits one
        check_progress(
            entry.episodes_watched,
            entry
                .total_episodes
                .or_else(|| existing.as_ref().and_then(stored_total_episodes)),
        )?;

        let body = object_without_nulls(vec![
            ("userId", Some(json!(user_id))),
            ("mediaId", Some(json!(media_id))),
            ("mediaType", Some(json!(media_type))),
            ("mediaTitle", Some(json!(media_title))),
            ("posterPath", poster_path.map(|p| json!(p))),
            ("status", Some(json!(entry.status))),
            ("episodesWatched", entry.episodes_watched.map(Value::from)),
            ("totalEpisodes", entry.total_episodes.map(Value::from)),
            ("rating", rating_field(entry.status, entry.rating)),
            ("notes", entry.notes.as_deref().map(|n| json!(n))),
            ("addedAt", existing.is_none().then(|| json!(now))),
            ("updatedAt", Some(json!(now))),
        ]);
        self.store
            .set(Collection::Watchlist, &id, body, true)
            .await
            .map_err(log_error)?;

        tracing::info!(user_id, media_id, status = ?entry.status, "Watchlist entry saved");
        self.flags.remember(&cache_key(user_id, media_id), true).await;
        Ok(())
    }

    /// Moves an existing entry to a new status, optionally with progress
    pub async fn update_watchlist_status(
        &self,
        user_id: &str,
        media_id: MediaId,
        status: WatchStatus,
        episodes_watched: Option<u32>,
    ) -> AppResult<()> {
        let id = user_media_key(user_id, media_id);

        let existing = self
            .store
            .get(Collection::Watchlist, &id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("watchlist entry {}", id)))?
            .decode::<WatchlistEntry>()?;

        let mut input = WatchlistEntryInput::with_status(status);
        input.episodes_watched = episodes_watched;
        input.total_episodes = existing.total_episodes;
        validate_entry(existing.media_type, &input)?;

        let patch = object_without_nulls(vec![
            ("status", Some(json!(status))),
            ("episodesWatched", episodes_watched.map(Value::from)),
            ("rating", rating_field(status, existing.rating)),
            ("updatedAt", Some(json!(self.clock.now()))),
        ]);

        self.store
            .update(Collection::Watchlist, &id, patch)
            .await
            .map_err(|e| {
                tracing::error!(user_id, media_id, error = %e, "Error updating watchlist status");
                e
            })
    }

    pub async fn remove_from_watchlist(&self, user_id: &str, media_id: MediaId) -> AppResult<()> {
        let id = user_media_key(user_id, media_id);

        self.store
            .delete(Collection::Watchlist, &id)
            .await
            .map_err(|e| {
                tracing::error!(user_id, media_id, error = %e, "Error removing from watchlist");
                e
            })?;

        self.flags.remember(&cache_key(user_id, media_id), false).await;
        Ok(())
    }

    /// Cached existence check; `false` when the store cannot be read
    pub async fn check_is_in_watchlist(&self, user_id: &str, media_id: MediaId) -> bool {
        let key = cache_key(user_id, media_id);
        if let Some(cached) = self.flags.lookup(&key).await {
            return cached;
        }

        match self
            .store
            .get(Collection::Watchlist, &user_media_key(user_id, media_id))
            .await
        {
            Ok(doc) => {
                let exists = doc.is_some();
                self.flags.remember(&key, exists).await;
                exists
            }
            Err(e) => {
                tracing::error!(user_id, media_id, error = %e, "Error checking watchlist status");
                false
            }
        }
    }

    pub async fn clear_watchlist_cache(&self, user_id: &str, media_id: MediaId) {
        self.flags.forget(&cache_key(user_id, media_id)).await;
    }

    /// Number of entries per status; zeros when the store cannot be read
    pub async fn get_watchlist_status_counts(&self, user_id: &str) -> WatchlistStatusCounts {
        let docs = match self
            .store
            .query(Collection::Watchlist, &[Filter::eq("userId", user_id)], None)
            .await
        {
            Ok(docs) => docs,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Error getting watchlist counts");
                return WatchlistStatusCounts::default();
            }
        };

        docs.iter()
            .filter_map(|doc| doc.body.get("status").cloned())
            .filter_map(|status| serde_json::from_value::<WatchStatus>(status).ok())
            .fold(WatchlistStatusCounts::default(), |mut counts, status| {
                counts.record(status);
                counts
            })
    }

    pub async fn get_watchlist_count(&self, user_id: &str) -> u64 {
        self.store
            .count(Collection::Watchlist, &[Filter::eq("userId", user_id)])
            .await
            .unwrap_or_else(|e| {
                tracing::error!(user_id, error = %e, "Error getting watchlist count");
                0
            })
    }

    /// All of the user's entries, most recently added first
    pub async fn get_user_watchlist(&self, user_id: &str) -> AppResult<Vec<WatchlistEntry>> {
        let docs = self
            .store
            .query(
                Collection::Watchlist,
                &[Filter::eq("userId", user_id)],
                Some(OrderBy::desc("addedAt")),
            )
            .await?;

        docs.iter().map(|doc| doc.decode()).collect()
    }
}
