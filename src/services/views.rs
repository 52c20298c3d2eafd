use chrono::Duration;
use std::sync::Arc;

use crate::{
    clock::Clock,
    db::{Collection, DocumentStore},
    error::{AppError, AppResult},
    models::{MediaId, MediaType, UserViews, ViewOutcome, ViewStats},
};

/// Attempts at the read-apply-CAS cycle before a view is dropped
pub const MAX_CAS_ATTEMPTS: usize = 5;

/// Records per-user view events and aggregates them into dashboard stats
#[derive(Clone)]
pub struct ViewTracker {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    cooldown: Duration,
}

impl ViewTracker {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>, cooldown: Duration) -> Self {
        Self {
            store,
            clock,
            cooldown,
        }
    }

    /// Counts a view of `media_id` unless the same user viewed it within the
    /// cooldown window. Never fails: view counting is best effort.
    pub async fn record_view(&self, user_id: &str, media_id: MediaId, media_type: MediaType) {
        match self.try_record_view(user_id, media_id, media_type).await {
            Ok(Some(outcome)) => {
                tracing::debug!(user_id, media_id, outcome = ?outcome, "View processed");
            }
            Ok(None) => {
                tracing::warn!(
                    user_id,
                    media_id,
                    attempts = MAX_CAS_ATTEMPTS,
                    "View dropped after repeated write conflicts"
                );
            }
            Err(e) => {
                tracing::error!(user_id, media_id, error = %e, "Error incrementing view count");
            }
        }
    }

    /// Optimistic read-modify-write on the user's aggregate document.
    /// `Ok(None)` means every attempt lost a version race.
    async fn try_record_view(
        &self,
        user_id: &str,
        media_id: MediaId,
        media_type: MediaType,
    ) -> AppResult<Option<ViewOutcome>> {
        for _ in 0..MAX_CAS_ATTEMPTS {
            let existing = self.store.get(Collection::UserViews, user_id).await?;
            let (mut views, version) = match &existing {
                Some(doc) => (doc.decode::<UserViews>()?, Some(doc.version)),
                None => (UserViews::default(), None),
            };

            let outcome = views.apply_view(media_id, media_type, self.clock.now(), self.cooldown);
            if outcome == ViewOutcome::Suppressed {
                return Ok(Some(outcome));
            }

            let body = serde_json::to_value(&views)?;
            if self
                .store
                .compare_and_set(Collection::UserViews, user_id, body, version)
                .await?
            {
                return Ok(Some(outcome));
            }

            tracing::debug!(user_id, media_id, "View write conflict, retrying");
        }

        Ok(None)
    }

    /// Aggregated view statistics; all zeros when the user has none or the
    /// store cannot be read.
    pub async fn get_user_view_stats(&self, user_id: &str) -> ViewStats {
        match self.load_stats(user_id).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Error getting view stats");
                ViewStats::default()
            }
        }
    }

    async fn load_stats(&self, user_id: &str) -> Result<ViewStats, AppError> {
        let doc = self.store.get(Collection::UserViews, user_id).await?;
        match doc {
            Some(doc) => Ok(doc.decode::<UserViews>()?.stats()),
            None => Ok(ViewStats::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::db::document::{Document, MockDocumentStore};
    use crate::db::MemoryDocumentStore;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn tracker_with_clock() -> (ViewTracker, Arc<ManualClock>, Arc<MemoryDocumentStore>) {
        let clock = Arc::new(ManualClock::with_time(
            Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap(),
        ));
        let store = Arc::new(MemoryDocumentStore::new());
        let tracker = ViewTracker::new(store.clone(), clock.clone(), Duration::minutes(30));
        (tracker, clock, store)
    }

    async fn stored_views(store: &MemoryDocumentStore, user_id: &str) -> UserViews {
        store
            .get(Collection::UserViews, user_id)
            .await
            .unwrap()
            .unwrap()
            .decode()
            .unwrap()
    }

    #[tokio::test]
    async fn test_first_view_creates_aggregate() {
        let (tracker, clock, store) = tracker_with_clock();

        tracker.record_view("u1", 603, MediaType::Movie).await;

        let views = stored_views(&store, "u1").await;
        assert_eq!(views.total_views, 1);
        assert_eq!(views.media_views["603"].count, 1);
        assert_eq!(views.media_views["603"].first_viewed, clock.now());
    }

    #[tokio::test]
    async fn test_repeat_view_within_cooldown_is_suppressed() {
        let (tracker, clock, store) = tracker_with_clock();

        tracker.record_view("u1", 603, MediaType::Movie).await;
        let first_seen = clock.now();
        clock.advance(Duration::minutes(10));
        tracker.record_view("u1", 603, MediaType::Movie).await;

        let views = stored_views(&store, "u1").await;
        assert_eq!(views.total_views, 1);
        assert_eq!(views.media_views["603"].count, 1);
        assert_eq!(views.media_views["603"].last_viewed, first_seen);
    }

    #[tokio::test]
    async fn test_repeat_view_after_cooldown_counts_once() {
        let (tracker, clock, store) = tracker_with_clock();

        tracker.record_view("u1", 603, MediaType::Movie).await;
        clock.advance(Duration::minutes(45));
        tracker.record_view("u1", 603, MediaType::Movie).await;

        let views = stored_views(&store, "u1").await;
        assert_eq!(views.total_views, 2);
        assert_eq!(views.media_views["603"].count, 2);
        assert_eq!(views.media_views["603"].last_viewed, clock.now());
    }

    #[tokio::test]
    async fn test_second_title_adds_record_and_bumps_total() {
        let (tracker, _clock, store) = tracker_with_clock();

        tracker.record_view("u1", 603, MediaType::Movie).await;
        tracker.record_view("u1", 1399, MediaType::Tv).await;

        let views = stored_views(&store, "u1").await;
        assert_eq!(views.total_views, 2);
        assert_eq!(views.media_views.len(), 2);
    }

    #[tokio::test]
    async fn test_stats_for_unknown_user_are_zero() {
        let (tracker, _clock, _store) = tracker_with_clock();

        let stats = tracker.get_user_view_stats("nobody").await;

        assert_eq!(stats, ViewStats::default());
        assert!(stats.recently_viewed.is_empty());
    }

    #[tokio::test]
    async fn test_stats_aggregate_recorded_views() {
        let (tracker, clock, _store) = tracker_with_clock();

        tracker.record_view("u1", 603, MediaType::Movie).await;
        clock.advance(Duration::hours(1));
        tracker.record_view("u1", 603, MediaType::Movie).await;
        tracker.record_view("u1", 1399, MediaType::Tv).await;

        let stats = tracker.get_user_view_stats("u1").await;
        assert_eq!(stats.total_views, 3);
        assert_eq!(stats.movie_views, 2);
        assert_eq!(stats.tv_views, 1);
        assert_eq!(stats.unique_movies, 1);
        assert_eq!(stats.unique_tv_shows, 1);
        assert_eq!(stats.recently_viewed.len(), 2);
    }

    #[tokio::test]
    async fn test_record_view_swallows_storage_errors() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .returning(|_, _| Err(AppError::Internal("store offline".to_string())));
        store.expect_compare_and_set().never();

        let tracker = ViewTracker::new(
            Arc::new(store),
            Arc::new(ManualClock::new()),
            Duration::minutes(30),
        );

        // Completes without panicking or returning an error
        tracker.record_view("u1", 603, MediaType::Movie).await;
    }

    #[tokio::test]
    async fn test_stats_default_on_storage_error() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .returning(|_, _| Err(AppError::Internal("store offline".to_string())));

        let tracker = ViewTracker::new(
            Arc::new(store),
            Arc::new(ManualClock::new()),
            Duration::minutes(30),
        );

        assert_eq!(tracker.get_user_view_stats("u1").await, ViewStats::default());
    }

    #[tokio::test]
    async fn test_conflict_is_retried_against_fresh_version() {
        let mut store = MockDocumentStore::new();
        let mut seq = mockall::Sequence::new();

        store
            .expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(None));
        store
            .expect_compare_and_set()
            .withf(|_, _, _, expected| expected.is_none())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _, _| Ok(false));
        store
            .expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Ok(Some(Document {
                    id: "u1".to_string(),
                    version: 1,
                    body: json!({ "totalViews": 1, "mediaViews": {} }),
                }))
            });
        store
            .expect_compare_and_set()
            .withf(|_, _, body, expected| *expected == Some(1) && body["totalViews"] == 2)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _, _| Ok(true));

        let tracker = ViewTracker::new(
            Arc::new(store),
            Arc::new(ManualClock::new()),
            Duration::minutes(30),
        );

        tracker.record_view("u1", 603, MediaType::Movie).await;
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .times(MAX_CAS_ATTEMPTS)
            .returning(|_, _| Ok(None));
        store
            .expect_compare_and_set()
            .times(MAX_CAS_ATTEMPTS)
            .returning(|_, _, _, _| Ok(false));

        let tracker = ViewTracker::new(
            Arc::new(store),
            Arc::new(ManualClock::new()),
            Duration::minutes(30),
        );

        let outcome = tracker
            .try_record_view("u1", 603, MediaType::Movie)
            .await
            .unwrap();
        assert_eq!(outcome, None);
    }
}
