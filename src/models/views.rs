use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{MediaId, MediaType};

/// Number of entries reported in `ViewStats::recently_viewed`
pub const RECENTLY_VIEWED_LIMIT: usize = 5;

/// View bookkeeping for one title, nested under the user's aggregate document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewRecord {
    pub count: u64,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub first_viewed: DateTime<Utc>,
    pub last_viewed: DateTime<Utc>,
}

/// Per-user aggregate document stored at `userViews/{userId}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserViews {
    #[serde(default)]
    pub total_views: u64,
    /// Keyed by the media id rendered as a string
    #[serde(default)]
    pub media_views: HashMap<String, ViewRecord>,
}

/// Outcome of applying one view event to the aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewOutcome {
    /// First view of this title by this user
    Created,
    /// Cooldown elapsed, count incremented
    Counted,
    /// Inside the cooldown window, nothing changed
    Suppressed,
}

impl UserViews {
    /// Applies the cooldown policy for one view event, mutating in place.
    pub fn apply_view(
        &mut self,
        media_id: MediaId,
        media_type: MediaType,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> ViewOutcome {
        match self.media_views.get_mut(&media_id.to_string()) {
            None => {
                self.media_views.insert(
                    media_id.to_string(),
                    ViewRecord {
                        count: 1,
                        media_type,
                        first_viewed: now,
                        last_viewed: now,
                    },
                );
                self.total_views += 1;
                ViewOutcome::Created
            }
            Some(record) if now - record.last_viewed >= cooldown => {
                record.count += 1;
                record.last_viewed = now;
                self.total_views += 1;
                ViewOutcome::Counted
            }
            Some(_) => ViewOutcome::Suppressed,
        }
    }

    /// Folds the per-title records into movie/TV totals
    pub fn stats(&self) -> ViewStats {
        let mut stats = ViewStats {
            total_views: self.total_views,
            ..ViewStats::default()
        };

        for record in self.media_views.values() {
            match record.media_type {
                MediaType::Movie => {
                    stats.movie_views += record.count;
                    stats.unique_movies += 1;
                }
                MediaType::Tv => {
                    stats.tv_views += record.count;
                    stats.unique_tv_shows += 1;
                }
            }
        }

        let mut recent: Vec<RecentView> = self
            .media_views
            .iter()
            .map(|(id, record)| RecentView {
                id: id.clone(),
                count: record.count,
                media_type: record.media_type,
                first_viewed: record.first_viewed,
                last_viewed: record.last_viewed,
            })
            .collect();
        recent.sort_by(|a, b| b.last_viewed.cmp(&a.last_viewed));
        recent.truncate(RECENTLY_VIEWED_LIMIT);
        stats.recently_viewed = recent;

        stats
    }
}

/// One entry of the recently viewed list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecentView {
    pub id: String,
    pub count: u64,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub first_viewed: DateTime<Utc>,
    pub last_viewed: DateTime<Utc>,
}

/// Aggregated view statistics for a user's dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewStats {
    pub total_views: u64,
    pub movie_views: u64,
    pub tv_views: u64,
    pub unique_movies: u64,
    #[serde(rename = "uniqueTVShows")]
    pub unique_tv_shows: u64,
    pub recently_viewed: Vec<RecentView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 20, 0, 0).unwrap()
    }

    #[test]
    fn test_first_view_creates_record() {
        let mut views = UserViews::default();
        let outcome = views.apply_view(603, MediaType::Movie, t0(), Duration::minutes(30));

        assert_eq!(outcome, ViewOutcome::Created);
        assert_eq!(views.total_views, 1);
        let record = &views.media_views["603"];
        assert_eq!(record.count, 1);
        assert_eq!(record.first_viewed, t0());
        assert_eq!(record.last_viewed, t0());
    }

    #[test]
    fn test_view_inside_cooldown_is_suppressed() {
        let mut views = UserViews::default();
        views.apply_view(603, MediaType::Movie, t0(), Duration::minutes(30));

        let outcome = views.apply_view(
            603,
            MediaType::Movie,
            t0() + Duration::minutes(29),
            Duration::minutes(30),
        );

        assert_eq!(outcome, ViewOutcome::Suppressed);
        assert_eq!(views.total_views, 1);
        assert_eq!(views.media_views["603"].count, 1);
        assert_eq!(views.media_views["603"].last_viewed, t0());
    }

    #[test]
    fn test_view_at_cooldown_boundary_counts() {
        let mut views = UserViews::default();
        views.apply_view(603, MediaType::Movie, t0(), Duration::minutes(30));

        let later = t0() + Duration::minutes(30);
        let outcome = views.apply_view(603, MediaType::Movie, later, Duration::minutes(30));

        assert_eq!(outcome, ViewOutcome::Counted);
        assert_eq!(views.total_views, 2);
        assert_eq!(views.media_views["603"].count, 2);
        assert_eq!(views.media_views["603"].last_viewed, later);
        assert_eq!(views.media_views["603"].first_viewed, t0());
    }

    #[test]
    fn test_stats_partition_by_type() {
        let mut views = UserViews::default();
        let cooldown = Duration::minutes(30);
        views.apply_view(1, MediaType::Movie, t0(), cooldown);
        views.apply_view(1, MediaType::Movie, t0() + Duration::hours(1), cooldown);
        views.apply_view(2, MediaType::Movie, t0() + Duration::hours(2), cooldown);
        views.apply_view(3, MediaType::Tv, t0() + Duration::hours(3), cooldown);

        let stats = views.stats();

        assert_eq!(stats.total_views, 4);
        assert_eq!(stats.movie_views, 3);
        assert_eq!(stats.tv_views, 1);
        assert_eq!(stats.unique_movies, 2);
        assert_eq!(stats.unique_tv_shows, 1);
        assert_eq!(stats.recently_viewed[0].id, "3");
    }

    #[test]
    fn test_recently_viewed_keeps_latest_five() {
        let mut views = UserViews::default();
        for id in 0..8u64 {
            views.apply_view(
                id,
                MediaType::Tv,
                t0() + Duration::minutes(id as i64),
                Duration::minutes(30),
            );
        }

        let ids: Vec<String> = views
            .stats()
            .recently_viewed
            .into_iter()
            .map(|v| v.id)
            .collect();

        assert_eq!(ids, vec!["7", "6", "5", "4", "3"]);
    }

    #[test]
    fn test_stats_serialize_with_dashboard_field_names() {
        let json = serde_json::to_value(ViewStats::default()).unwrap();
        assert_eq!(json["uniqueTVShows"], 0);
        assert_eq!(json["totalViews"], 0);
        assert!(json["recentlyViewed"].as_array().unwrap().is_empty());
    }
}
