use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MediaId, MediaType};

/// Where a title sits in the user's watching lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WatchStatus {
    PlanToWatch,
    Watching,
    Completed,
}

/// Stored watchlist document, id `{userId}_{mediaId}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub user_id: String,
    pub media_id: MediaId,
    pub media_type: MediaType,
    pub media_title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    pub status: WatchStatus,
    /// Only meaningful for TV shows
    #[serde(default)]
    pub episodes_watched: Option<u32>,
    #[serde(default)]
    pub total_episodes: Option<u32>,
    /// 1..=10, only present once completed
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied part of a watchlist upsert.
///
/// Optional fields left as `None` keep whatever the stored entry already has.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntryInput {
    pub status: WatchStatus,
    #[serde(default)]
    pub episodes_watched: Option<u32>,
    #[serde(default)]
    pub total_episodes: Option<u32>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl WatchlistEntryInput {
    pub fn with_status(status: WatchStatus) -> Self {
        Self {
            status,
            episodes_watched: None,
            total_episodes: None,
            rating: None,
            notes: None,
        }
    }
}

/// Number of watchlist entries in each status bucket
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistStatusCounts {
    pub plan_to_watch: u64,
    pub watching: u64,
    pub completed: u64,
}

impl WatchlistStatusCounts {
    pub fn record(&mut self, status: WatchStatus) {
        match status {
            WatchStatus::PlanToWatch => self.plan_to_watch += 1,
            WatchStatus::Watching => self.watching += 1,
            WatchStatus::Completed => self.completed += 1,
        }
    }
}
