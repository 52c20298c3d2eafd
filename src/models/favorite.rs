use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MediaId, MediaType};

/// Stored favorite marker, id `{userId}_{mediaId}`. Its existence is the flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    pub user_id: String,
    pub media_id: MediaId,
    pub media_type: MediaType,
    pub media_title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    pub added_at: DateTime<Utc>,
}
