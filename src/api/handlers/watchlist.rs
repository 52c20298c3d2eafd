use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{
        MediaId, MediaType, WatchStatus, WatchlistEntry, WatchlistEntryInput,
        WatchlistStatusCounts,
    },
    services::WatchlistStore,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToWatchlistRequest {
    pub media_id: MediaId,
    pub media_type: MediaType,
    pub media_title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(flatten)]
    pub entry: WatchlistEntryInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: WatchStatus,
    #[serde(default)]
    pub episodes_watched: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistCheckResponse {
    pub in_watchlist: bool,
}

pub async fn list(
    State(watchlist): State<WatchlistStore>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<WatchlistEntry>>> {
    Ok(Json(watchlist.get_user_watchlist(&user_id).await?))
}

/// Creates the entry or merges into the existing one
pub async fn add(
    State(watchlist): State<WatchlistStore>,
    Path(user_id): Path<String>,
    Json(request): Json<AddToWatchlistRequest>,
) -> AppResult<StatusCode> {
    watchlist
        .add_to_watchlist(
            &user_id,
            request.media_id,
            request.media_type,
            &request.media_title,
            request.poster_path.as_deref(),
            request.entry,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn counts(
    State(watchlist): State<WatchlistStore>,
    Path(user_id): Path<String>,
) -> Json<WatchlistStatusCounts> {
    Json(watchlist.get_watchlist_status_counts(&user_id).await)
}

pub async fn check(
    State(watchlist): State<WatchlistStore>,
    Path((user_id, media_id)): Path<(String, MediaId)>,
) -> Json<WatchlistCheckResponse> {
    Json(WatchlistCheckResponse {
        in_watchlist: watchlist.check_is_in_watchlist(&user_id, media_id).await,
    })
}

pub async fn update_status(
    State(watchlist): State<WatchlistStore>,
    Path((user_id, media_id)): Path<(String, MediaId)>,
    Json(request): Json<UpdateStatusRequest>,
) -> AppResult<StatusCode> {
    watchlist
        .update_watchlist_status(&user_id, media_id, request.status, request.episodes_watched)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    State(watchlist): State<WatchlistStore>,
    Path((user_id, media_id)): Path<(String, MediaId)>,
) -> AppResult<StatusCode> {
    watchlist.remove_from_watchlist(&user_id, media_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_cache(
    State(watchlist): State<WatchlistStore>,
    Path((user_id, media_id)): Path<(String, MediaId)>,
) -> StatusCode {
    watchlist.clear_watchlist_cache(&user_id, media_id).await;
    StatusCode::NO_CONTENT
}
