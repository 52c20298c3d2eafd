use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::{
    api::AppState,
    models::{ViewStats, WatchlistStatusCounts},
};

/// Dashboard numbers for one user
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub favorites: u64,
    pub watchlist: u64,
    pub watchlist_status: WatchlistStatusCounts,
    pub reviews: u64,
    pub views: ViewStats,
}

/// Every part defaults on its own, so one failed read never blanks the page
pub async fn summary(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<ProfileSummary> {
    let (favorites, watchlist, watchlist_status, reviews, views) = tokio::join!(
        state.favorites.get_favorite_count(&user_id),
        state.watchlist.get_watchlist_count(&user_id),
        state.watchlist.get_watchlist_status_counts(&user_id),
        state.reviews.get_user_review_count(&user_id),
        state.views.get_user_view_stats(&user_id),
    );

    Json(ProfileSummary {
        favorites,
        watchlist,
        watchlist_status,
        reviews,
        views,
    })
}
