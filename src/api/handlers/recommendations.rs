use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{models::MediaSummary, services::Recommender};

const MAX_LIMIT: usize = 20;

fn default_limit() -> usize {
    3
}

#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    #[serde(default = "default_limit")]
    limit: usize,
}

/// Picks drawn from the user's favorites and watchlist. Empty when the user
/// has neither.
pub async fn personalized(
    State(recommender): State<Recommender>,
    Path(user_id): Path<String>,
    Query(params): Query<RecommendationsQuery>,
) -> Json<Vec<MediaSummary>> {
    let limit = params.limit.min(MAX_LIMIT);
    Json(
        recommender
            .get_personalized_recommendations(&user_id, limit)
            .await,
    )
}
