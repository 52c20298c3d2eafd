use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use super::favorites::CountResponse;
use crate::{
    error::AppResult,
    models::{MediaId, MediaType, MergedReview, NewReview, Review, ReviewPatch},
    services::ReviewStore,
};

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

/// Local and catalog reviews of a title, newest first
pub async fn merged(
    State(reviews): State<ReviewStore>,
    Path((media_type, media_id)): Path<(MediaType, MediaId)>,
) -> Json<Vec<MergedReview>> {
    Json(reviews.get_merged_reviews(media_id, media_type).await)
}

pub async fn by_user(
    State(reviews): State<ReviewStore>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<Review>>> {
    Ok(Json(reviews.get_user_reviews(&user_id).await?))
}

pub async fn count(
    State(reviews): State<ReviewStore>,
    Path(user_id): Path<String>,
) -> Json<CountResponse> {
    Json(CountResponse {
        count: reviews.get_user_review_count(&user_id).await,
    })
}

pub async fn add(
    State(reviews): State<ReviewStore>,
    Json(review): Json<NewReview>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let id = reviews.add_review(review).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn update(
    State(reviews): State<ReviewStore>,
    Path(review_id): Path<String>,
    Json(patch): Json<ReviewPatch>,
) -> AppResult<StatusCode> {
    reviews.update_review(&review_id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    State(reviews): State<ReviewStore>,
    Path(review_id): Path<String>,
) -> AppResult<StatusCode> {
    reviews.delete_review(&review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
