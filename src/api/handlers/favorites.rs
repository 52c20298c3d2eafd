use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{FavoriteRecord, MediaId, MediaType},
    services::FavoritesStore,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteRequest {
    pub media_id: MediaId,
    pub media_type: MediaType,
    pub media_title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteCheckResponse {
    pub is_favorite: bool,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

pub async fn list(
    State(favorites): State<FavoritesStore>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<FavoriteRecord>>> {
    Ok(Json(favorites.get_user_favorites(&user_id).await?))
}

pub async fn add(
    State(favorites): State<FavoritesStore>,
    Path(user_id): Path<String>,
    Json(request): Json<AddFavoriteRequest>,
) -> AppResult<StatusCode> {
    favorites
        .add_to_favorites(
            &user_id,
            request.media_id,
            request.media_type,
            &request.media_title,
            request.poster_path.as_deref(),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn count(
    State(favorites): State<FavoritesStore>,
    Path(user_id): Path<String>,
) -> Json<CountResponse> {
    Json(CountResponse {
        count: favorites.get_favorite_count(&user_id).await,
    })
}

pub async fn check(
    State(favorites): State<FavoritesStore>,
    Path((user_id, media_id)): Path<(String, MediaId)>,
) -> Json<FavoriteCheckResponse> {
    Json(FavoriteCheckResponse {
        is_favorite: favorites.check_is_favorite(&user_id, media_id).await,
    })
}

pub async fn remove(
    State(favorites): State<FavoritesStore>,
    Path((user_id, media_id)): Path<(String, MediaId)>,
) -> AppResult<StatusCode> {
    favorites.remove_from_favorites(&user_id, media_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_cache(
    State(favorites): State<FavoritesStore>,
    Path((user_id, media_id)): Path<(String, MediaId)>,
) -> StatusCode {
    favorites.clear_favorite_cache(&user_id, media_id).await;
    StatusCode::NO_CONTENT
}
