use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    models::{MediaId, MediaType, ViewStats},
    services::ViewTracker,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordViewRequest {
    pub media_id: MediaId,
    pub media_type: MediaType,
}

/// Always 202: suppressed and failed views look the same to the client
pub async fn record(
    State(views): State<ViewTracker>,
    Path(user_id): Path<String>,
    Json(request): Json<RecordViewRequest>,
) -> StatusCode {
    views
        .record_view(&user_id, request.media_id, request.media_type)
        .await;
    StatusCode::ACCEPTED
}

pub async fn stats(
    State(views): State<ViewTracker>,
    Path(user_id): Path<String>,
) -> Json<ViewStats> {
    Json(views.get_user_view_stats(&user_id).await)
}
