use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

pub mod catalog;
pub mod favorites;
pub mod profile;
pub mod recommendations;
pub mod reviews;
pub mod views;
pub mod watchlist;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
