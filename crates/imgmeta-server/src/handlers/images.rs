//! Handlers for the `/images` route.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::error::ApiError;
use crate::storage::ImageRecord;
use crate::AppState;

/// Format for server-assigned upload times, e.g. `2024-05-01T09:30:00+0000`.
pub const UPLOAD_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// What clients may supply. There is deliberately no `UploadTime` field
/// here: the server always assigns it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct CreateImageRequest {
    file_name: String,
    description: String,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ImageRecord>>, ApiError> {
    let images = state.db.list_all().await?;
    Ok(Json(images))
}

pub async fn create(State(state): State<AppState>, body: Bytes) -> Result<StatusCode, ApiError> {
    let req: CreateImageRequest = serde_json::from_slice(&body)?;

    let record = ImageRecord {
        file_name: req.file_name,
        description: req.description,
        upload_time: Utc::now().format(UPLOAD_TIME_FORMAT).to_string(),
    };

    state.db.insert(&record).await?;

    Ok(StatusCode::OK)
}

pub async fn method_not_allowed() -> (StatusCode, &'static str) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        "Only GET and POST methods supported\n",
    )
}
