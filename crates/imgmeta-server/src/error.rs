//! Request-scoped error types.
//!
//! Configuration problems are handled at startup in `main` and never reach
//! this type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("error parsing request body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            // The failure stays confined to this request; the pool and the
            // process keep running.
            ApiError::Persistence(e) => {
                tracing::error!("database operation failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            ApiError::Decode(e) => {
                tracing::warn!("rejected request body: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    format!("Error parsing request body: {}", e),
                )
                    .into_response()
            }
        }
    }
}
