use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::media::library::ListError;
use crate::media::stream::ResolveError;

/// Failures visible to HTTP clients. Messages never include filesystem paths.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("file not found")]
    NotFound,

    #[error("media directory is unreadable")]
    DirectoryUnreadable,
}

impl From<ListError> for ApiError {
    fn from(err: ListError) -> Self {
        tracing::error!("Listing failed: {}", err);
        match err {
            ListError::DirectoryUnreadable { .. } => ApiError::DirectoryUnreadable,
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        tracing::debug!("Stream request rejected: {}", err);
        ApiError::NotFound
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::DirectoryUnreadable => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
