//! Error responses for the JSON-returning endpoints.

use api_shared::FailureRes;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use depot_files::FilesError;

/// Failure of a JSON-returning operation; rendered as `{success: false, error}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed upload part, or an unusable filename
    #[error("{0}")]
    MalformedRequest(String),

    /// Target entry does not exist
    #[error("{0}")]
    NotFound(String),

    /// Storage failure; the message is the failed action, details go to the log
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Maps a storage error onto the API taxonomy.
    ///
    /// `action` becomes the client-visible message for server-side failures.
    pub fn from_files(error: FilesError, action: &str) -> Self {
        match error {
            FilesError::FileNotFound(name) => {
                ApiError::NotFound(format!("File not found: {}", name))
            }
            FilesError::InvalidName(e) => ApiError::MalformedRequest(e.to_string()),
            other => {
                tracing::error!("{}: {}", action, other);
                ApiError::Internal(action.to_owned())
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_client_error() {
            tracing::warn!("Request rejected ({}): {}", status, self);
        }
        (status, Json(FailureRes::new(self.to_string()))).into_response()
    }
}
