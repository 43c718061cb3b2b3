//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("failed to generate upload credentials: {0}")]
    SigningFailed(String),

    #[error("failed to finalize upload: {0}")]
    CommitFailed(String),

    #[error("failed to delete asset {asset_id}: {detail}")]
    PartialDeletion { asset_id: String, detail: String },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("storage error: {0}")]
    Storage(#[from] basecamp_storage::StorageError),

    #[error("metadata error: {0}")]
    Metadata(#[from] basecamp_metadata::MetadataError),

    #[error("invalid argument: {0}")]
    Core(#[from] basecamp_core::Error),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "invalid_argument",
            Self::SigningFailed(_) => "signing_failed",
            Self::CommitFailed(_) => "commit_failed",
            Self::PartialDeletion { .. } => "partial_deletion",
            Self::Internal(_) => "internal_error",
            Self::Storage(e) => match e {
                basecamp_storage::StorageError::NotFound(_) => "not_found",
                _ => "storage_error",
            },
            Self::Metadata(e) => match e {
                basecamp_metadata::MetadataError::NotFound(_) => "not_found",
                basecamp_metadata::MetadataError::AlreadyExists(_) => "conflict",
                _ => "metadata_error",
            },
            Self::Core(_) => "invalid_argument",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::SigningFailed(_) => StatusCode::BAD_GATEWAY,
            Self::CommitFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PartialDeletion { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Storage(e) => match e {
                basecamp_storage::StorageError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Metadata(e) => match e {
                basecamp_metadata::MetadataError::NotFound(_) => StatusCode::NOT_FOUND,
                basecamp_metadata::MetadataError::AlreadyExists(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Core(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_commit_maps_to_conflict() {
        let err = ApiError::Metadata(basecamp_metadata::MetadataError::AlreadyExists(
            "asset_id abc already committed".to_string(),
        ));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "conflict");
    }

    #[test]
    fn signing_failure_is_bad_gateway() {
        let err = ApiError::SigningFailed("timeout".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.code(), "signing_failed");
        assert!(err.to_string().contains("failed to generate upload credentials"));
    }

    #[test]
    fn malformed_ids_are_invalid_argument() {
        let err = ApiError::Core(basecamp_core::Error::InvalidAssetId("a/b".to_string()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "invalid_argument");
    }
}
