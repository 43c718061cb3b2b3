//! Health check handler.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

/// Health check endpoint.
///
/// Verifies the storage backend and the metadata store are reachable.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state
        .storage
        .health_check()
        .await
        .map_err(|e| ApiError::Internal(format!("storage health check failed: {e}")))?;

    state
        .metadata
        .health_check()
        .await
        .map_err(|e| ApiError::Internal(format!("metadata health check failed: {e}")))?;

    Ok(Json(json!({
        "status": "ok",
        "backend": state.storage.backend_name(),
    })))
}
