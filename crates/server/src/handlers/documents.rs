//! Document asset handlers.

use crate::error::ApiResult;
use crate::handlers::assets::{
    self, FinalizeRequest, ListAssetsResponse, PresignQuery, PresignResponse,
};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use basecamp_core::variant::AssetKind;

/// List committed documents for a resource.
#[tracing::instrument(skip(state))]
pub async fn list_documents(
    State(state): State<AppState>,
    Path(rec_resource_id): Path<String>,
) -> ApiResult<Json<ListAssetsResponse>> {
    let response =
        assets::list_committed_assets(&state, AssetKind::Document, &rec_resource_id).await?;
    Ok(Json(response))
}

/// Issue a presigned upload grant for a new document.
#[tracing::instrument(skip(state))]
pub async fn presign_document(
    State(state): State<AppState>,
    Path(rec_resource_id): Path<String>,
    Query(query): Query<PresignQuery>,
) -> ApiResult<Json<PresignResponse>> {
    let response = assets::issue_upload_credentials(
        &state,
        AssetKind::Document,
        &rec_resource_id,
        query.file_name.as_deref(),
    )
    .await?;
    Ok(Json(response))
}

/// Commit an uploaded document.
#[tracing::instrument(skip(state, request))]
pub async fn finalize_document(
    State(state): State<AppState>,
    Path((rec_resource_id, document_id)): Path<(String, String)>,
    Json(request): Json<FinalizeRequest>,
) -> ApiResult<(StatusCode, Json<assets::AssetResponse>)> {
    let response = assets::finalize_commit(
        &state,
        AssetKind::Document,
        &rec_resource_id,
        &document_id,
        request,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Delete a committed document and its stored rendition.
#[tracing::instrument(skip(state))]
pub async fn delete_document(
    State(state): State<AppState>,
    Path((rec_resource_id, document_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    assets::delete_committed_asset(&state, AssetKind::Document, &rec_resource_id, &document_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
