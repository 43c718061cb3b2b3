//! Image asset handlers.

use crate::error::ApiResult;
use crate::handlers::assets::{
    self, FinalizeRequest, ListAssetsResponse, PresignQuery, PresignResponse,
};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use basecamp_core::variant::AssetKind;

/// List committed images for a resource.
#[tracing::instrument(skip(state))]
pub async fn list_images(
    State(state): State<AppState>,
    Path(rec_resource_id): Path<String>,
) -> ApiResult<Json<ListAssetsResponse>> {
    let response =
        assets::list_committed_assets(&state, AssetKind::Image, &rec_resource_id).await?;
    Ok(Json(response))
}

/// Issue presigned upload grants for a new image.
#[tracing::instrument(skip(state))]
pub async fn presign_image(
    State(state): State<AppState>,
    Path(rec_resource_id): Path<String>,
    Query(query): Query<PresignQuery>,
) -> ApiResult<Json<PresignResponse>> {
    let response = assets::issue_upload_credentials(
        &state,
        AssetKind::Image,
        &rec_resource_id,
        query.file_name.as_deref(),
    )
    .await?;
    Ok(Json(response))
}

/// Commit an uploaded image.
#[tracing::instrument(skip(state, request))]
pub async fn finalize_image(
    State(state): State<AppState>,
    Path((rec_resource_id, image_id)): Path<(String, String)>,
    Json(request): Json<FinalizeRequest>,
) -> ApiResult<(StatusCode, Json<assets::AssetResponse>)> {
    let response = assets::finalize_commit(
        &state,
        AssetKind::Image,
        &rec_resource_id,
        &image_id,
        request,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Delete a committed image and all of its stored renditions.
#[tracing::instrument(skip(state))]
pub async fn delete_image(
    State(state): State<AppState>,
    Path((rec_resource_id, image_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    assets::delete_committed_asset(&state, AssetKind::Image, &rec_resource_id, &image_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
