//! Route configuration.

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check (intentionally unauthenticated for load balancers/k8s probes)
        .route("/v1/health", get(handlers::health_check))
        // Image assets
        .route(
            "/v1/resources/{rec_resource_id}/images",
            get(handlers::list_images),
        )
        .route(
            "/v1/resources/{rec_resource_id}/images/presign",
            post(handlers::presign_image),
        )
        .route(
            "/v1/resources/{rec_resource_id}/images/{image_id}/finalize",
            post(handlers::finalize_image),
        )
        .route(
            "/v1/resources/{rec_resource_id}/images/{image_id}",
            delete(handlers::delete_image),
        )
        // Document assets
        .route(
            "/v1/resources/{rec_resource_id}/documents",
            get(handlers::list_documents),
        )
        .route(
            "/v1/resources/{rec_resource_id}/documents/presign",
            post(handlers::presign_document),
        )
        .route(
            "/v1/resources/{rec_resource_id}/documents/{document_id}/finalize",
            post(handlers::finalize_document),
        )
        .route(
            "/v1/resources/{rec_resource_id}/documents/{document_id}",
            delete(handlers::delete_document),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
