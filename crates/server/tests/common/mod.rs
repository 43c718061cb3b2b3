//! Shared test infrastructure.

pub mod failing;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use basecamp_core::config::AppConfig;
use basecamp_metadata::models::ResourceRow;
use basecamp_metadata::{MetadataStore, ResourceRepo, SqliteStore};
use basecamp_server::{AppState, create_router};
use basecamp_storage::{MemoryBackend, ObjectStore};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

/// A fully wired test server backed by in-memory storage and a temp SQLite
/// database.
pub struct TestServer {
    pub router: Router,
    pub state: AppState,
    /// Typed handle on the storage backend for direct inspection.
    pub memory: Arc<MemoryBackend>,
    _temp_dir: TempDir,
}

impl TestServer {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let metadata: Arc<dyn MetadataStore> = Arc::new(
            SqliteStore::new(temp_dir.path().join("metadata.db"))
                .await
                .unwrap(),
        );
        let memory = Arc::new(MemoryBackend::new());
        let storage: Arc<dyn ObjectStore> = memory.clone();

        let state = AppState::new(AppConfig::for_testing(), storage, metadata);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            memory,
            _temp_dir: temp_dir,
        }
    }

    /// Like `new`, but with the storage backend replaced.
    pub async fn with_storage(storage: Arc<dyn ObjectStore>) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let metadata: Arc<dyn MetadataStore> = Arc::new(
            SqliteStore::new(temp_dir.path().join("metadata.db"))
                .await
                .unwrap(),
        );
        let memory = Arc::new(MemoryBackend::new());

        let state = AppState::new(AppConfig::for_testing(), storage, metadata);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            memory,
            _temp_dir: temp_dir,
        }
    }

    /// Insert a resource row directly.
    pub async fn seed_resource(&self, rec_resource_id: &str, name: &str) {
        self.state
            .metadata
            .create_resource(&ResourceRow {
                rec_resource_id: rec_resource_id.to_string(),
                name: name.to_string(),
                closest_community: Some("Squamish".to_string()),
            })
            .await
            .unwrap();
    }
}

/// Send a JSON request to the router and decode the JSON response.
pub async fn json_request(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}
