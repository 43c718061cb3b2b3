//! Deletion reconciler tests: objects first, metadata last.

mod common;

use axum::http::{Method, StatusCode};
use bytes::Bytes;
use common::failing::FailingDeleteStore;
use basecamp_storage::ObjectStore;
use common::{TestServer, json_request};
use serde_json::json;
use std::sync::Arc;

async fn commit_image(server: &TestServer, rec: &str, asset_id: &str) {
    let (status, _) = json_request(
        &server.router,
        Method::POST,
        &format!("/v1/resources/{rec}/images/{asset_id}/finalize"),
        Some(json!({
            "file_name": "trail.jpg",
            "variant_sizes": {"original": 4, "scr": 3, "pre": 2, "thm": 1}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn delete_removes_all_objects_then_metadata() {
    let server = TestServer::new().await;
    server.seed_resource("REC204", "Alice Lake").await;
    commit_image(&server, "REC204", "img-1").await;

    for code in ["original", "scr", "pre", "thm"] {
        server
            .memory
            .put(
                &format!("images/REC204/img-1/{code}.webp"),
                Bytes::from_static(b"webp"),
            )
            .await
            .unwrap();
    }

    let (status, _) = json_request(
        &server.router,
        Method::DELETE,
        "/v1/resources/REC204/images/img-1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert!(
        server
            .memory
            .list("images/REC204/img-1/")
            .await
            .unwrap()
            .is_empty()
    );

    let (_, body) = json_request(
        &server.router,
        Method::GET,
        "/v1/resources/REC204/images",
        None,
    )
    .await;
    assert!(body["assets"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn delete_sweeps_stray_objects_under_the_asset_prefix() {
    let server = TestServer::new().await;
    server.seed_resource("REC204", "Alice Lake").await;
    commit_image(&server, "REC204", "img-1").await;

    // An object under the prefix that no variant row references, such as a
    // leftover from an interrupted earlier upload.
    server
        .memory
        .put(
            "images/REC204/img-1/leftover.tmp",
            Bytes::from_static(b"junk"),
        )
        .await
        .unwrap();

    let (status, _) = json_request(
        &server.router,
        Method::DELETE,
        "/v1/resources/REC204/images/img-1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(
        !server
            .memory
            .exists("images/REC204/img-1/leftover.tmp")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn delete_does_not_touch_sibling_assets() {
    let server = TestServer::new().await;
    server.seed_resource("REC204", "Alice Lake").await;
    commit_image(&server, "REC204", "img").await;
    commit_image(&server, "REC204", "img-2").await;

    server
        .memory
        .put(
            "images/REC204/img-2/original.webp",
            Bytes::from_static(b"keep"),
        )
        .await
        .unwrap();

    let (status, _) = json_request(
        &server.router,
        Method::DELETE,
        "/v1/resources/REC204/images/img",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert!(
        server
            .memory
            .exists("images/REC204/img-2/original.webp")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn failed_object_deletion_keeps_metadata() {
    let memory = Arc::new(basecamp_storage::MemoryBackend::new());
    let failing = Arc::new(FailingDeleteStore::new(memory.clone(), "pre.webp"));
    let server = TestServer::with_storage(failing).await;
    server.seed_resource("REC204", "Alice Lake").await;
    commit_image(&server, "REC204", "img-1").await;

    for code in ["original", "scr", "pre", "thm"] {
        memory
            .put(
                &format!("images/REC204/img-1/{code}.webp"),
                Bytes::from_static(b"webp"),
            )
            .await
            .unwrap();
    }

    let (status, body) = json_request(
        &server.router,
        Method::DELETE,
        "/v1/resources/REC204/images/img-1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "partial_deletion");
    assert!(body["message"].as_str().unwrap().contains("img-1"));

    // The asset must stay discoverable so the deletion can be retried.
    let (_, body) = json_request(
        &server.router,
        Method::GET,
        "/v1/resources/REC204/images",
        None,
    )
    .await;
    assert_eq!(body["assets"].as_array().unwrap().len(), 1);

    // The object that refused to delete is still there.
    assert!(memory.exists("images/REC204/img-1/pre.webp").await.unwrap());
}

#[tokio::test]
async fn delete_unknown_asset_is_404() {
    let server = TestServer::new().await;
    server.seed_resource("REC204", "Alice Lake").await;

    let (status, body) = json_request(
        &server.router,
        Method::DELETE,
        "/v1/resources/REC204/images/nope",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn delete_through_the_wrong_kind_is_404() {
    let server = TestServer::new().await;
    server.seed_resource("REC204", "Alice Lake").await;
    commit_image(&server, "REC204", "img-1").await;

    // img-1 is an image; deleting it through the documents route must fail
    // and leave it committed.
    let (status, _) = json_request(
        &server.router,
        Method::DELETE,
        "/v1/resources/REC204/documents/img-1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = json_request(
        &server.router,
        Method::GET,
        "/v1/resources/REC204/images",
        None,
    )
    .await;
    assert_eq!(body["assets"].as_array().unwrap().len(), 1);
}
