//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// Object store abstraction for asset storage.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Check if an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get an object's metadata without fetching content.
    async fn head(&self, key: &str) -> StorageResult<ObjectMeta>;

    /// Put an object atomically.
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()>;

    /// Delete an object.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// List all object keys under a prefix.
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Issue a presigned PUT credential scoped to a single key.
    ///
    /// The returned URL authorizes exactly one object write with the given
    /// content type. When `tagging` is set, the tag string is bound into the
    /// signature and the uploader must send it back verbatim in the
    /// `x-amz-tagging` header.
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
        tagging: Option<&str>,
    ) -> StorageResult<PresignedPut>;

    /// Get the name of this storage backend.
    ///
    /// Returns a static string identifier for the backend type (e.g., "s3",
    /// "memory"). Used for logging.
    fn backend_name(&self) -> &'static str;

    /// Verify storage backend connectivity.
    ///
    /// Called during server startup so misconfiguration surfaces before the
    /// server starts accepting requests. The default implementation returns
    /// Ok(()), suitable for backends with nothing to verify.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// Metadata about a stored object.
#[derive(Clone, Debug)]
pub struct ObjectMeta {
    /// Object size in bytes.
    pub size: u64,
    /// Last modification time (if available).
    pub last_modified: Option<time::OffsetDateTime>,
    /// Content type (if available).
    pub content_type: Option<String>,
}

/// A presigned single-object write credential.
#[derive(Clone, Debug)]
pub struct PresignedPut {
    /// The URL the client PUTs the object body to.
    pub url: String,
    /// Tag string the uploader must send in `x-amz-tagging`, if any.
    pub tagging: Option<String>,
}
