//! Failure-injecting storage wrapper.

use async_trait::async_trait;
use basecamp_storage::{ObjectMeta, ObjectStore, PresignedPut, StorageError, StorageResult};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

/// Delegates to an inner store but fails `delete` for keys containing a
/// configured substring.
pub struct FailingDeleteStore {
    inner: Arc<dyn ObjectStore>,
    fail_on: String,
}

impl FailingDeleteStore {
    pub fn new(inner: Arc<dyn ObjectStore>, fail_on: impl Into<String>) -> Self {
        Self {
            inner,
            fail_on: fail_on.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for FailingDeleteStore {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    async fn head(&self, key: &str) -> StorageResult<ObjectMeta> {
        self.inner.head(key).await
    }

    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        self.inner.put(key, data).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        if key.contains(&self.fail_on) {
            return Err(StorageError::S3(
                format!("injected delete failure for {key}").into(),
            ));
        }
        self.inner.delete(key).await
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.inner.list(prefix).await
    }

    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
        tagging: Option<&str>,
    ) -> StorageResult<PresignedPut> {
        self.inner
            .presign_put(key, content_type, expires_in, tagging)
            .await
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}
