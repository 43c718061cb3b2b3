//! In-memory storage backend for tests and local development.

use crate::error::{StorageError, StorageResult};
use crate::traits::{ObjectMeta, ObjectStore, PresignedPut};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Clone)]
struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
    last_modified: time::OffsetDateTime,
}

/// HashMap-backed object store.
///
/// Presigned URLs are synthetic (`memory://...`) since no network transfer
/// happens against this backend; tests inspect them instead of PUTting to
/// them.
#[derive(Default)]
pub struct MemoryBackend {
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate_key(key: &str) -> StorageResult<()> {
        if key.is_empty() || key.starts_with('/') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(())
    }

    /// Get an object's bytes directly (test helper).
    pub async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let objects = self.objects.read().await;
        objects
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    /// Store an object with an explicit content type (test helper).
    pub async fn put_with_content_type(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        Self::validate_key(key)?;
        let mut objects = self.objects.write().await;
        objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: Some(content_type.to_string()),
                last_modified: time::OffsetDateTime::now_utc(),
            },
        );
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn head(&self, key: &str) -> StorageResult<ObjectMeta> {
        let objects = self.objects.read().await;
        let object = objects
            .get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(ObjectMeta {
            size: object.data.len() as u64,
            last_modified: Some(object.last_modified),
            content_type: object.content_type.clone(),
        })
    }

    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        Self::validate_key(key)?;
        let mut objects = self.objects.write().await;
        objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: None,
                last_modified: time::OffsetDateTime::now_utc(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut objects = self.objects.write().await;
        objects
            .remove(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let objects = self.objects.read().await;
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
        tagging: Option<&str>,
    ) -> StorageResult<PresignedPut> {
        Self::validate_key(key)?;
        let mut url = format!(
            "memory://{}?content-type={}&expires={}",
            key,
            content_type,
            expires_in.as_secs()
        );
        if let Some(tags) = tagging {
            url.push_str("&tagging=");
            url.push_str(tags);
        }
        Ok(PresignedPut {
            url,
            tagging: tagging.map(|t| t.to_string()),
        })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete_roundtrip() {
        let backend = MemoryBackend::new();
        backend
            .put("images/REC1/a/thm.webp", Bytes::from_static(b"webp"))
            .await
            .unwrap();

        assert!(backend.exists("images/REC1/a/thm.webp").await.unwrap());
        assert_eq!(
            backend.head("images/REC1/a/thm.webp").await.unwrap().size,
            4
        );

        backend.delete("images/REC1/a/thm.webp").await.unwrap();
        assert!(!backend.exists("images/REC1/a/thm.webp").await.unwrap());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let backend = MemoryBackend::new();
        assert!(matches!(
            backend.delete("nope").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_is_prefix_scoped() {
        let backend = MemoryBackend::new();
        for key in [
            "images/REC1/a/original.webp",
            "images/REC1/a/thm.webp",
            "images/REC1/ab/thm.webp",
            "images/REC2/a/thm.webp",
        ] {
            backend.put(key, Bytes::from_static(b"x")).await.unwrap();
        }

        let keys = backend.list("images/REC1/a/").await.unwrap();
        assert_eq!(
            keys,
            vec!["images/REC1/a/original.webp", "images/REC1/a/thm.webp"]
        );
    }

    #[tokio::test]
    async fn presign_embeds_tagging_only_when_given() {
        let backend = MemoryBackend::new();
        let tagged = backend
            .presign_put(
                "images/REC1/a/original.webp",
                "image/webp",
                Duration::from_secs(900),
                Some("filename=trail.jpg"),
            )
            .await
            .unwrap();
        assert!(tagged.url.contains("tagging=filename=trail.jpg"));
        assert_eq!(tagged.tagging.as_deref(), Some("filename=trail.jpg"));

        let untagged = backend
            .presign_put(
                "images/REC1/a/thm.webp",
                "image/webp",
                Duration::from_secs(900),
                None,
            )
            .await
            .unwrap();
        assert!(!untagged.url.contains("tagging"));
        assert!(untagged.tagging.is_none());
    }
}
