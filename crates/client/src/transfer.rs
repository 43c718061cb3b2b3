//! Byte transfer to presigned storage URLs.

use crate::error::UploadError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header;

/// Transfers one rendition to a presigned URL.
#[async_trait]
pub trait VariantTransfer: Send + Sync {
    async fn put(&self, url: &str, content_type: &str, body: Bytes) -> Result<(), UploadError>;
}

/// Reqwest-backed transfer.
#[derive(Clone, Default)]
pub struct HttpTransfer {
    http: reqwest::Client,
}

impl HttpTransfer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VariantTransfer for HttpTransfer {
    async fn put(&self, url: &str, content_type: &str, body: Bytes) -> Result<(), UploadError> {
        let response = self
            .http
            .put(url)
            .header(header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| UploadError::Transfer(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Transfer(format!(
                "storage returned {status}: {body}"
            )));
        }
        Ok(())
    }
}
