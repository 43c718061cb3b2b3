//! HTTP client for the asset management API.

use crate::error::UploadError;
use async_trait::async_trait;
use basecamp_core::variant::AssetKind;
use reqwest::Url;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::HashMap;

/// One presigned upload grant.
#[derive(Clone, Debug, Deserialize)]
pub struct PresignGrant {
    pub size_code: String,
    pub url: String,
    pub key: String,
}

/// Response of the presign endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct PresignedUpload {
    pub asset_id: String,
    pub presigned_urls: Vec<PresignGrant>,
}

/// One committed rendition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantSummary {
    pub size_code: String,
    pub extension: String,
    pub size_bytes: i64,
    pub url: String,
}

/// A committed asset as returned by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetSummary {
    pub asset_id: String,
    pub rec_resource_id: String,
    pub kind: String,
    pub display_name: String,
    pub created_at: String,
    pub created_by: String,
    pub variants: Vec<VariantSummary>,
}

#[derive(Debug, Deserialize)]
struct ListAssetsResponse {
    assets: Vec<AssetSummary>,
}

#[derive(Debug, Serialize)]
struct FinalizeRequest<'a> {
    file_name: &'a str,
    variant_sizes: &'a HashMap<String, u64>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    message: String,
}

/// Server operations used by the upload pipeline.
#[async_trait]
pub trait AssetApi: Send + Sync {
    /// Request presigned upload grants for a new asset.
    async fn presign(
        &self,
        kind: AssetKind,
        rec_resource_id: &str,
        file_name: &str,
    ) -> Result<PresignedUpload, UploadError>;

    /// Commit an uploaded asset.
    async fn finalize(
        &self,
        kind: AssetKind,
        rec_resource_id: &str,
        asset_id: &str,
        file_name: &str,
        variant_sizes: &HashMap<String, u64>,
    ) -> Result<AssetSummary, UploadError>;

    /// List committed assets of one kind.
    async fn list_assets(
        &self,
        kind: AssetKind,
        rec_resource_id: &str,
    ) -> Result<Vec<AssetSummary>, UploadError>;

    /// Delete a committed asset and its stored renditions.
    async fn delete_asset(
        &self,
        kind: AssetKind,
        rec_resource_id: &str,
        asset_id: &str,
    ) -> Result<(), UploadError>;
}

fn kind_segment(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Image => "images",
        AssetKind::Document => "documents",
    }
}

/// Reqwest-backed [`AssetApi`] implementation.
#[derive(Clone)]
pub struct HttpAssetApi {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpAssetApi {
    pub fn new(base_url: &str) -> Result<Self, UploadError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| UploadError::Api {
                code: "invalid_url".to_string(),
                message: format!("invalid server URL {base_url}: {e}"),
            })?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    fn url(&self, path: &str) -> Result<Url, UploadError> {
        self.base_url.join(path).map_err(|e| UploadError::Api {
            code: "invalid_url".to_string(),
            message: format!("failed to build API URL {path}: {e}"),
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, UploadError> {
        let response = req.send().await.map_err(|e| UploadError::Api {
            code: "request_failed".to_string(),
            message: e.to_string(),
        })?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        serde_json::from_str(&body).map_err(|e| UploadError::Api {
            code: "invalid_response".to_string(),
            message: e.to_string(),
        })
    }

    async fn send_empty(&self, req: reqwest::RequestBuilder) -> Result<(), UploadError> {
        let response = req.send().await.map_err(|e| UploadError::Api {
            code: "request_failed".to_string(),
            message: e.to_string(),
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }
        Ok(())
    }
}

/// Map a structured server error onto the pipeline taxonomy.
///
/// Credential-issuance, commit and deletion failures become their typed
/// variants so callers can branch on the phase without inspecting code
/// strings; anything else stays a generic `Api` error.
fn api_error(status: reqwest::StatusCode, body: &str) -> UploadError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => match parsed.code.as_str() {
            "signing_failed" => UploadError::Signing(parsed.message),
            "commit_failed" | "conflict" => UploadError::Commit(parsed.message),
            "partial_deletion" => UploadError::Delete(parsed.message),
            _ => UploadError::Api {
                code: parsed.code,
                message: parsed.message,
            },
        },
        Err(_) => UploadError::Api {
            code: format!("http_{}", status.as_u16()),
            message: body.to_string(),
        },
    }
}

#[async_trait]
impl AssetApi for HttpAssetApi {
    async fn presign(
        &self,
        kind: AssetKind,
        rec_resource_id: &str,
        file_name: &str,
    ) -> Result<PresignedUpload, UploadError> {
        let url = self.url(&format!(
            "/v1/resources/{rec_resource_id}/{}/presign",
            kind_segment(kind)
        ))?;
        self.send_json(self.http.post(url).query(&[("file_name", file_name)]))
            .await
    }

    async fn finalize(
        &self,
        kind: AssetKind,
        rec_resource_id: &str,
        asset_id: &str,
        file_name: &str,
        variant_sizes: &HashMap<String, u64>,
    ) -> Result<AssetSummary, UploadError> {
        let url = self.url(&format!(
            "/v1/resources/{rec_resource_id}/{}/{asset_id}/finalize",
            kind_segment(kind)
        ))?;
        let request = FinalizeRequest {
            file_name,
            variant_sizes,
        };
        self.send_json(self.http.post(url).json(&request)).await
    }

    async fn list_assets(
        &self,
        kind: AssetKind,
        rec_resource_id: &str,
    ) -> Result<Vec<AssetSummary>, UploadError> {
        let url = self.url(&format!(
            "/v1/resources/{rec_resource_id}/{}",
            kind_segment(kind)
        ))?;
        let response: ListAssetsResponse = self.send_json(self.http.get(url)).await?;
        Ok(response.assets)
    }

    async fn delete_asset(
        &self,
        kind: AssetKind,
        rec_resource_id: &str,
        asset_id: &str,
    ) -> Result<(), UploadError> {
        let url = self.url(&format!(
            "/v1/resources/{rec_resource_id}/{}/{asset_id}",
            kind_segment(kind)
        ))?;
        self.send_empty(self.http.delete(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_parses_structured_body() {
        let err = api_error(
            reqwest::StatusCode::NOT_FOUND,
            r#"{"code":"not_found","message":"rec_resource_id REC1 not found"}"#,
        );
        match err {
            UploadError::Api { code, message } => {
                assert_eq!(code, "not_found");
                assert!(message.contains("REC1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn signing_failures_become_typed_signing_errors() {
        let err = api_error(
            reqwest::StatusCode::BAD_GATEWAY,
            r#"{"code":"signing_failed","message":"upstream timeout"}"#,
        );
        assert!(matches!(err, UploadError::Signing(m) if m == "upstream timeout"));
    }

    #[test]
    fn commit_failures_become_typed_commit_errors() {
        let err = api_error(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"code":"commit_failed","message":"database unavailable"}"#,
        );
        assert!(matches!(err, UploadError::Commit(_)));

        let conflict = api_error(
            reqwest::StatusCode::CONFLICT,
            r#"{"code":"conflict","message":"asset_id a1 already committed"}"#,
        );
        assert!(matches!(conflict, UploadError::Commit(m) if m.contains("a1")));
    }

    #[test]
    fn partial_deletion_becomes_a_typed_delete_error() {
        let err = api_error(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"code":"partial_deletion","message":"failed to delete asset a1: object pre.webp"}"#,
        );
        assert!(matches!(err, UploadError::Delete(_)));
    }

    #[test]
    fn api_error_falls_back_to_status_code() {
        let err = api_error(reqwest::StatusCode::BAD_GATEWAY, "upstream exploded");
        match err {
            UploadError::Api { code, message } => {
                assert_eq!(code, "http_502");
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn kind_segments_match_routes() {
        assert_eq!(kind_segment(AssetKind::Image), "images");
        assert_eq!(kind_segment(AssetKind::Document), "documents");
    }
}
