//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Lifetime of presigned upload credentials in seconds.
    #[serde(default = "default_presign_ttl_secs")]
    pub presign_ttl_secs: u64,
    /// Maximum accepted source file size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Value recorded as `created_by` on committed assets.
    #[serde(default = "default_created_by")]
    pub created_by: String,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_presign_ttl_secs() -> u64 {
    crate::DEFAULT_PRESIGN_TTL_SECS
}

fn default_max_upload_bytes() -> u64 {
    crate::DEFAULT_MAX_UPLOAD_BYTES
}

fn default_created_by() -> String {
    "system".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            presign_ttl_secs: default_presign_ttl_secs(),
            max_upload_bytes: default_max_upload_bytes(),
            created_by: default_created_by(),
        }
    }
}

impl ServerConfig {
    /// Get the presign TTL as a Duration.
    pub fn presign_ttl(&self) -> Duration {
        Duration::from_secs(self.presign_ttl_secs)
    }
}

/// Storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (tests and local development only).
    Memory,
    /// S3-compatible storage.
    S3 {
        /// Bucket name.
        bucket: String,
        /// Optional endpoint URL (for MinIO, LocalStack, etc.).
        endpoint: Option<String>,
        /// AWS region.
        region: Option<String>,
        /// Optional key prefix.
        prefix: Option<String>,
        /// AWS access key ID. Falls back to AWS_ACCESS_KEY_ID env var if not set.
        /// WARNING: Prefer env vars or IAM roles over storing secrets in config files.
        access_key_id: Option<String>,
        /// AWS secret access key. Falls back to AWS_SECRET_ACCESS_KEY env var if not set.
        /// WARNING: Prefer env vars or IAM roles over storing secrets in config files.
        secret_access_key: Option<String>,
        /// Force path-style URLs (e.g., `endpoint/bucket/key`).
        /// Required for MinIO and some S3-compatible services.
        #[serde(default)]
        force_path_style: bool,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Memory
    }
}

impl StorageConfig {
    /// Validate storage configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StorageConfig::S3 {
                access_key_id,
                secret_access_key,
                ..
            } => match (access_key_id.as_ref(), secret_access_key.as_ref()) {
                (Some(_), Some(_)) | (None, None) => Ok(()),
                _ => Err(
                    "s3 config requires both access_key_id and secret_access_key when either is set"
                        .to_string(),
                ),
            },
            StorageConfig::Memory => Ok(()),
        }
    }
}

/// Metadata store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// SQLite database.
    Sqlite {
        /// Database file path.
        path: PathBuf,
    },
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/metadata.db"),
        }
    }
}

/// Public delivery configuration for committed assets.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Base URL objects are served from (CDN or bucket website endpoint).
    #[serde(default = "default_delivery_base_url")]
    pub base_url: String,
}

fn default_delivery_base_url() -> String {
    "http://localhost:9000/assets".to_string()
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            base_url: default_delivery_base_url(),
        }
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Metadata store configuration.
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// Delivery configuration.
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

impl AppConfig {
    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses in-memory storage and a local SQLite path.
    pub fn for_testing() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.presign_ttl(), Duration::from_secs(900));
        assert_eq!(config.created_by, "system");
    }

    #[test]
    fn storage_config_s3_roundtrip_without_credentials() {
        let config = StorageConfig::S3 {
            bucket: "bucket".to_string(),
            endpoint: Some("http://localhost:9000".to_string()),
            region: Some("ca-central-1".to_string()),
            prefix: Some("assets".to_string()),
            access_key_id: None,
            secret_access_key: None,
            force_path_style: true,
        };

        let json = serde_json::to_string(&config).unwrap();
        let decoded: StorageConfig = serde_json::from_str(&json).unwrap();

        match decoded {
            StorageConfig::S3 {
                access_key_id,
                secret_access_key,
                force_path_style,
                ..
            } => {
                assert!(access_key_id.is_none());
                assert!(secret_access_key.is_none());
                assert!(force_path_style);
            }
            _ => panic!("expected S3 config"),
        }
    }

    #[test]
    fn storage_config_s3_validate_partial_credentials() {
        let invalid = StorageConfig::S3 {
            bucket: "bucket".to_string(),
            endpoint: None,
            region: None,
            prefix: None,
            access_key_id: Some("access-key".to_string()),
            secret_access_key: None,
            force_path_style: false,
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn app_config_deserializes_from_empty_input() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert!(matches!(config.storage, StorageConfig::Memory));
        assert!(matches!(config.metadata, MetadataConfig::Sqlite { .. }));
    }
}
