//! Metadata store trait and SQLite implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::repos::{AssetRepo, ResourceRepo};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: ResourceRepo + AssetRepo + Send + Sync {
    /// Run database migrations.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS resources (
    rec_resource_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    closest_community TEXT
);

CREATE TABLE IF NOT EXISTS assets (
    asset_id TEXT PRIMARY KEY,
    rec_resource_id TEXT NOT NULL REFERENCES resources(rec_resource_id),
    kind TEXT NOT NULL,
    display_name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    created_by TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_assets_resource_kind
    ON assets(rec_resource_id, kind, created_at);

CREATE TABLE IF NOT EXISTS asset_variants (
    asset_id TEXT NOT NULL REFERENCES assets(asset_id),
    size_code TEXT NOT NULL,
    extension TEXT NOT NULL,
    size_bytes INTEGER NOT NULL,
    storage_key TEXT NOT NULL,
    PRIMARY KEY (asset_id, size_code)
);
"#;

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Create a new SQLite store and run migrations.
    pub async fn new(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // SQLite permits limited write concurrency; using a single connection avoids
            // persistent "database is locked" failures under test/axum concurrency.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

mod sqlite_impl {
    use super::*;
    use crate::models::{AssetRow, AssetVariantRow, AssetWithVariants, ResourceRow};

    #[async_trait]
    impl ResourceRepo for SqliteStore {
        #[tracing::instrument(skip(self, resource), fields(rec_resource_id = %resource.rec_resource_id))]
        async fn create_resource(&self, resource: &ResourceRow) -> MetadataResult<()> {
            if self.resource_exists(&resource.rec_resource_id).await? {
                return Err(MetadataError::AlreadyExists(format!(
                    "rec_resource_id {} already exists",
                    resource.rec_resource_id
                )));
            }

            sqlx::query(
                "INSERT INTO resources (rec_resource_id, name, closest_community) VALUES (?, ?, ?)",
            )
            .bind(&resource.rec_resource_id)
            .bind(&resource.name)
            .bind(&resource.closest_community)
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        async fn get_resource(
            &self,
            rec_resource_id: &str,
        ) -> MetadataResult<Option<ResourceRow>> {
            let row = sqlx::query_as::<_, ResourceRow>(
                "SELECT * FROM resources WHERE rec_resource_id = ?",
            )
            .bind(rec_resource_id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn resource_exists(&self, rec_resource_id: &str) -> MetadataResult<bool> {
            let row: Option<(i32,)> =
                sqlx::query_as("SELECT 1 FROM resources WHERE rec_resource_id = ?")
                    .bind(rec_resource_id)
                    .fetch_optional(&self.pool)
                    .await?;
            Ok(row.is_some())
        }
    }

    #[async_trait]
    impl AssetRepo for SqliteStore {
        #[tracing::instrument(skip(self, asset, variants), fields(asset_id = %asset.asset_id))]
        async fn create_asset(
            &self,
            asset: &AssetRow,
            variants: &[AssetVariantRow],
        ) -> MetadataResult<()> {
            // Single transaction: the asset row and every variant row land
            // together or not at all.
            let mut tx = self.pool.begin().await?;

            let existing: Option<(i32,)> =
                sqlx::query_as("SELECT 1 FROM assets WHERE asset_id = ?")
                    .bind(&asset.asset_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if existing.is_some() {
                return Err(MetadataError::AlreadyExists(format!(
                    "asset_id {} already committed",
                    asset.asset_id
                )));
            }

            sqlx::query(
                r#"
                INSERT INTO assets (asset_id, rec_resource_id, kind, display_name, created_at, created_by)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&asset.asset_id)
            .bind(&asset.rec_resource_id)
            .bind(&asset.kind)
            .bind(&asset.display_name)
            .bind(asset.created_at)
            .bind(&asset.created_by)
            .execute(&mut *tx)
            .await?;

            for variant in variants {
                sqlx::query(
                    r#"
                    INSERT INTO asset_variants (asset_id, size_code, extension, size_bytes, storage_key)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&variant.asset_id)
                .bind(&variant.size_code)
                .bind(&variant.extension)
                .bind(variant.size_bytes)
                .bind(&variant.storage_key)
                .execute(&mut *tx)
                .await?;
            }

            tx.commit().await?;
            Ok(())
        }

        async fn get_asset(&self, asset_id: &str) -> MetadataResult<Option<AssetRow>> {
            let row = sqlx::query_as::<_, AssetRow>("SELECT * FROM assets WHERE asset_id = ?")
                .bind(asset_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn get_asset_variants(
            &self,
            asset_id: &str,
        ) -> MetadataResult<Vec<AssetVariantRow>> {
            let rows = sqlx::query_as::<_, AssetVariantRow>(
                "SELECT * FROM asset_variants WHERE asset_id = ? ORDER BY size_code",
            )
            .bind(asset_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }

        async fn list_assets(
            &self,
            rec_resource_id: &str,
            kind: &str,
        ) -> MetadataResult<Vec<AssetWithVariants>> {
            let assets = sqlx::query_as::<_, AssetRow>(
                "SELECT * FROM assets WHERE rec_resource_id = ? AND kind = ? ORDER BY created_at DESC, asset_id",
            )
            .bind(rec_resource_id)
            .bind(kind)
            .fetch_all(&self.pool)
            .await?;

            let mut result = Vec::with_capacity(assets.len());
            for asset in assets {
                let variants = self.get_asset_variants(&asset.asset_id).await?;
                result.push(AssetWithVariants { asset, variants });
            }
            Ok(result)
        }

        #[tracing::instrument(skip(self))]
        async fn delete_asset(&self, asset_id: &str) -> MetadataResult<()> {
            let mut tx = self.pool.begin().await?;

            sqlx::query("DELETE FROM asset_variants WHERE asset_id = ?")
                .bind(asset_id)
                .execute(&mut *tx)
                .await?;

            let result = sqlx::query("DELETE FROM assets WHERE asset_id = ?")
                .bind(asset_id)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                return Err(MetadataError::NotFound(format!(
                    "asset_id {} not found",
                    asset_id
                )));
            }

            tx.commit().await?;
            Ok(())
        }
    }
}
