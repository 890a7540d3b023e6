use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::auth::{AuthSettings, IdentityProvider};
use crate::catalog::{CatalogManager, DatasetRecord, SqliteCatalogManager};
use crate::datasets::{check_format, check_quota, check_size, validate_filename, DatasetError};
use crate::id::generate_dataset_id;
use crate::storage::{FilesystemStorage, S3Storage, StorageManager};
use crate::tabular::{
    parse_table, profile_columns, run_chart, run_query, ChartSpec, ColumnProfile, QuerySpec, Table,
    TabularFormat,
};

/// Default insecure token signing secret for development use only.
/// This value is publicly known and provides NO security.
const DEFAULT_INSECURE_SECRET: &str = "insecure-dev-secret-do-not-use-in-production";

/// Default access token lifetime in minutes.
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// One page of a dataset read: the requested rows plus column profiles
/// computed over the full table.
#[derive(Debug)]
pub struct DatasetView {
    pub rows: Vec<Map<String, Value>>,
    pub total: usize,
    pub columns: Vec<ColumnProfile>,
}

/// The main engine that ties the catalog, blob storage, and identity
/// provider together.
pub struct DeckEngine {
    catalog: Arc<dyn CatalogManager>,
    storage: Arc<dyn StorageManager>,
    identity: IdentityProvider,
}

impl DeckEngine {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create an engine with default settings at the given base directory.
    ///
    /// Uses a SQLite catalog at {base_dir}/metadata.db and filesystem storage
    /// at {base_dir}/blobs.
    pub async fn defaults(base_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::builder().base_dir(base_dir).build().await
    }

    /// Create a builder for more control over engine configuration.
    pub fn builder() -> DeckEngineBuilder {
        DeckEngineBuilder::new()
    }

    /// Create a new engine from application configuration.
    ///
    /// For the sqlite catalog and filesystem storage, the builder handles
    /// defaults. This method only creates explicit storage for non-default
    /// backends (s3).
    pub async fn from_config(config: &crate::config::AppConfig) -> Result<Self> {
        let mut builder = DeckEngine::builder();

        if let Some(base) = &config.paths.base_dir {
            builder = builder.base_dir(PathBuf::from(base));
        }
        if let Some(blobs) = &config.paths.blob_dir {
            builder = builder.blob_dir(PathBuf::from(blobs));
        }
        if let Some(key) = &config.auth.secret_key {
            builder = builder.secret_key(key);
        }
        if let Some(ttl) = config.auth.token_ttl_minutes {
            builder = builder.token_ttl_minutes(ttl);
        }

        if config.storage.storage_type != "filesystem" {
            let storage = Self::create_storage_from_config(config)?;
            builder = builder.storage(storage);
        }

        builder.build().await
    }

    /// Create a storage manager from config (for non-filesystem backends).
    fn create_storage_from_config(
        config: &crate::config::AppConfig,
    ) -> Result<Arc<dyn StorageManager>> {
        match config.storage.storage_type.as_str() {
            "s3" => {
                let bucket = config
                    .storage
                    .bucket
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("S3 storage requires bucket"))?;

                // Custom endpoint (MinIO/localstack) uses path-style URLs
                if let Some(endpoint) = &config.storage.endpoint {
                    let access_key = config
                        .storage
                        .access_key
                        .clone()
                        .or_else(|| std::env::var("AWS_ACCESS_KEY_ID").ok())
                        .unwrap_or_else(|| "minioadmin".to_string());
                    let secret_key = config
                        .storage
                        .secret_key
                        .clone()
                        .or_else(|| std::env::var("AWS_SECRET_ACCESS_KEY").ok())
                        .unwrap_or_else(|| "minioadmin".to_string());
                    let allow_http = endpoint.starts_with("http://");

                    Ok(Arc::new(S3Storage::new_with_config(
                        bucket,
                        endpoint,
                        &access_key,
                        &secret_key,
                        allow_http,
                    )?))
                } else {
                    Ok(Arc::new(S3Storage::new(
                        bucket,
                        config.storage.region.as_deref(),
                    )?))
                }
            }
            _ => anyhow::bail!("Unsupported storage type: {}", config.storage.storage_type),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get a cloned catalog manager that shares the same underlying connection.
    pub fn catalog(&self) -> Arc<dyn CatalogManager> {
        self.catalog.clone()
    }

    /// Get a reference to the storage manager.
    pub fn storage(&self) -> &Arc<dyn StorageManager> {
        &self.storage
    }

    /// Identity operations: registration, login, token validation, account
    /// management.
    pub fn identity(&self) -> &IdentityProvider {
        &self.identity
    }

    /// Shutdown the engine and close all connections.
    /// This should be called before the application exits to ensure proper cleanup.
    pub async fn shutdown(&self) -> Result<()> {
        self.catalog.close().await
    }

    // =========================================================================
    // Dataset operations
    // =========================================================================

    /// Admit, store, and record an uploaded file.
    ///
    /// Checks run in a fixed order so the first failure names the cheapest
    /// broken precondition: filename, extension, size cap, then the owner
    /// quota (the only check that needs a storage listing). The blob is
    /// written before the catalog row; a failed insert leaves the blob
    /// behind, where the next upload of the same name overwrites it.
    #[tracing::instrument(
        name = "upload_dataset",
        skip(self, data),
        fields(
            datadeck.owner_id = %owner_id,
            datadeck.filename = %filename,
            datadeck.size_bytes = data.len(),
            datadeck.dataset_id = tracing::field::Empty,
        )
    )]
    pub async fn upload_dataset(
        &self,
        owner_id: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<DatasetRecord, DatasetError> {
        validate_filename(filename).map_err(DatasetError::InvalidFilename)?;
        check_format(filename).map_err(DatasetError::Admission)?;
        check_size(data.len() as u64).map_err(DatasetError::Admission)?;

        let usage = self
            .storage
            .usage(owner_id)
            .await
            .map_err(DatasetError::Storage)?;
        check_quota(usage, data.len() as u64).map_err(DatasetError::Admission)?;

        let storage_path = self.storage.object_path(owner_id, filename);
        self.storage
            .write(&storage_path, data)
            .await
            .map_err(DatasetError::Storage)?;

        let record = DatasetRecord {
            id: generate_dataset_id(),
            owner_id: owner_id.to_string(),
            name: filename.to_string(),
            storage_path,
            created_at: Utc::now(),
        };
        self.catalog
            .create_dataset(&record)
            .await
            .map_err(DatasetError::Catalog)?;

        tracing::Span::current().record("datadeck.dataset_id", record.id.as_str());
        info!("Dataset '{}' uploaded", record.name);

        Ok(record)
    }

    /// List the owner's datasets, newest first.
    pub async fn list_datasets(&self, owner_id: &str) -> Result<Vec<DatasetRecord>, DatasetError> {
        self.catalog
            .list_datasets_for_owner(owner_id)
            .await
            .map_err(DatasetError::Catalog)
    }

    /// Read one page of a dataset: profile the columns over the full table,
    /// then run search, filters, sort, and pagination over the rows.
    #[tracing::instrument(
        name = "dataset_view",
        skip(self, spec),
        fields(
            datadeck.owner_id = %owner_id,
            datadeck.dataset_id = %dataset_id,
            datadeck.rows_returned = tracing::field::Empty,
        )
    )]
    pub async fn dataset_view(
        &self,
        owner_id: &str,
        dataset_id: &str,
        spec: &QuerySpec,
    ) -> Result<DatasetView, DatasetError> {
        let table = self.load_table(owner_id, dataset_id).await?;
        let columns = profile_columns(&table);
        let output = run_query(&table, spec);

        tracing::Span::current().record("datadeck.rows_returned", output.rows.len());

        Ok(DatasetView {
            rows: output.rows,
            total: output.total,
            columns,
        })
    }

    /// Group and count a dataset's rows for a chart.
    #[tracing::instrument(
        name = "dataset_chart",
        skip(self, spec),
        fields(
            datadeck.owner_id = %owner_id,
            datadeck.dataset_id = %dataset_id,
            datadeck.chart_type = %spec.chart_type,
        )
    )]
    pub async fn dataset_chart(
        &self,
        owner_id: &str,
        dataset_id: &str,
        spec: &ChartSpec,
    ) -> Result<Vec<Map<String, Value>>, DatasetError> {
        let table = self.load_table(owner_id, dataset_id).await?;
        run_chart(&table, spec).map_err(DatasetError::Chart)
    }

    /// Fetch a dataset's blob and parse it, scoped to the owner. A dataset
    /// belonging to someone else is indistinguishable from a missing one.
    async fn load_table(&self, owner_id: &str, dataset_id: &str) -> Result<Table, DatasetError> {
        let record = self
            .catalog
            .get_dataset_for_owner(dataset_id, owner_id)
            .await
            .map_err(DatasetError::Catalog)?
            .ok_or_else(|| DatasetError::NotFound(dataset_id.to_string()))?;

        let format = TabularFormat::from_filename(&record.storage_path).ok_or_else(|| {
            DatasetError::Storage(anyhow::anyhow!(
                "stored file '{}' has no recognized extension",
                record.storage_path
            ))
        })?;

        let bytes = self
            .storage
            .read(&record.storage_path)
            .await
            .map_err(DatasetError::Storage)?;

        parse_table(format, &bytes).map_err(DatasetError::Parse)
    }
}

/// Builder for [`DeckEngine`] instances.
pub struct DeckEngineBuilder {
    base_dir: Option<PathBuf>,
    blob_dir: Option<PathBuf>,
    catalog: Option<Arc<dyn CatalogManager>>,
    storage: Option<Arc<dyn StorageManager>>,
    secret_key: Option<String>,
    token_ttl_minutes: i64,
}

impl Default for DeckEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DeckEngineBuilder {
    pub fn new() -> Self {
        Self {
            base_dir: None,
            blob_dir: None,
            catalog: None,
            storage: None,
            secret_key: std::env::var("DATADECK_SECRET_KEY").ok(),
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
        }
    }

    /// Set the base directory for all DataDeck data.
    /// Defaults to ./.datadeck if not set.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Set a custom directory for uploaded files.
    /// Defaults to {base_dir}/blobs if not set.
    pub fn blob_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.blob_dir = Some(dir.into());
        self
    }

    /// Set a custom catalog manager.
    /// If not set, creates a SQLite catalog at {base_dir}/metadata.db
    pub fn catalog(mut self, catalog: Arc<dyn CatalogManager>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set a custom storage manager.
    /// If not set, creates filesystem storage at {blob_dir}
    pub fn storage(mut self, storage: Arc<dyn StorageManager>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set the token signing secret.
    /// If not set, falls back to the DATADECK_SECRET_KEY environment variable.
    /// If neither is set, uses a default insecure secret (with loud warnings).
    pub fn secret_key(mut self, key: impl Into<String>) -> Self {
        self.secret_key = Some(key.into());
        self
    }

    /// Set the access token lifetime. Defaults to 30 minutes. Minimum value
    /// is 1 (smaller values are clamped).
    pub fn token_ttl_minutes(mut self, minutes: i64) -> Self {
        self.token_ttl_minutes = minutes.max(1);
        self
    }

    /// Resolve the base directory, using default if not set.
    fn resolve_base_dir(&self) -> PathBuf {
        self.base_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(".datadeck"))
    }

    /// Resolve the blob directory, using default if not set.
    fn resolve_blob_dir(&self, base_dir: &Path) -> PathBuf {
        self.blob_dir
            .clone()
            .unwrap_or_else(|| base_dir.join("blobs"))
    }

    pub async fn build(self) -> Result<DeckEngine> {
        // Step 1: Resolve directories
        let base_dir = self.resolve_base_dir();
        let blob_dir = self.resolve_blob_dir(&base_dir);

        // Step 2: Ensure directories exist
        std::fs::create_dir_all(&base_dir)?;
        std::fs::create_dir_all(&blob_dir)?;

        // Step 3: Create catalog if not provided
        let catalog: Arc<dyn CatalogManager> = match self.catalog {
            Some(c) => c,
            None => {
                let catalog_path = base_dir.join("metadata.db");
                Arc::new(
                    SqliteCatalogManager::new(
                        catalog_path
                            .to_str()
                            .ok_or_else(|| anyhow::anyhow!("Invalid catalog path"))?,
                    )
                    .await?,
                )
            }
        };

        // Step 4: Create storage if not provided
        let storage: Arc<dyn StorageManager> = match self.storage {
            Some(s) => s,
            None => Arc::new(FilesystemStorage::new(blob_dir)),
        };

        // Step 5: Resolve the token signing secret
        let (secret_key, using_default_secret) = match self.secret_key {
            Some(key) => (key, false),
            None => (DEFAULT_INSECURE_SECRET.to_string(), true),
        };

        if using_default_secret {
            warn!("Using the default INSECURE token signing secret.");
            warn!("Tokens signed with it can be forged by anyone who reads the source.");
            warn!("Set DATADECK_SECRET_KEY or auth.secret_key before deploying.");
        }

        let identity = IdentityProvider::new(
            catalog.clone(),
            AuthSettings {
                secret_key,
                token_ttl_minutes: self.token_ttl_minutes,
            },
        );

        Ok(DeckEngine {
            catalog,
            storage,
            identity,
        })
    }
}
