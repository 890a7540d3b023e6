use anyhow::Result;
use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::{path::Path as ObjectPath, ObjectStore};
use std::fmt;
use std::sync::Arc;

use super::{BlobEntry, StorageManager};

pub struct S3Storage {
    bucket: String,
    store: Arc<dyn ObjectStore>,
}

impl S3Storage {
    /// Create S3 storage using credentials from the environment.
    pub fn new(bucket: &str, region: Option<&str>) -> Result<Self> {
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
        if let Some(region) = region {
            builder = builder.with_region(region);
        }
        let store = builder.build()?;

        Ok(Self {
            bucket: bucket.to_string(),
            store: Arc::new(store),
        })
    }

    /// Create S3 storage with a custom endpoint for MinIO/S3-compatible
    /// servers. Uses path-style URLs, which MinIO requires.
    pub fn new_with_config(
        bucket: &str,
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
        allow_http: bool,
    ) -> Result<Self> {
        let store = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_endpoint(endpoint)
            .with_access_key_id(access_key)
            .with_secret_access_key(secret_key)
            .with_allow_http(allow_http)
            .with_virtual_hosted_style_request(false)
            .build()?;

        Ok(Self {
            bucket: bucket.to_string(),
            store: Arc::new(store),
        })
    }
}

impl fmt::Debug for S3Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Storage")
            .field("bucket", &self.bucket)
            .finish()
    }
}

#[async_trait]
impl StorageManager for S3Storage {
    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let result = self.store.get(&ObjectPath::from(path)).await?;
        let bytes = result.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        self.store
            .put(&ObjectPath::from(path), data.to_vec().into())
            .await?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        match self.store.head(&ObjectPath::from(path)).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<BlobEntry>> {
        let prefix = ObjectPath::from(prefix);
        let objects: Vec<_> = self.store.list(Some(&prefix)).try_collect().await?;

        let mut entries: Vec<BlobEntry> = objects
            .into_iter()
            .map(|meta| BlobEntry {
                path: meta.location.to_string(),
                size: meta.size as u64,
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }
}
