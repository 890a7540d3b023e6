//! Blob storage backends for uploaded dataset files.

use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;

pub mod filesystem;
pub mod s3;

// Re-exports
pub use filesystem::FilesystemStorage;
pub use s3::S3Storage;

/// A stored blob, as returned by [`StorageManager::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobEntry {
    /// Backend-relative key, e.g. `user.../sales.csv`.
    pub path: String,
    pub size: u64,
}

/// Backend-agnostic blob store.
///
/// Keys are relative paths as produced by [`StorageManager::object_path`];
/// each backend maps them onto its own root (a base directory, a bucket).
#[async_trait]
pub trait StorageManager: Debug + Send + Sync {
    /// Key under which an owner's uploaded file lives. Owner-scoped so a
    /// prefix listing yields exactly one account's blobs.
    fn object_path(&self, owner_id: &str, filename: &str) -> String {
        format!("{}/{}", owner_id, filename)
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>>;
    async fn write(&self, path: &str, data: &[u8]) -> Result<()>;
    async fn exists(&self, path: &str) -> Result<bool>;

    /// List every blob under `prefix`. The prefix is matched at path-segment
    /// granularity: `user1` matches `user1/a.csv` but not `user10/b.csv`.
    async fn list(&self, prefix: &str) -> Result<Vec<BlobEntry>>;

    /// Total bytes stored under `prefix`.
    async fn usage(&self, prefix: &str) -> Result<u64> {
        let entries = self.list(prefix).await?;
        Ok(entries.iter().map(|entry| entry.size).sum())
    }
}
