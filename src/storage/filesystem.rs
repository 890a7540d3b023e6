use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;

use super::{BlobEntry, StorageManager};

/// Local-disk storage rooted at a base directory.
#[derive(Debug)]
pub struct FilesystemStorage {
    base: PathBuf,
}

impl FilesystemStorage {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base.join(path)
    }
}

#[async_trait]
impl StorageManager for FilesystemStorage {
    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.resolve(path))?)
    }

    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let target = self.resolve(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, data)?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.resolve(path).exists())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<BlobEntry>> {
        // Uploads live exactly one level deep (`{owner}/{file}`), so the
        // prefix names a directory and a flat scan of it is sufficient.
        let dir = self.resolve(prefix);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            entries.push(BlobEntry {
                path: format!("{}/{}", prefix, entry.file_name().to_string_lossy()),
                size: metadata.len(),
            });
        }

        // read_dir order is platform-dependent
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }
}
