//! Filesystem-backed object store.
//!
//! Buckets are subdirectories of the root and keys are relative paths inside
//! them. Useful for development runs and tests.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use super::ObjectStore;
use crate::error::{StorageError, StorageResult};

#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path of `bucket/key`. Keys that would escape the bucket
    /// directory are rejected.
    pub fn object_path(&self, bucket: &str, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if bucket.is_empty() || bucket.contains('/') || key.is_empty() || escapes {
            return Err(StorageError::Transport(format!(
                "invalid object location: {}/{}",
                bucket, key
            )));
        }
        Ok(self.root.join(bucket).join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn fetch(&self, bucket: &str, key: &str, dest: &Path) -> StorageResult<()> {
        let src = self.object_path(bucket, key)?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        match tokio::fs::copy(&src, dest).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn upload(&self, src: &Path, bucket: &str, key: &str) -> StorageResult<()> {
        let bucket_dir = self.root.join(bucket);
        if !tokio::fs::try_exists(&bucket_dir).await? {
            return Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }

        let dest = self.object_path(bucket, key)?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(src, &dest).await?;
        Ok(())
    }
}
