use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use super::{ObjectStore, StoreError};

/// Buckets as directories under `root`, served back under `/media`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base: String,
}

impl LocalObjectStore {
    /// `public_base` is prepended to `/media/{bucket}/{name}`; pass an empty
    /// string for site-relative URLs.
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn read(&self, bucket: &str, name: &str) -> Result<Bytes, StoreError> {
        let path = self.object_path(bucket, name)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::ObjectNotFound(format!("{}/{}", bucket, name)))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn object_path(&self, bucket: &str, name: &str) -> Result<PathBuf, StoreError> {
        validate_key(bucket)?;
        validate_key(name)?;
        Ok(self.root.join(bucket).join(name))
    }
}

/// Object and bucket names are single path segments.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let invalid = key.is_empty()
        || key.starts_with('.')
        || key.contains("..")
        || key.chars().any(|c| matches!(c, '/' | '\\' | '\0'));
    if invalid {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(&self, bucket: &str, name: &str, data: Bytes) -> Result<(), StoreError> {
        let path = self.object_path(bucket, name)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::ObjectExists(format!("{}/{}", bucket, name)));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(&data).await?;
        file.flush().await?;

        tracing::debug!(bucket, name, bytes = data.len(), "Stored object");
        Ok(())
    }

    fn public_url(&self, bucket: &str, name: &str) -> String {
        format!("{}/media/{}/{}", self.public_base, bucket, name)
    }

    async fn remove(&self, bucket: &str, name: &str) -> Result<(), StoreError> {
        let path = self.object_path(bucket, name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
