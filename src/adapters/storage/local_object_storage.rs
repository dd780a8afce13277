//! Filesystem blob store for photos.
//!
//! Files land in `{base_dir}/{folder}/{digest}-{uuid}.{ext}` and are served
//! under `{public_base_url}/{folder}/...`. The digest prefix is the first 16
//! hex chars of the content's SHA-256.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::domain::media::PhotoFile;
use crate::ports::{ObjectStorage, StorageError, StoredObject};

/// Stores photo blobs under a local directory.
pub struct LocalObjectStorage {
    base_dir: PathBuf,
    public_base_url: String,
}

impl LocalObjectStorage {
    pub fn new(base_dir: impl AsRef<Path>, public_base_url: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolves a key to a path, refusing anything that escapes `base_dir`.
    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if safe {
            Ok(self.base_dir.join(relative))
        } else {
            Err(StorageError::InvalidKey(key.to_string()))
        }
    }

    fn extension_for(content_type: &str) -> &'static str {
        match content_type {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            _ => "bin",
        }
    }

    fn digest(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())[..16].to_string()
    }
}

fn io_error(context: &str, e: std::io::Error) -> StorageError {
    if e.kind() == std::io::ErrorKind::PermissionDenied {
        StorageError::PermissionDenied(format!("{}: {}", context, e))
    } else {
        StorageError::IoError(format!("{}: {}", context, e))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(&self, folder: &str, file: &PhotoFile) -> Result<StoredObject, StorageError> {
        let key = format!(
            "{}/{}-{}.{}",
            folder.trim_matches('/'),
            Self::digest(&file.bytes),
            uuid::Uuid::new_v4().simple(),
            Self::extension_for(&file.content_type)
        );
        let path = self.resolve(&key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("Failed to create directory", e))?;
        }

        // Write to a temp file first so readers never see a partial blob.
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &file.bytes)
            .await
            .map_err(|e| io_error("Failed to write temporary file", e))?;
        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| io_error("Failed to rename file", e))?;

        tracing::debug!(key = %key, bytes = file.bytes.len(), "stored photo blob");

        Ok(StoredObject {
            url: format!("{}/{}", self.public_base_url, key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(io_error("Failed to delete file", e)),
        }

        if let Some(parent) = path.parent() {
            // Only succeeds once the folder is empty.
            let _ = fs::remove_dir(parent).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn jpeg(bytes: &[u8]) -> PhotoFile {
        PhotoFile::new("pose.jpg", "image/jpeg", bytes.to_vec())
    }

    #[tokio::test]
    async fn upload_writes_file_and_builds_url() {
        let dir = TempDir::new().unwrap();
        let storage = LocalObjectStorage::new(dir.path(), "http://localhost:8080/files/");

        let stored = storage.upload("sessions/abc", &jpeg(b"hello")).await.unwrap();

        assert!(stored.key.starts_with("sessions/abc/"));
        assert!(stored.key.ends_with(".jpg"));
        assert_eq!(
            stored.url,
            format!("http://localhost:8080/files/{}", stored.key)
        );
        let on_disk = std::fs::read(dir.path().join(&stored.key)).unwrap();
        assert_eq!(on_disk, b"hello");
    }

    #[tokio::test]
    async fn same_content_gets_distinct_keys() {
        let dir = TempDir::new().unwrap();
        let storage = LocalObjectStorage::new(dir.path(), "/files");

        let a = storage.upload("users/u", &jpeg(b"same")).await.unwrap();
        let b = storage.upload("users/u", &jpeg(b"same")).await.unwrap();

        assert_ne!(a.key, b.key);
        assert_eq!(a.key[..24], b.key[..24]);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let storage = LocalObjectStorage::new(dir.path(), "/files");
        let stored = storage.upload("sessions/x", &jpeg(b"bytes")).await.unwrap();

        storage.delete(&stored.key).await.unwrap();
        storage.delete(&stored.key).await.unwrap();

        assert!(!dir.path().join(&stored.key).exists());
    }

    #[tokio::test]
    async fn keys_escaping_base_dir_are_rejected() {
        let dir = TempDir::new().unwrap();
        let storage = LocalObjectStorage::new(dir.path(), "/files");

        assert!(matches!(
            storage.delete("../etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.upload("/abs/..", &jpeg(b"x")).await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
