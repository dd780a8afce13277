use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::media::PhotoFile;
use crate::ports::{ObjectStorage, StorageError, StoredObject};

/// Blob store kept in a map, with a switch to simulate provider outages.
#[derive(Debug, Clone, Default)]
pub struct InMemoryObjectStorage {
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following upload and delete fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.blobs.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::IoError("storage unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn upload(&self, folder: &str, file: &PhotoFile) -> Result<StoredObject, StorageError> {
        self.check_available()?;
        let key = format!("{}/{}-{}", folder, uuid::Uuid::new_v4(), file.filename);
        self.blobs
            .write()
            .await
            .insert(key.clone(), file.bytes.clone());
        Ok(StoredObject {
            url: format!("memory://{}", key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        self.blobs.write().await.remove(key);
        Ok(())
    }
}
