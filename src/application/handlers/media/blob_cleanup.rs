//! Best-effort removal of blobs whose rows are gone or were never written.

use crate::domain::media::Photo;
use crate::ports::ObjectStorage;

/// Deletes `key`, logging instead of failing.
pub(crate) async fn discard_blob(storage: &dyn ObjectStorage, key: &str, reason: &'static str) {
    if let Err(e) = storage.delete(key).await {
        tracing::warn!(
            storage_key = %key,
            reason,
            error = %e,
            "failed to delete blob, it is now orphaned"
        );
    }
}

/// Deletes the blobs behind `photos`.
pub(crate) async fn discard_photo_blobs(
    storage: &dyn ObjectStorage,
    photos: &[Photo],
    reason: &'static str,
) {
    for photo in photos {
        discard_blob(storage, &photo.storage_key, reason).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryObjectStorage;
    use crate::domain::media::PhotoFile;

    #[tokio::test]
    async fn storage_failures_are_swallowed() {
        let storage = InMemoryObjectStorage::new();
        let stored = storage
            .upload("sessions", &PhotoFile::new("a.png", "image/png", vec![1]))
            .await
            .unwrap();
        storage.set_failing(true);

        discard_blob(&storage, &stored.key, "test").await;

        storage.set_failing(false);
        assert!(storage.contains(&stored.key).await);
        discard_blob(&storage, &stored.key, "test").await;
        assert!(!storage.contains(&stored.key).await);
    }
}
