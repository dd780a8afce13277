//! UploadSessionPhotosHandler - stores a batch of session photos as pending.
//!
//! The batch is checked as a whole (file types, sizes, photo budget) before
//! any blob is written. After that each file is stored on its own: a file
//! whose upload or insert fails is dropped and the rest of the batch still
//! goes to moderation in one `images.session.created` event.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::foundation::{CommandMetadata, OwnerRef, SerializableDomainEvent, SessionId};
use crate::domain::media::{
    ensure_session_capacity, ImagesSessionCreated, MediaError, NewPhoto, Photo, PhotoFile,
    PhotoStatus,
};
use crate::ports::{EventPublisher, ObjectStorage, PhotoRepository};

use super::blob_cleanup::discard_blob;
use super::MediaSettings;

#[derive(Debug, Clone)]
pub struct UploadSessionPhotosCommand {
    pub session_id: SessionId,
    pub files: Vec<PhotoFile>,
}

/// Photos stored by one upload, plus the files that could not be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedBatch {
    pub photos: Vec<Photo>,
    pub failed: Vec<String>,
}

pub struct UploadSessionPhotosHandler {
    photos: Arc<dyn PhotoRepository>,
    storage: Arc<dyn ObjectStorage>,
    event_publisher: Arc<dyn EventPublisher>,
    settings: MediaSettings,
    // Serializes count-then-insert per session within this process.
    session_locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl UploadSessionPhotosHandler {
    pub fn new(
        photos: Arc<dyn PhotoRepository>,
        storage: Arc<dyn ObjectStorage>,
        event_publisher: Arc<dyn EventPublisher>,
        settings: MediaSettings,
    ) -> Self {
        Self {
            photos,
            storage,
            event_publisher,
            settings,
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_for(&self, session_id: SessionId) -> Arc<Mutex<()>> {
        self.session_locks
            .lock()
            .await
            .entry(session_id)
            .or_default()
            .clone()
    }

    async fn release(&self, session_id: SessionId, lock: Arc<Mutex<()>>) {
        let mut locks = self.session_locks.lock().await;
        // map entry plus ours: nobody else is waiting
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&session_id);
        }
    }

    pub async fn handle(
        &self,
        cmd: UploadSessionPhotosCommand,
        metadata: CommandMetadata,
    ) -> Result<UploadedBatch, MediaError> {
        for file in &cmd.files {
            file.validate(self.settings.max_file_bytes)?;
        }

        let lock = self.lock_for(cmd.session_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.store_batch(&cmd, &metadata).await
        };
        self.release(cmd.session_id, lock).await;
        result
    }

    async fn store_batch(
        &self,
        cmd: &UploadSessionPhotosCommand,
        metadata: &CommandMetadata,
    ) -> Result<UploadedBatch, MediaError> {
        let owner = OwnerRef::session(cmd.session_id);
        let existing = self.photos.count_by_owner(&owner).await?;
        ensure_session_capacity(existing, cmd.files.len())?;

        let mut batch = UploadedBatch {
            photos: Vec::with_capacity(cmd.files.len()),
            failed: Vec::new(),
        };
        for file in &cmd.files {
            match self.store_one(owner, file).await {
                Some(photo) => batch.photos.push(photo),
                None => batch.failed.push(file.filename.clone()),
            }
        }

        if batch.photos.is_empty() {
            return Err(MediaError::infrastructure("No photo could be stored"));
        }

        let photo_ids = batch.photos.iter().map(|p| p.id).collect::<Vec<_>>();
        let event = ImagesSessionCreated::new(metadata.user_id, cmd.session_id, photo_ids.clone());
        self.event_publisher
            .publish(metadata.stamp(event.to_envelope()))
            .await?;

        tracing::info!(
            session_id = %cmd.session_id,
            user_id = %metadata.user_id,
            photo_ids = ?photo_ids,
            failed = batch.failed.len(),
            "session photos stored, awaiting moderation"
        );
        Ok(batch)
    }

    async fn store_one(&self, owner: OwnerRef, file: &PhotoFile) -> Option<Photo> {
        let stored = match self
            .storage
            .upload(&self.settings.session_photo_folder, file)
            .await
        {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(
                    owner = %owner,
                    filename = %file.filename,
                    error = %e,
                    "photo upload failed"
                );
                return None;
            }
        };

        let row = NewPhoto {
            owner,
            url: stored.url,
            storage_key: stored.key.clone(),
            filename: file.filename.clone(),
            mimetype: file.content_type.clone(),
            status: PhotoStatus::Pending,
        };
        match self.photos.insert(row).await {
            Ok(photo) => Some(photo),
            Err(e) => {
                tracing::warn!(
                    owner = %owner,
                    filename = %file.filename,
                    error = %e,
                    "photo row insert failed"
                );
                discard_blob(self.storage.as_ref(), &stored.key, "photo insert failed").await;
                None
            }
        }
    }
}
