//! Handlers for a user's single profile photo.
//!
//! Profile photos skip moderation and are stored `Approved`.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, OwnerRef, UserId};
use crate::domain::media::{MediaError, NewPhoto, Photo, PhotoFile, PhotoStatus};
use crate::ports::{ObjectStorage, PhotoFileUpdate, PhotoRepository};

use super::blob_cleanup::{discard_blob, discard_photo_blobs};
use super::MediaSettings;

async fn current_photo(
    photos: &dyn PhotoRepository,
    user_id: UserId,
) -> Result<Option<Photo>, MediaError> {
    Ok(photos
        .find_by_owner(&OwnerRef::user(user_id))
        .await?
        .into_iter()
        .next())
}

fn no_photo(user_id: UserId) -> MediaError {
    MediaError::not_found(format!("No photo stored for user {}", user_id))
}

fn insert_error(err: DomainError) -> MediaError {
    if err.code == ErrorCode::PhotoAlreadyExists {
        MediaError::AlreadyExists
    } else {
        err.into()
    }
}

/// Reads a user's profile photo (the caller's own or anyone's by id).
pub struct GetUserPhotoHandler {
    photos: Arc<dyn PhotoRepository>,
}

impl GetUserPhotoHandler {
    pub fn new(photos: Arc<dyn PhotoRepository>) -> Self {
        Self { photos }
    }

    pub async fn handle(&self, user_id: UserId) -> Result<Photo, MediaError> {
        current_photo(self.photos.as_ref(), user_id)
            .await?
            .ok_or_else(|| no_photo(user_id))
    }
}

/// Stores the first profile photo of a user.
pub struct UploadUserPhotoHandler {
    photos: Arc<dyn PhotoRepository>,
    storage: Arc<dyn ObjectStorage>,
    settings: MediaSettings,
}

impl UploadUserPhotoHandler {
    pub fn new(
        photos: Arc<dyn PhotoRepository>,
        storage: Arc<dyn ObjectStorage>,
        settings: MediaSettings,
    ) -> Self {
        Self {
            photos,
            storage,
            settings,
        }
    }

    pub async fn handle(&self, user_id: UserId, file: PhotoFile) -> Result<Photo, MediaError> {
        file.validate(self.settings.max_file_bytes)?;
        if current_photo(self.photos.as_ref(), user_id).await?.is_some() {
            return Err(MediaError::AlreadyExists);
        }

        let stored = self
            .storage
            .upload(&self.settings.user_photo_folder, &file)
            .await
            .map_err(DomainError::from)?;
        let row = NewPhoto {
            owner: OwnerRef::user(user_id),
            url: stored.url,
            storage_key: stored.key.clone(),
            filename: file.filename,
            mimetype: file.content_type,
            status: PhotoStatus::Approved,
        };
        let photo = match self.photos.insert(row).await {
            Ok(photo) => photo,
            Err(e) => {
                discard_blob(self.storage.as_ref(), &stored.key, "user photo insert failed").await;
                return Err(insert_error(e));
            }
        };

        tracing::info!(user_id = %user_id, photo_id = %photo.id, "user photo stored");
        Ok(photo)
    }
}

/// Swaps the blob behind a user's profile photo.
///
/// The new blob is written first; the old one is removed only after the row
/// points at the new one.
pub struct ReplaceUserPhotoHandler {
    photos: Arc<dyn PhotoRepository>,
    storage: Arc<dyn ObjectStorage>,
    settings: MediaSettings,
}

impl ReplaceUserPhotoHandler {
    pub fn new(
        photos: Arc<dyn PhotoRepository>,
        storage: Arc<dyn ObjectStorage>,
        settings: MediaSettings,
    ) -> Self {
        Self {
            photos,
            storage,
            settings,
        }
    }

    pub async fn handle(&self, user_id: UserId, file: PhotoFile) -> Result<Photo, MediaError> {
        file.validate(self.settings.max_file_bytes)?;
        let current = current_photo(self.photos.as_ref(), user_id)
            .await?
            .ok_or_else(|| no_photo(user_id))?;

        let stored = self
            .storage
            .upload(&self.settings.user_photo_folder, &file)
            .await
            .map_err(DomainError::from)?;
        let update = PhotoFileUpdate {
            url: stored.url,
            storage_key: stored.key.clone(),
            filename: file.filename,
            mimetype: file.content_type,
        };
        let photo = match self.photos.replace_file(current.id, update).await {
            Ok(photo) => photo,
            Err(e) => {
                discard_blob(self.storage.as_ref(), &stored.key, "user photo update failed").await;
                return Err(if e.code == ErrorCode::PhotoNotFound {
                    no_photo(user_id)
                } else {
                    e.into()
                });
            }
        };

        discard_blob(self.storage.as_ref(), &current.storage_key, "user photo replaced").await;
        tracing::info!(user_id = %user_id, photo_id = %photo.id, "user photo replaced");
        Ok(photo)
    }
}

/// Removes a user's profile photo and its blob.
pub struct DeleteUserPhotoHandler {
    photos: Arc<dyn PhotoRepository>,
    storage: Arc<dyn ObjectStorage>,
}

impl DeleteUserPhotoHandler {
    pub fn new(photos: Arc<dyn PhotoRepository>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { photos, storage }
    }

    pub async fn handle(&self, user_id: UserId) -> Result<(), MediaError> {
        let removed = self.photos.delete_by_owner(&OwnerRef::user(user_id)).await?;
        if removed.is_empty() {
            return Err(no_photo(user_id));
        }
        discard_photo_blobs(self.storage.as_ref(), &removed, "user photo deleted").await;
        tracing::info!(user_id = %user_id, "user photo deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryObjectStorage, InMemoryPhotoRepository};

    fn jpeg(name: &str) -> PhotoFile {
        PhotoFile::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF])
    }

    fn setup() -> (Arc<InMemoryPhotoRepository>, Arc<InMemoryObjectStorage>) {
        (
            Arc::new(InMemoryPhotoRepository::new()),
            Arc::new(InMemoryObjectStorage::new()),
        )
    }

    #[tokio::test]
    async fn upload_stores_approved_photo_once() {
        let (photos, storage) = setup();
        let handler =
            UploadUserPhotoHandler::new(photos.clone(), storage.clone(), MediaSettings::default());
        let user_id = UserId::new();

        let photo = handler.handle(user_id, jpeg("me.jpg")).await.unwrap();
        assert_eq!(photo.status, PhotoStatus::Approved);
        assert!(photo.storage_key.starts_with("users/"));

        let err = handler.handle(user_id, jpeg("again.jpg")).await.unwrap_err();
        assert_eq!(err, MediaError::AlreadyExists);
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn replace_swaps_blob_and_keeps_row() {
        let (photos, storage) = setup();
        let user_id = UserId::new();
        let original =
            UploadUserPhotoHandler::new(photos.clone(), storage.clone(), MediaSettings::default())
                .handle(user_id, jpeg("old.jpg"))
                .await
                .unwrap();

        let replaced =
            ReplaceUserPhotoHandler::new(photos.clone(), storage.clone(), MediaSettings::default())
                .handle(user_id, jpeg("new.jpg"))
                .await
                .unwrap();

        assert_eq!(replaced.id, original.id);
        assert_eq!(replaced.filename, "new.jpg");
        assert!(!storage.contains(&original.storage_key).await);
        assert!(storage.contains(&replaced.storage_key).await);
    }

    #[tokio::test]
    async fn replace_without_photo_is_not_found_and_stores_nothing() {
        let (photos, storage) = setup();
        let err = ReplaceUserPhotoHandler::new(photos, storage.clone(), MediaSettings::default())
            .handle(UserId::new(), jpeg("x.jpg"))
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::NotFound(_)));
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn delete_removes_row_and_blob() {
        let (photos, storage) = setup();
        let user_id = UserId::new();
        UploadUserPhotoHandler::new(photos.clone(), storage.clone(), MediaSettings::default())
            .handle(user_id, jpeg("me.jpg"))
            .await
            .unwrap();
        let handler = DeleteUserPhotoHandler::new(photos.clone(), storage.clone());

        handler.handle(user_id).await.unwrap();

        assert!(storage.is_empty().await);
        assert!(matches!(
            GetUserPhotoHandler::new(photos).handle(user_id).await,
            Err(MediaError::NotFound(_))
        ));
        assert!(matches!(handler.handle(user_id).await, Err(MediaError::NotFound(_))));
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let (photos, storage) = setup();
        let settings = MediaSettings {
            max_file_bytes: 2,
            ..Default::default()
        };
        let err = UploadUserPhotoHandler::new(photos, storage, settings)
            .handle(UserId::new(), jpeg("big.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::ValidationFailed { .. }));
    }
}
