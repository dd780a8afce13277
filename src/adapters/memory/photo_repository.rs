use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, OwnerRef, OwnerType, PhotoId, Timestamp};
use crate::domain::media::{NewPhoto, Photo, PhotoStatus};
use crate::ports::{PhotoFileUpdate, PhotoRepository};

#[derive(Debug, Default)]
struct Rows {
    next_id: i64,
    photos: BTreeMap<PhotoId, Photo>,
}

/// In-memory photo store with sequential ids.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPhotoRepository {
    rows: Arc<RwLock<Rows>>,
}

impl InMemoryPhotoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored photo, lowest id first.
    pub async fn all(&self) -> Vec<Photo> {
        self.rows.read().await.photos.values().cloned().collect()
    }
}

#[async_trait]
impl PhotoRepository for InMemoryPhotoRepository {
    async fn insert(&self, photo: NewPhoto) -> Result<Photo, DomainError> {
        let mut rows = self.rows.write().await;
        // one profile photo per user, like the partial unique index in Postgres
        if photo.owner.owner_type == OwnerType::User
            && rows.photos.values().any(|p| p.owner == photo.owner)
        {
            return Err(DomainError::new(
                ErrorCode::PhotoAlreadyExists,
                format!("Photo already exists for {}", photo.owner),
            ));
        }
        rows.next_id += 1;
        let stored = Photo::from_new(PhotoId::new(rows.next_id), photo, Timestamp::now());
        rows.photos.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_owner(&self, owner: &OwnerRef) -> Result<Vec<Photo>, DomainError> {
        Ok(self
            .rows
            .read()
            .await
            .photos
            .values()
            .filter(|p| &p.owner == owner)
            .cloned()
            .collect())
    }

    async fn find_by_ids(
        &self,
        owner: &OwnerRef,
        ids: &[PhotoId],
    ) -> Result<Vec<Photo>, DomainError> {
        Ok(self
            .rows
            .read()
            .await
            .photos
            .values()
            .filter(|p| &p.owner == owner && ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn count_by_owner(&self, owner: &OwnerRef) -> Result<usize, DomainError> {
        Ok(self
            .rows
            .read()
            .await
            .photos
            .values()
            .filter(|p| &p.owner == owner)
            .count())
    }

    async fn approve(
        &self,
        owner: &OwnerRef,
        ids: &[PhotoId],
    ) -> Result<Vec<PhotoId>, DomainError> {
        let mut rows = self.rows.write().await;
        let mut approved = Vec::new();
        for photo in rows.photos.values_mut() {
            if &photo.owner == owner
                && ids.contains(&photo.id)
                && photo.status == PhotoStatus::Pending
            {
                photo.status = PhotoStatus::Approved;
                approved.push(photo.id);
            }
        }
        Ok(approved)
    }

    async fn delete_with_status(
        &self,
        owner: &OwnerRef,
        ids: &[PhotoId],
        status: PhotoStatus,
    ) -> Result<Vec<Photo>, DomainError> {
        let mut rows = self.rows.write().await;
        let doomed: Vec<PhotoId> = rows
            .photos
            .values()
            .filter(|p| &p.owner == owner && ids.contains(&p.id) && p.status == status)
            .map(|p| p.id)
            .collect();
        Ok(doomed
            .iter()
            .filter_map(|id| rows.photos.remove(id))
            .collect())
    }

    async fn delete_by_owner(&self, owner: &OwnerRef) -> Result<Vec<Photo>, DomainError> {
        let mut rows = self.rows.write().await;
        let doomed: Vec<PhotoId> = rows
            .photos
            .values()
            .filter(|p| &p.owner == owner)
            .map(|p| p.id)
            .collect();
        Ok(doomed
            .iter()
            .filter_map(|id| rows.photos.remove(id))
            .collect())
    }

    async fn replace_file(&self, id: PhotoId, file: PhotoFileUpdate) -> Result<Photo, DomainError> {
        let mut rows = self.rows.write().await;
        let photo = rows.photos.get_mut(&id).ok_or_else(|| {
            DomainError::new(ErrorCode::PhotoNotFound, format!("Photo not found: {}", id))
        })?;
        photo.url = file.url;
        photo.storage_key = file.storage_key;
        photo.filename = file.filename;
        photo.mimetype = file.mimetype;
        Ok(photo.clone())
    }
}
