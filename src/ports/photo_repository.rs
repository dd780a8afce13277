//! Photo repository port.
//!
//! Status-guarded deletes (`delete_with_status`) and approvals only touch
//! rows still in the expected status, so moderation decisions can be
//! re-applied safely.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OwnerRef, PhotoId};
use crate::domain::media::{NewPhoto, Photo, PhotoStatus};

/// Replacement file details for an existing photo row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoFileUpdate {
    pub url: String,
    pub storage_key: String,
    pub filename: String,
    pub mimetype: String,
}

#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Insert a row and return it with its assigned id.
    async fn insert(&self, photo: NewPhoto) -> Result<Photo, DomainError>;

    /// All photos of an owner, lowest id first.
    async fn find_by_owner(&self, owner: &OwnerRef) -> Result<Vec<Photo>, DomainError>;

    /// Photos of an owner restricted to `ids`. Unknown ids are skipped.
    async fn find_by_ids(
        &self,
        owner: &OwnerRef,
        ids: &[PhotoId],
    ) -> Result<Vec<Photo>, DomainError>;

    /// Number of photos an owner holds (pending and approved).
    async fn count_by_owner(&self, owner: &OwnerRef) -> Result<usize, DomainError>;

    /// Moves the listed `Pending` photos to `Approved`. Returns the ids changed.
    async fn approve(&self, owner: &OwnerRef, ids: &[PhotoId]) -> Result<Vec<PhotoId>, DomainError>;

    /// Deletes the listed photos that are in `status`. Returns the removed rows.
    async fn delete_with_status(
        &self,
        owner: &OwnerRef,
        ids: &[PhotoId],
        status: PhotoStatus,
    ) -> Result<Vec<Photo>, DomainError>;

    /// Deletes every photo of an owner. Returns the removed rows.
    async fn delete_by_owner(&self, owner: &OwnerRef) -> Result<Vec<Photo>, DomainError>;

    /// Points an existing row at a new blob.
    ///
    /// # Errors
    ///
    /// - `PhotoNotFound` if the row is gone
    async fn replace_file(&self, id: PhotoId, file: PhotoFileUpdate) -> Result<Photo, DomainError>;
}
