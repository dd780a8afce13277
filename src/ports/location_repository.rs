//! Location repository port.
//!
//! At most one record exists per `(owner_id, owner_type)`. `upsert` must be
//! atomic per key: concurrent writers for the same owner never produce two
//! rows or a half-written one.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OwnerRef};
use crate::domain::location::{Location, LocationWrite, NearbyLocation, NearestQuery};

/// Result of an upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted {
    pub location: Location,
    /// `true` if no record existed for the key before this write.
    pub created: bool,
}

#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Find the record stored for an owner.
    async fn find_by_owner(&self, owner: &OwnerRef) -> Result<Option<Location>, DomainError>;

    /// Insert a record for an owner that has none.
    ///
    /// # Errors
    ///
    /// - `LocationAlreadyExists` if the key is taken
    async fn insert(&self, owner: &OwnerRef, write: LocationWrite)
        -> Result<Location, DomainError>;

    /// Create or replace the record for an owner.
    async fn upsert(&self, owner: &OwnerRef, write: LocationWrite) -> Result<Upserted, DomainError>;

    /// Replace the record for an owner that has one.
    ///
    /// # Errors
    ///
    /// - `LocationNotFound` if no record exists
    async fn update(&self, owner: &OwnerRef, write: LocationWrite)
        -> Result<Location, DomainError>;

    /// Delete the record for an owner. Returns `false` if there was none.
    async fn delete_by_owner(&self, owner: &OwnerRef) -> Result<bool, DomainError>;

    /// Session-owned records within the query radius, nearest first, ties
    /// broken by record id.
    async fn find_nearest_sessions(
        &self,
        query: &NearestQuery,
    ) -> Result<Vec<NearbyLocation>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn LocationRepository) {}
    }
}
