//! Location handlers for the authenticated user's own record.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, OwnerRef, UserId};
use crate::domain::location::{Location, LocationChanges, LocationError, LocationWrite};
use crate::ports::LocationRepository;

/// Body of `POST /location/user`.
#[derive(Debug, Clone)]
pub struct CreateUserLocationCommand {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub governorate: String,
}

fn keyed_error(err: DomainError, owner: OwnerRef) -> LocationError {
    match err.code {
        ErrorCode::LocationNotFound => LocationError::not_found(owner),
        ErrorCode::LocationAlreadyExists => LocationError::already_exists(owner),
        _ => err.into(),
    }
}

/// Creates the caller's location. A second create is a conflict.
pub struct CreateUserLocationHandler {
    repository: Arc<dyn LocationRepository>,
}

impl CreateUserLocationHandler {
    pub fn new(repository: Arc<dyn LocationRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        user_id: UserId,
        cmd: CreateUserLocationCommand,
    ) -> Result<Location, LocationError> {
        let owner = OwnerRef::user(user_id);
        let write = LocationWrite::new(cmd.latitude, cmd.longitude, cmd.address, cmd.governorate)?;

        let location = self
            .repository
            .insert(&owner, write)
            .await
            .map_err(|e| keyed_error(e, owner))?;

        tracing::info!(user_id = %user_id, location_id = %location.id(), "user location created");
        Ok(location)
    }
}

/// Applies a partial change to the caller's location.
pub struct UpdateUserLocationHandler {
    repository: Arc<dyn LocationRepository>,
}

impl UpdateUserLocationHandler {
    pub fn new(repository: Arc<dyn LocationRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        user_id: UserId,
        changes: LocationChanges,
    ) -> Result<Location, LocationError> {
        let owner = OwnerRef::user(user_id);
        let current = self
            .repository
            .find_by_owner(&owner)
            .await?
            .ok_or_else(|| LocationError::not_found(owner))?;

        let write = current.merged(&changes)?;
        let location = self
            .repository
            .update(&owner, write)
            .await
            .map_err(|e| keyed_error(e, owner))?;

        tracing::info!(user_id = %user_id, "user location updated");
        Ok(location)
    }
}

/// Removes the caller's location.
pub struct DeleteUserLocationHandler {
    repository: Arc<dyn LocationRepository>,
}

impl DeleteUserLocationHandler {
    pub fn new(repository: Arc<dyn LocationRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, user_id: UserId) -> Result<(), LocationError> {
        let owner = OwnerRef::user(user_id);
        if !self.repository.delete_by_owner(&owner).await? {
            return Err(LocationError::not_found(owner));
        }
        tracing::info!(user_id = %user_id, "user location deleted");
        Ok(())
    }
}

/// Reads a single owner's location.
pub struct GetLocationHandler {
    repository: Arc<dyn LocationRepository>,
}

impl GetLocationHandler {
    pub fn new(repository: Arc<dyn LocationRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, owner: OwnerRef) -> Result<Location, LocationError> {
        self.repository
            .find_by_owner(&owner)
            .await?
            .ok_or_else(|| LocationError::not_found(owner))
    }
}
