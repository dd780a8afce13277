//! Owner-scoped location record.
//!
//! Exactly one record exists per `(owner_id, owner_type)`; writes for an
//! existing key replace address, governorate and point in place.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, GeoPoint, LocationId, OwnerRef, OwnerType, Timestamp,
};

/// Validated body of a location write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationWrite {
    pub point: GeoPoint,
    pub address: String,
    pub governorate: String,
}

impl LocationWrite {
    /// # Errors
    ///
    /// - `ValidationFailed` for out-of-range coordinates or blank text fields
    pub fn new(
        latitude: f64,
        longitude: f64,
        address: impl Into<String>,
        governorate: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            point: GeoPoint::new(latitude, longitude)?,
            address: non_blank("address", address.into())?,
            governorate: non_blank("governorate", governorate.into())?,
        })
    }
}

/// Partial change to an existing location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationChanges {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub governorate: Option<String>,
}

/// A stored location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    id: LocationId,
    owner: OwnerRef,
    address: String,
    governorate: String,
    point: GeoPoint,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Location {
    /// Creates a fresh record for `owner`.
    pub fn create(owner: OwnerRef, write: LocationWrite) -> Self {
        let now = Timestamp::now();
        Self {
            id: LocationId::new(),
            owner,
            address: write.address,
            governorate: write.governorate,
            point: write.point,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitute from persistence.
    pub fn reconstitute(
        id: LocationId,
        owner: OwnerRef,
        write: LocationWrite,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            owner,
            address: write.address,
            governorate: write.governorate,
            point: write.point,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &LocationId {
        &self.id
    }

    pub fn owner(&self) -> &OwnerRef {
        &self.owner
    }

    pub fn owner_type(&self) -> OwnerType {
        self.owner.owner_type
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn governorate(&self) -> &str {
        &self.governorate
    }

    pub fn point(&self) -> &GeoPoint {
        &self.point
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Overwrites address, governorate and point. Identity is kept.
    pub fn overwrite(&mut self, write: LocationWrite) {
        self.address = write.address;
        self.governorate = write.governorate;
        self.point = write.point;
        self.updated_at = Timestamp::now();
    }

    /// Merges a partial change into a full write without mutating `self`.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if only one coordinate is given or a value is invalid
    pub fn merged(&self, changes: &LocationChanges) -> Result<LocationWrite, DomainError> {
        let (latitude, longitude) = match (changes.latitude, changes.longitude) {
            (Some(lat), Some(lng)) => (lat, lng),
            (None, None) => (self.point.latitude(), self.point.longitude()),
            _ => {
                return Err(DomainError::validation(
                    "location",
                    "latitude and longitude must be provided together",
                ))
            }
        };
        LocationWrite::new(
            latitude,
            longitude,
            changes.address.clone().unwrap_or_else(|| self.address.clone()),
            changes
                .governorate
                .clone()
                .unwrap_or_else(|| self.governorate.clone()),
        )
    }
}

fn non_blank(field: &str, value: String) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(
            field,
            format!("Field '{}' cannot be empty", field),
        ));
    }
    Ok(trimmed.to_string())
}
