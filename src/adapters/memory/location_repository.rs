use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, OwnerRef, OwnerType};
use crate::domain::location::{Location, LocationWrite, NearbyLocation, NearestQuery};
use crate::ports::{LocationRepository, Upserted};

/// In-memory location store keyed by owner.
///
/// Nearest queries scan every session-owned record and compute haversine
/// distances.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLocationRepository {
    locations: Arc<RwLock<HashMap<OwnerRef, Location>>>,
}

impl InMemoryLocationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.locations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.locations.read().await.is_empty()
    }
}

#[async_trait]
impl LocationRepository for InMemoryLocationRepository {
    async fn find_by_owner(&self, owner: &OwnerRef) -> Result<Option<Location>, DomainError> {
        Ok(self.locations.read().await.get(owner).cloned())
    }

    async fn insert(
        &self,
        owner: &OwnerRef,
        write: LocationWrite,
    ) -> Result<Location, DomainError> {
        let mut locations = self.locations.write().await;
        if locations.contains_key(owner) {
            return Err(DomainError::new(
                ErrorCode::LocationAlreadyExists,
                format!("Location already exists for {}", owner),
            ));
        }
        let location = Location::create(*owner, write);
        locations.insert(*owner, location.clone());
        Ok(location)
    }

    async fn upsert(
        &self,
        owner: &OwnerRef,
        write: LocationWrite,
    ) -> Result<Upserted, DomainError> {
        let mut locations = self.locations.write().await;
        match locations.get_mut(owner) {
            Some(existing) => {
                existing.overwrite(write);
                Ok(Upserted {
                    location: existing.clone(),
                    created: false,
                })
            }
            None => {
                let location = Location::create(*owner, write);
                locations.insert(*owner, location.clone());
                Ok(Upserted {
                    location,
                    created: true,
                })
            }
        }
    }

    async fn update(
        &self,
        owner: &OwnerRef,
        write: LocationWrite,
    ) -> Result<Location, DomainError> {
        let mut locations = self.locations.write().await;
        let existing = locations.get_mut(owner).ok_or_else(|| {
            DomainError::new(
                ErrorCode::LocationNotFound,
                format!("Location not found for {}", owner),
            )
        })?;
        existing.overwrite(write);
        Ok(existing.clone())
    }

    async fn delete_by_owner(&self, owner: &OwnerRef) -> Result<bool, DomainError> {
        Ok(self.locations.write().await.remove(owner).is_some())
    }

    async fn find_nearest_sessions(
        &self,
        query: &NearestQuery,
    ) -> Result<Vec<NearbyLocation>, DomainError> {
        let mut nearby: Vec<NearbyLocation> = self
            .locations
            .read()
            .await
            .values()
            .filter(|l| l.owner_type() == OwnerType::Session)
            .filter_map(|l| {
                let distance_meters = query.origin.distance_meters(l.point());
                (distance_meters <= query.radius_meters).then(|| NearbyLocation {
                    location: l.clone(),
                    distance_meters,
                })
            })
            .collect();

        nearby.sort_by(|a, b| {
            a.distance_meters
                .total_cmp(&b.distance_meters)
                .then_with(|| a.location.id().cmp(b.location.id()))
        });

        Ok(nearby
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect())
    }
}
