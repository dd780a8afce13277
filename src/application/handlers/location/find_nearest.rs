//! FindNearestSessionsHandler - spatial range query over session venues.

use std::sync::Arc;

use crate::domain::location::{LocationError, NearbyLocation, NearestQuery};
use crate::ports::LocationRepository;

/// Raw query parameters; defaults are applied by `NearestQuery::new`.
#[derive(Debug, Clone, Default)]
pub struct FindNearestSessionsQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: Option<f64>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub struct FindNearestSessionsHandler {
    repository: Arc<dyn LocationRepository>,
}

impl FindNearestSessionsHandler {
    pub fn new(repository: Arc<dyn LocationRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: FindNearestSessionsQuery,
    ) -> Result<Vec<NearbyLocation>, LocationError> {
        let query = NearestQuery::new(
            query.latitude,
            query.longitude,
            query.radius_km.map(|km| km * 1_000.0),
            query.page,
            query.limit,
        )?;
        Ok(self.repository.find_nearest_sessions(&query).await?)
    }
}
