//! Nearest-session search parameters and results.

use serde::Serialize;

use crate::domain::foundation::{DomainError, GeoPoint};

use super::Location;

pub const DEFAULT_RADIUS_METERS: f64 = 5_000.0;
pub const MAX_RADIUS_METERS: f64 = 100_000.0;
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Validated spatial range query over session locations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestQuery {
    pub origin: GeoPoint,
    pub radius_meters: f64,
    pub page: u32,
    pub limit: u32,
}

impl NearestQuery {
    /// Builds a query, applying defaults for missing paging/radius values.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for bad coordinates, a radius outside
    ///   `(0, MAX_RADIUS_METERS]`, page 0 or a limit outside `1..=MAX_LIMIT`
    pub fn new(
        latitude: f64,
        longitude: f64,
        radius_meters: Option<f64>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Self, DomainError> {
        let origin = GeoPoint::new(latitude, longitude)?;
        let radius_meters = radius_meters.unwrap_or(DEFAULT_RADIUS_METERS);
        if !radius_meters.is_finite() || radius_meters <= 0.0 || radius_meters > MAX_RADIUS_METERS {
            return Err(DomainError::validation(
                "radius",
                format!("Radius must be greater than 0 and at most {} m", MAX_RADIUS_METERS),
            ));
        }
        let page = page.unwrap_or(DEFAULT_PAGE);
        if page == 0 {
            return Err(DomainError::validation("page", "Page starts at 1"));
        }
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 || limit > MAX_LIMIT {
            return Err(DomainError::validation(
                "limit",
                format!("Limit must be between 1 and {}", MAX_LIMIT),
            ));
        }
        Ok(Self {
            origin,
            radius_meters,
            page,
            limit,
        })
    }

    /// Rows to skip for the requested page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// A session location within the search radius.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyLocation {
    pub location: Location,
    pub distance_meters: f64,
}
