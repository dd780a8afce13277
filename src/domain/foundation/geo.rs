//! Geographic coordinate value object.

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Mean Earth radius in metres (IUGG).
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// A WGS84 point. Stored and transmitted as (longitude, latitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Creates a validated point.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if latitude is outside -90..=90 or longitude outside -180..=180
    /// - `InvalidFormat` if either coordinate is not finite
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !latitude.is_finite() {
            return Err(ValidationError::invalid_format("latitude", "must be a finite number"));
        }
        if !longitude.is_finite() {
            return Err(ValidationError::invalid_format("longitude", "must be a finite number"));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::out_of_range("latitude", -90.0, 90.0, latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::out_of_range("longitude", -180.0, 180.0, longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in metres (haversine).
    pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_METERS * c
    }
}
