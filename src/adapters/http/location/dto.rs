//! HTTP DTOs for location endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::location::{Location, LocationChanges, NearbyLocation};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub governorate: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub governorate: Option<String>,
}

impl From<UpdateLocationRequest> for LocationChanges {
    fn from(req: UpdateLocationRequest) -> Self {
        LocationChanges {
            latitude: req.latitude,
            longitude: req.longitude,
            address: req.address,
            governorate: req.governorate,
        }
    }
}

/// Query string of `GET /sessions/nearest`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestParams {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: Option<f64>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationResponse {
    pub id: String,
    pub owner_id: String,
    pub owner_type: String,
    pub address: String,
    pub governorate: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Location> for LocationResponse {
    fn from(location: &Location) -> Self {
        Self {
            id: location.id().to_string(),
            owner_id: location.owner().owner_id.to_string(),
            owner_type: location.owner_type().to_string(),
            address: location.address().to_string(),
            governorate: location.governorate().to_string(),
            latitude: location.point().latitude(),
            longitude: location.point().longitude(),
            created_at: location.created_at().as_datetime().to_rfc3339(),
            updated_at: location.updated_at().as_datetime().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbySessionResponse {
    pub owner_id: String,
    pub address: String,
    pub governorate: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_meters: f64,
}

impl From<&NearbyLocation> for NearbySessionResponse {
    fn from(nearby: &NearbyLocation) -> Self {
        let location = &nearby.location;
        Self {
            owner_id: location.owner().owner_id.to_string(),
            address: location.address().to_string(),
            governorate: location.governorate().to_string(),
            latitude: location.point().latitude(),
            longitude: location.point().longitude(),
            distance_meters: nearby.distance_meters,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestSessionsResponse {
    pub items: Vec<NearbySessionResponse>,
    pub page: u32,
    pub limit: u32,
}
