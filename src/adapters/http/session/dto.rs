//! HTTP DTOs for session endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;
use crate::domain::session::{
    SessionChanges, SessionDetails, SessionStatus, TrainingSession, VenueChanges,
};
use crate::ports::Page;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to schedule a session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub title: String,
    pub description: String,
    pub max_participants: u32,
    pub start_time: DateTime<Utc>,
    /// Minutes.
    pub duration: u32,
    pub price: f64,
    #[serde(default)]
    pub notes: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub governorate: String,
}

impl CreateSessionRequest {
    pub fn details(&self) -> SessionDetails {
        SessionDetails {
            title: self.title.clone(),
            description: self.description.clone(),
            max_participants: self.max_participants,
            start_time: Timestamp::from_datetime(self.start_time),
            duration_minutes: self.duration,
            price: self.price,
            notes: self.notes.clone(),
        }
    }
}

/// Partial update. Absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub max_participants: Option<u32>,
    pub start_time: Option<DateTime<Utc>>,
    pub duration: Option<u32>,
    pub price: Option<f64>,
    pub notes: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub governorate: Option<String>,
}

impl From<UpdateSessionRequest> for SessionChanges {
    fn from(req: UpdateSessionRequest) -> Self {
        SessionChanges {
            title: req.title,
            description: req.description,
            max_participants: req.max_participants,
            start_time: req.start_time.map(Timestamp::from_datetime),
            duration_minutes: req.duration,
            price: req.price,
            notes: req.notes,
            venue: VenueChanges {
                latitude: req.latitude,
                longitude: req.longitude,
                address: req.address,
                governorate: req.governorate,
            },
        }
    }
}

/// Query parameters for the public listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSessionsParams {
    pub trainer_id: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub start_after: Option<DateTime<Utc>>,
    pub start_before: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub trainer_id: String,
    pub title: String,
    pub description: String,
    pub max_participants: u32,
    pub current_participants: u32,
    pub start_time: String,
    pub duration: u32,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: SessionStatus,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub governorate: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&TrainingSession> for SessionResponse {
    fn from(session: &TrainingSession) -> Self {
        let details = session.details();
        let venue = session.venue();
        Self {
            id: session.id().to_string(),
            trainer_id: session.trainer_id().to_string(),
            title: details.title.clone(),
            description: details.description.clone(),
            max_participants: details.max_participants,
            current_participants: session.current_participants(),
            start_time: details.start_time.as_datetime().to_rfc3339(),
            duration: details.duration_minutes,
            price: details.price,
            notes: details.notes.clone(),
            status: session.status(),
            latitude: venue.point().latitude(),
            longitude: venue.point().longitude(),
            address: venue.address().to_string(),
            governorate: venue.governorate().to_string(),
            created_at: session.created_at().as_datetime().to_rfc3339(),
            updated_at: session.updated_at().as_datetime().to_rfc3339(),
        }
    }
}

/// Paginated list of sessions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListResponse {
    pub items: Vec<SessionResponse>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl From<Page<TrainingSession>> for SessionListResponse {
    fn from(page: Page<TrainingSession>) -> Self {
        Self {
            items: page.items.iter().map(SessionResponse::from).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
        }
    }
}
