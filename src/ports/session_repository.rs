//! Session repository port.
//!
//! Keyed writes that touch zero rows surface as `SessionNotFound`. The
//! status flip driven by location outcomes goes through
//! `transition_status`, a compare-and-set on the status column. Only
//! `save`, `update` and `transition_status` write that column.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SessionId, Timestamp, UserId};
use crate::domain::session::{SessionStatus, TrainingSession};

/// Filters for the public session listing. `None` means unfiltered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionFilter {
    pub trainer_id: Option<UserId>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub starts_after: Option<Timestamp>,
    pub starts_before: Option<Timestamp>,
}

impl SessionFilter {
    /// True if `session` passes every set filter.
    pub fn matches(&self, session: &TrainingSession) -> bool {
        let details = session.details();
        self.trainer_id.map_or(true, |t| session.trainer_id() == &t)
            && self.min_price.map_or(true, |p| details.price >= p)
            && self.max_price.map_or(true, |p| details.price <= p)
            && self
                .starts_after
                .map_or(true, |t| !details.start_time.is_before(&t))
            && self
                .starts_before
                .map_or(true, |t| !details.start_time.is_after(&t))
    }
}

/// One page of results plus the unpaged total.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Save a new session.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn save(&self, session: &TrainingSession) -> Result<(), DomainError>;

    /// Overwrite every mutable field of an existing session.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if session doesn't exist
    async fn update(&self, session: &TrainingSession) -> Result<(), DomainError>;

    /// Overwrite the trainer-editable fields, leaving the stored `status`
    /// as it is.
    ///
    /// Edits that do not move the venue go through here so they cannot
    /// undo a concurrent `transition_status`.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if session doesn't exist
    async fn update_details(&self, session: &TrainingSession) -> Result<(), DomainError>;

    /// Find a session by its ID.
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<TrainingSession>, DomainError>;

    /// All sessions run by a trainer, oldest first.
    async fn find_by_trainer(&self, trainer_id: &UserId)
        -> Result<Vec<TrainingSession>, DomainError>;

    /// Filtered listing ordered by start time, then id.
    async fn list(
        &self,
        filter: &SessionFilter,
        page: u32,
        limit: u32,
    ) -> Result<Page<TrainingSession>, DomainError>;

    /// Sets `status = to` only if the row is currently `from`.
    ///
    /// Returns `false` when the row exists in another status or is gone.
    async fn transition_status(
        &self,
        id: &SessionId,
        from: SessionStatus,
        to: SessionStatus,
    ) -> Result<bool, DomainError>;

    /// Delete a session.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if session doesn't exist
    async fn delete(&self, id: &SessionId) -> Result<(), DomainError>;
}
