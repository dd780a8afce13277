use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, SessionId, UserId};
use crate::domain::session::{SessionStatus, TrainingSession};
use crate::ports::{Page, SessionFilter, SessionRepository};

/// In-memory session store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<SessionId, TrainingSession>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

fn not_found(id: &SessionId) -> DomainError {
    DomainError::new(
        ErrorCode::SessionNotFound,
        format!("Session not found: {}", id),
    )
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn save(&self, session: &TrainingSession) -> Result<(), DomainError> {
        self.sessions
            .write()
            .await
            .insert(*session.id(), session.clone());
        Ok(())
    }

    async fn update(&self, session: &TrainingSession) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session.id()) {
            Some(stored) => {
                *stored = session.clone();
                Ok(())
            }
            None => Err(not_found(session.id())),
        }
    }

    async fn update_details(&self, session: &TrainingSession) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session.id()) {
            Some(stored) => {
                *stored = TrainingSession::reconstitute(
                    *session.id(),
                    *session.trainer_id(),
                    session.details().clone(),
                    session.current_participants(),
                    session.venue().clone(),
                    stored.status(),
                    *session.created_at(),
                    *session.updated_at(),
                );
                Ok(())
            }
            None => Err(not_found(session.id())),
        }
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<TrainingSession>, DomainError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn find_by_trainer(
        &self,
        trainer_id: &UserId,
    ) -> Result<Vec<TrainingSession>, DomainError> {
        let mut found: Vec<TrainingSession> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.trainer_id() == trainer_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.created_at()
                .cmp(b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(found)
    }

    async fn list(
        &self,
        filter: &SessionFilter,
        page: u32,
        limit: u32,
    ) -> Result<Page<TrainingSession>, DomainError> {
        let mut matching: Vec<TrainingSession> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            a.details()
                .start_time
                .cmp(&b.details().start_time)
                .then_with(|| a.id().cmp(b.id()))
        });

        let total = matching.len() as u64;
        let skip = (page.saturating_sub(1) as usize) * limit as usize;
        let items = matching.into_iter().skip(skip).take(limit as usize).collect();

        Ok(Page {
            items,
            total,
            page,
            limit,
        })
    }

    async fn transition_status(
        &self,
        id: &SessionId,
        from: SessionStatus,
        to: SessionStatus,
    ) -> Result<bool, DomainError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(session) if session.status() == from => {
                session.set_status(to)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: &SessionId) -> Result<(), DomainError> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use crate::domain::session::{SessionDetails, Venue};

    fn session(trainer: UserId, start_in_minutes: i64) -> TrainingSession {
        let now = Timestamp::now();
        TrainingSession::schedule(
            SessionId::new(),
            trainer,
            SessionDetails {
                title: "Hatha Basics".to_string(),
                description: "Foundations for new students".to_string(),
                max_participants: 8,
                start_time: now.plus_minutes(start_in_minutes),
                duration_minutes: 60,
                price: 80.0,
                notes: None,
            },
            Venue::new(31.2, 29.9, "5 Fouad St", "Alexandria").unwrap(),
            now,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn update_and_delete_unknown_session_report_not_found() {
        let repo = InMemorySessionRepository::new();
        let s = session(UserId::new(), 60);

        assert_eq!(
            repo.update(&s).await.unwrap_err().code,
            ErrorCode::SessionNotFound
        );
        assert_eq!(
            repo.delete(s.id()).await.unwrap_err().code,
            ErrorCode::SessionNotFound
        );
    }

    #[tokio::test]
    async fn transition_status_only_applies_from_expected_status() {
        let repo = InMemorySessionRepository::new();
        let s = session(UserId::new(), 60);
        repo.save(&s).await.unwrap();

        assert!(repo
            .transition_status(s.id(), SessionStatus::Pending, SessionStatus::Upcoming)
            .await
            .unwrap());
        assert!(!repo
            .transition_status(s.id(), SessionStatus::Pending, SessionStatus::Failed)
            .await
            .unwrap());

        let stored = repo.find_by_id(s.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), SessionStatus::Upcoming);
    }

    #[tokio::test]
    async fn update_details_keeps_the_stored_status() {
        let repo = InMemorySessionRepository::new();
        let s = session(UserId::new(), 60);
        repo.save(&s).await.unwrap();

        // `stale` still says Pending while the store moves on.
        let mut stale = repo.find_by_id(s.id()).await.unwrap().unwrap();
        repo.transition_status(s.id(), SessionStatus::Pending, SessionStatus::Upcoming)
            .await
            .unwrap();
        stale
            .apply_changes(
                crate::domain::session::SessionChanges {
                    title: Some("Hatha Flow".to_string()),
                    ..Default::default()
                },
                Timestamp::now(),
            )
            .unwrap();
        repo.update_details(&stale).await.unwrap();

        let stored = repo.find_by_id(s.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), SessionStatus::Upcoming);
        assert_eq!(stored.details().title, "Hatha Flow");

        assert_eq!(
            repo.update_details(&session(UserId::new(), 60))
                .await
                .unwrap_err()
                .code,
            ErrorCode::SessionNotFound
        );
    }

    #[tokio::test]
    async fn transition_status_on_missing_row_is_false() {
        let repo = InMemorySessionRepository::new();
        assert!(!repo
            .transition_status(
                &SessionId::new(),
                SessionStatus::Pending,
                SessionStatus::Upcoming
            )
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn list_orders_by_start_time_and_pages() {
        let repo = InMemorySessionRepository::new();
        let trainer = UserId::new();
        let late = session(trainer, 300);
        let early = session(trainer, 60);
        let middle = session(trainer, 120);
        for s in [&late, &early, &middle] {
            repo.save(s).await.unwrap();
        }

        let first = repo.list(&SessionFilter::default(), 1, 2).await.unwrap();
        assert_eq!(first.total, 3);
        assert_eq!(first.items[0].id(), early.id());
        assert_eq!(first.items[1].id(), middle.id());

        let second = repo.list(&SessionFilter::default(), 2, 2).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].id(), late.id());
    }

    #[tokio::test]
    async fn find_by_trainer_filters_other_trainers() {
        let repo = InMemorySessionRepository::new();
        let trainer = UserId::new();
        repo.save(&session(trainer, 60)).await.unwrap();
        repo.save(&session(UserId::new(), 60)).await.unwrap();

        assert_eq!(repo.find_by_trainer(&trainer).await.unwrap().len(), 1);
    }
}
