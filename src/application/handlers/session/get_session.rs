//! Session queries: single lookup and public listing.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, Timestamp, UserId};
use crate::domain::location::{DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};
use crate::domain::session::{SessionError, TrainingSession};
use crate::ports::{Page, SessionFilter, SessionRepository};

/// Handler for `GET /sessions/:id`.
pub struct GetSessionHandler {
    repository: Arc<dyn SessionRepository>,
}

impl GetSessionHandler {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, session_id: SessionId) -> Result<TrainingSession, SessionError> {
        self.repository
            .find_by_id(&session_id)
            .await?
            .ok_or_else(|| SessionError::not_found(session_id))
    }
}

/// Query for the public session listing.
#[derive(Debug, Clone, Default)]
pub struct ListSessionsQuery {
    pub trainer_id: Option<UserId>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub starts_after: Option<Timestamp>,
    pub starts_before: Option<Timestamp>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Handler for `GET /sessions`.
pub struct ListSessionsHandler {
    repository: Arc<dyn SessionRepository>,
}

impl ListSessionsHandler {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: ListSessionsQuery,
    ) -> Result<Page<TrainingSession>, SessionError> {
        let page = query.page.unwrap_or(DEFAULT_PAGE);
        if page == 0 {
            return Err(SessionError::validation("page", "Page starts at 1"));
        }
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 || limit > MAX_LIMIT {
            return Err(SessionError::validation(
                "limit",
                format!("Limit must be between 1 and {}", MAX_LIMIT),
            ));
        }
        if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
            if min > max {
                return Err(SessionError::validation(
                    "minPrice",
                    "minPrice cannot be greater than maxPrice",
                ));
            }
        }

        let filter = SessionFilter {
            trainer_id: query.trainer_id,
            min_price: query.min_price,
            max_price: query.max_price,
            starts_after: query.starts_after,
            starts_before: query.starts_before,
        };
        Ok(self.repository.list(&filter, page, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySessionRepository;

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let handler = GetSessionHandler::new(Arc::new(InMemorySessionRepository::new()));
        let id = SessionId::new();
        assert_eq!(
            handler.handle(id).await.unwrap_err(),
            SessionError::NotFound(id)
        );
    }

    #[tokio::test]
    async fn listing_applies_paging_defaults() {
        let handler = ListSessionsHandler::new(Arc::new(InMemorySessionRepository::new()));
        let page = handler.handle(ListSessionsQuery::default()).await.unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 10);
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn listing_rejects_bad_paging_and_price_band() {
        let handler = ListSessionsHandler::new(Arc::new(InMemorySessionRepository::new()));

        for query in [
            ListSessionsQuery {
                page: Some(0),
                ..Default::default()
            },
            ListSessionsQuery {
                limit: Some(101),
                ..Default::default()
            },
            ListSessionsQuery {
                min_price: Some(50.0),
                max_price: Some(10.0),
                ..Default::default()
            },
        ] {
            assert!(matches!(
                handler.handle(query).await,
                Err(SessionError::ValidationFailed { .. })
            ));
        }
    }
}
