//! PostgreSQL implementation of SessionRepository.
//!
//! Persists TrainingSession aggregates to the `sessions` table, including the
//! last requested venue.

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use crate::domain::foundation::{DomainError, ErrorCode, SessionId, Timestamp, UserId};
use crate::domain::session::{SessionDetails, SessionStatus, TrainingSession, Venue};
use crate::ports::{Page, SessionFilter, SessionRepository};

const SESSION_COLUMNS: &str = "id, trainer_id, title, description, max_participants, \
     current_participants, start_time, duration_minutes, price, notes, latitude, longitude, \
     address, governorate, status, created_at, updated_at";

/// PostgreSQL implementation of SessionRepository.
#[derive(Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    /// Creates a new PostgresSessionRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn not_found(id: &SessionId) -> DomainError {
    DomainError::new(ErrorCode::SessionNotFound, format!("Session not found: {}", id))
}

/// Counts are `u32` in the domain and `INTEGER` in the table.
fn to_int(column: &'static str, value: u32) -> Result<i32, DomainError> {
    i32::try_from(value).map_err(|_| {
        DomainError::validation(column, format!("{} is out of range: {}", column, value))
    })
}

/// Binds `$1` (id) and `$2..=$14`, the columns both updates write.
fn bind_editable<'q>(
    query: Query<'q, Postgres, PgArguments>,
    session: &'q TrainingSession,
) -> Result<Query<'q, Postgres, PgArguments>, DomainError> {
    let details = session.details();
    let venue = session.venue();
    Ok(query
        .bind(session.id().as_uuid())
        .bind(&details.title)
        .bind(&details.description)
        .bind(to_int("max_participants", details.max_participants)?)
        .bind(to_int("current_participants", session.current_participants())?)
        .bind(details.start_time.as_datetime())
        .bind(to_int("duration_minutes", details.duration_minutes)?)
        .bind(details.price)
        .bind(&details.notes)
        .bind(venue.point().latitude())
        .bind(venue.point().longitude())
        .bind(venue.address())
        .bind(venue.governorate())
        .bind(session.updated_at().as_datetime()))
}

/// Appends `WHERE ...` for every set filter.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &SessionFilter) {
    builder.push(" WHERE TRUE");
    if let Some(trainer_id) = filter.trainer_id {
        builder.push(" AND trainer_id = ").push_bind(*trainer_id.as_uuid());
    }
    if let Some(min) = filter.min_price {
        builder.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        builder.push(" AND price <= ").push_bind(max);
    }
    if let Some(after) = filter.starts_after {
        builder
            .push(" AND start_time >= ")
            .push_bind(*after.as_datetime());
    }
    if let Some(before) = filter.starts_before {
        builder
            .push(" AND start_time <= ")
            .push_bind(*before.as_datetime());
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn save(&self, session: &TrainingSession) -> Result<(), DomainError> {
        let details = session.details();
        let venue = session.venue();
        sqlx::query(
            r#"
            INSERT INTO sessions (
                id, trainer_id, title, description, max_participants,
                current_participants, start_time, duration_minutes, price, notes,
                latitude, longitude, address, governorate, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.trainer_id().as_uuid())
        .bind(&details.title)
        .bind(&details.description)
        .bind(to_int("max_participants", details.max_participants)?)
        .bind(to_int("current_participants", session.current_participants())?)
        .bind(details.start_time.as_datetime())
        .bind(to_int("duration_minutes", details.duration_minutes)?)
        .bind(details.price)
        .bind(&details.notes)
        .bind(venue.point().latitude())
        .bind(venue.point().longitude())
        .bind(venue.address())
        .bind(venue.governorate())
        .bind(session.status().as_str())
        .bind(session.created_at().as_datetime())
        .bind(session.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert session", e))?;

        Ok(())
    }

    async fn update(&self, session: &TrainingSession) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions SET
                title = $2,
                description = $3,
                max_participants = $4,
                current_participants = $5,
                start_time = $6,
                duration_minutes = $7,
                price = $8,
                notes = $9,
                latitude = $10,
                longitude = $11,
                address = $12,
                governorate = $13,
                updated_at = $14,
                status = $15
            WHERE id = $1
            "#,
        );
        let result = bind_editable(result, session)?
            .bind(session.status().as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to update session", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(session.id()));
        }

        Ok(())
    }

    async fn update_details(&self, session: &TrainingSession) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions SET
                title = $2,
                description = $3,
                max_participants = $4,
                current_participants = $5,
                start_time = $6,
                duration_minutes = $7,
                price = $8,
                notes = $9,
                latitude = $10,
                longitude = $11,
                address = $12,
                governorate = $13,
                updated_at = $14
            WHERE id = $1
            "#,
        );
        let result = bind_editable(result, session)?
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to update session details", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(session.id()));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<TrainingSession>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM sessions WHERE id = $1", SESSION_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch session", e))?;

        row.map(row_to_session).transpose()
    }

    async fn find_by_trainer(
        &self,
        trainer_id: &UserId,
    ) -> Result<Vec<TrainingSession>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM sessions WHERE trainer_id = $1 ORDER BY created_at, id",
            SESSION_COLUMNS
        ))
        .bind(trainer_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch sessions by trainer", e))?;

        rows.into_iter().map(row_to_session).collect()
    }

    async fn list(
        &self,
        filter: &SessionFilter,
        page: u32,
        limit: u32,
    ) -> Result<Page<TrainingSession>, DomainError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM sessions");
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count sessions", e))?;

        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);
        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM sessions",
            SESSION_COLUMNS
        ));
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY start_time, id LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list sessions", e))?;

        Ok(Page {
            items: rows
                .into_iter()
                .map(row_to_session)
                .collect::<Result<_, _>>()?,
            total: total.max(0) as u64,
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
        let result = sqlx::query(
            "UPDATE sessions SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2",
        )
        .bind(id.as_uuid())
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update session status", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: &SessionId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete session", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        Ok(())
    }
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| db_error(&format!("Failed to read column {}", name), e))
}

fn row_to_session(row: PgRow) -> Result<TrainingSession, DomainError> {
    let status: String = column(&row, "status")?;
    let status = status
        .parse::<SessionStatus>()
        .map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))?;

    let venue = Venue::new(
        column(&row, "latitude")?,
        column(&row, "longitude")?,
        column::<String>(&row, "address")?,
        column::<String>(&row, "governorate")?,
    )
    .map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Stored venue is invalid: {}", e),
        )
    })?;

    let details = SessionDetails {
        title: column(&row, "title")?,
        description: column(&row, "description")?,
        max_participants: column::<i32>(&row, "max_participants")?.max(0) as u32,
        start_time: Timestamp::from_datetime(column(&row, "start_time")?),
        duration_minutes: column::<i32>(&row, "duration_minutes")?.max(0) as u32,
        price: column(&row, "price")?,
        notes: column(&row, "notes")?,
    };

    Ok(TrainingSession::reconstitute(
        SessionId::from_uuid(column(&row, "id")?),
        UserId::from_uuid(column(&row, "trainer_id")?),
        details,
        column::<i32>(&row, "current_participants")?.max(0) as u32,
        venue,
        status,
        Timestamp::from_datetime(column(&row, "created_at")?),
        Timestamp::from_datetime(column(&row, "updated_at")?),
    ))
}
