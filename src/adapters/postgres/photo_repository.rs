//! PostgreSQL implementation of PhotoRepository.
//!
//! Ids come from a `BIGSERIAL`. The partial unique index
//! `photos_one_per_user` enforces a single profile photo per user.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, ErrorCode, OwnerRef, OwnerType, PhotoId, Timestamp};
use crate::domain::media::{NewPhoto, Photo, PhotoStatus};
use crate::ports::{PhotoFileUpdate, PhotoRepository};

const PHOTO_COLUMNS: &str =
    "id, owner_id, owner_type, url, storage_key, filename, mimetype, status, created_at";

/// PostgreSQL implementation of PhotoRepository.
#[derive(Clone)]
pub struct PostgresPhotoRepository {
    pool: PgPool,
}

impl PostgresPhotoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn raw_ids(ids: &[PhotoId]) -> Vec<i64> {
    ids.iter().map(PhotoId::value).collect()
}

#[async_trait]
impl PhotoRepository for PostgresPhotoRepository {
    async fn insert(&self, photo: NewPhoto) -> Result<Photo, DomainError> {
        let result = sqlx::query(&format!(
            r#"
            INSERT INTO photos (owner_id, owner_type, url, storage_key, filename, mimetype, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            PHOTO_COLUMNS
        ))
        .bind(photo.owner.owner_id)
        .bind(photo.owner.owner_type.as_str())
        .bind(&photo.url)
        .bind(&photo.storage_key)
        .bind(&photo.filename)
        .bind(&photo.mimetype)
        .bind(photo.status.as_str())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => row_to_photo(&row),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(DomainError::new(
                ErrorCode::PhotoAlreadyExists,
                format!("Photo already exists for {}", photo.owner),
            )),
            Err(e) => Err(db_error("Failed to insert photo", e)),
        }
    }

    async fn find_by_owner(&self, owner: &OwnerRef) -> Result<Vec<Photo>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM photos WHERE owner_id = $1 AND owner_type = $2 ORDER BY id",
            PHOTO_COLUMNS
        ))
        .bind(owner.owner_id)
        .bind(owner.owner_type.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch photos", e))?;

        rows.iter().map(row_to_photo).collect()
    }

    async fn find_by_ids(
        &self,
        owner: &OwnerRef,
        ids: &[PhotoId],
    ) -> Result<Vec<Photo>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM photos \
             WHERE owner_id = $1 AND owner_type = $2 AND id = ANY($3) ORDER BY id",
            PHOTO_COLUMNS
        ))
        .bind(owner.owner_id)
        .bind(owner.owner_type.as_str())
        .bind(raw_ids(ids))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch photos by id", e))?;

        rows.iter().map(row_to_photo).collect()
    }

    async fn count_by_owner(&self, owner: &OwnerRef) -> Result<usize, DomainError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM photos WHERE owner_id = $1 AND owner_type = $2")
                .bind(owner.owner_id)
                .bind(owner.owner_type.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Failed to count photos", e))?;

        Ok(count.0.max(0) as usize)
    }

    async fn approve(
        &self,
        owner: &OwnerRef,
        ids: &[PhotoId],
    ) -> Result<Vec<PhotoId>, DomainError> {
        let approved: Vec<(i64,)> = sqlx::query_as(
            r#"
            UPDATE photos SET status = $4
            WHERE owner_id = $1 AND owner_type = $2 AND id = ANY($3) AND status = $5
            RETURNING id
            "#,
        )
        .bind(owner.owner_id)
        .bind(owner.owner_type.as_str())
        .bind(raw_ids(ids))
        .bind(PhotoStatus::Approved.as_str())
        .bind(PhotoStatus::Pending.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to approve photos", e))?;

        let mut approved: Vec<PhotoId> = approved
            .into_iter()
            .map(|(id,)| PhotoId::new(id))
            .collect();
        approved.sort();
        Ok(approved)
    }

    async fn delete_with_status(
        &self,
        owner: &OwnerRef,
        ids: &[PhotoId],
        status: PhotoStatus,
    ) -> Result<Vec<Photo>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            DELETE FROM photos
            WHERE owner_id = $1 AND owner_type = $2 AND id = ANY($3) AND status = $4
            RETURNING {}
            "#,
            PHOTO_COLUMNS
        ))
        .bind(owner.owner_id)
        .bind(owner.owner_type.as_str())
        .bind(raw_ids(ids))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to delete photos", e))?;

        Ok(sorted(rows.iter().map(row_to_photo).collect::<Result<_, _>>()?))
    }

    async fn delete_by_owner(&self, owner: &OwnerRef) -> Result<Vec<Photo>, DomainError> {
        let rows = sqlx::query(&format!(
            "DELETE FROM photos WHERE owner_id = $1 AND owner_type = $2 RETURNING {}",
            PHOTO_COLUMNS
        ))
        .bind(owner.owner_id)
        .bind(owner.owner_type.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to delete owner photos", e))?;

        Ok(sorted(rows.iter().map(row_to_photo).collect::<Result<_, _>>()?))
    }

    async fn replace_file(&self, id: PhotoId, file: PhotoFileUpdate) -> Result<Photo, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE photos SET url = $2, storage_key = $3, filename = $4, mimetype = $5
            WHERE id = $1
            RETURNING {}
            "#,
            PHOTO_COLUMNS
        ))
        .bind(id.value())
        .bind(&file.url)
        .bind(&file.storage_key)
        .bind(&file.filename)
        .bind(&file.mimetype)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to replace photo file", e))?;

        match row {
            Some(row) => row_to_photo(&row),
            None => Err(DomainError::new(
                ErrorCode::PhotoNotFound,
                format!("Photo not found: {}", id),
            )),
        }
    }
}

// RETURNING gives no ordering guarantee
fn sorted(mut photos: Vec<Photo>) -> Vec<Photo> {
    photos.sort_by_key(|p| p.id);
    photos
}

fn row_to_photo(row: &PgRow) -> Result<Photo, DomainError> {
    let read = |e: sqlx::Error| db_error("Failed to read photo row", e);
    let invalid = |e: crate::domain::foundation::ValidationError| {
        DomainError::new(ErrorCode::DatabaseError, e.to_string())
    };

    let owner_type: String = row.try_get("owner_type").map_err(read)?;
    let status: String = row.try_get("status").map_err(read)?;

    Ok(Photo {
        id: PhotoId::new(row.try_get("id").map_err(read)?),
        owner: OwnerRef::new(
            row.try_get("owner_id").map_err(read)?,
            owner_type.parse::<OwnerType>().map_err(invalid)?,
        ),
        url: row.try_get("url").map_err(read)?,
        storage_key: row.try_get("storage_key").map_err(read)?,
        filename: row.try_get("filename").map_err(read)?,
        mimetype: row.try_get("mimetype").map_err(read)?,
        status: status.parse::<PhotoStatus>().map_err(invalid)?,
        created_at: Timestamp::from_datetime(row.try_get("created_at").map_err(read)?),
    })
}
