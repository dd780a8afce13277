//! PostgreSQL/PostGIS implementation of LocationRepository.
//!
//! Points live in a `geography(Point, 4326)` column built with
//! `ST_MakePoint(longitude, latitude)`. The `(owner_id, owner_type)` unique
//! constraint makes every keyed write atomic.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    DomainError, ErrorCode, GeoPoint, LocationId, OwnerRef, OwnerType, Timestamp,
};
use crate::domain::location::{Location, LocationWrite, NearbyLocation, NearestQuery};
use crate::ports::{LocationRepository, Upserted};

const LOCATION_COLUMNS: &str = "id, owner_id, owner_type, address, governorate, \
     ST_Y(point::geometry) AS latitude, ST_X(point::geometry) AS longitude, \
     created_at, updated_at";

/// PostgreSQL implementation of LocationRepository.
#[derive(Clone)]
pub struct PostgresLocationRepository {
    pool: PgPool,
}

impl PostgresLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn find_by_owner(&self, owner: &OwnerRef) -> Result<Option<Location>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM locations WHERE owner_id = $1 AND owner_type = $2",
            LOCATION_COLUMNS
        ))
        .bind(owner.owner_id)
        .bind(owner.owner_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch location", e))?;

        row.map(|r| row_to_location(&r)).transpose()
    }

    async fn insert(
        &self,
        owner: &OwnerRef,
        write: LocationWrite,
    ) -> Result<Location, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO locations (id, owner_id, owner_type, address, governorate, point)
            VALUES ($1, $2, $3, $4, $5, ST_SetSRID(ST_MakePoint($6, $7), 4326)::geography)
            ON CONFLICT (owner_id, owner_type) DO NOTHING
            RETURNING {}
            "#,
            LOCATION_COLUMNS
        ))
        .bind(*LocationId::new().as_uuid())
        .bind(owner.owner_id)
        .bind(owner.owner_type.as_str())
        .bind(&write.address)
        .bind(&write.governorate)
        .bind(write.point.longitude())
        .bind(write.point.latitude())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert location", e))?;

        match row {
            Some(row) => row_to_location(&row),
            None => Err(DomainError::new(
                ErrorCode::LocationAlreadyExists,
                format!("Location already exists for {}", owner),
            )),
        }
    }

    async fn upsert(
        &self,
        owner: &OwnerRef,
        write: LocationWrite,
    ) -> Result<Upserted, DomainError> {
        // xmax is 0 only on a freshly inserted tuple
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO locations (id, owner_id, owner_type, address, governorate, point)
            VALUES ($1, $2, $3, $4, $5, ST_SetSRID(ST_MakePoint($6, $7), 4326)::geography)
            ON CONFLICT (owner_id, owner_type) DO UPDATE SET
                address = EXCLUDED.address,
                governorate = EXCLUDED.governorate,
                point = EXCLUDED.point,
                updated_at = NOW()
            RETURNING {}, (xmax = 0) AS created
            "#,
            LOCATION_COLUMNS
        ))
        .bind(*LocationId::new().as_uuid())
        .bind(owner.owner_id)
        .bind(owner.owner_type.as_str())
        .bind(&write.address)
        .bind(&write.governorate)
        .bind(write.point.longitude())
        .bind(write.point.latitude())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to upsert location", e))?;

        let created: bool = row
            .try_get("created")
            .map_err(|e| db_error("Failed to read upsert flag", e))?;

        Ok(Upserted {
            location: row_to_location(&row)?,
            created,
        })
    }

    async fn update(
        &self,
        owner: &OwnerRef,
        write: LocationWrite,
    ) -> Result<Location, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE locations SET
                address = $3,
                governorate = $4,
                point = ST_SetSRID(ST_MakePoint($5, $6), 4326)::geography,
                updated_at = NOW()
            WHERE owner_id = $1 AND owner_type = $2
            RETURNING {}
            "#,
            LOCATION_COLUMNS
        ))
        .bind(owner.owner_id)
        .bind(owner.owner_type.as_str())
        .bind(&write.address)
        .bind(&write.governorate)
        .bind(write.point.longitude())
        .bind(write.point.latitude())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update location", e))?;

        match row {
            Some(row) => row_to_location(&row),
            None => Err(DomainError::new(
                ErrorCode::LocationNotFound,
                format!("Location not found for {}", owner),
            )),
        }
    }

    async fn delete_by_owner(&self, owner: &OwnerRef) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM locations WHERE owner_id = $1 AND owner_type = $2")
            .bind(owner.owner_id)
            .bind(owner.owner_type.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete location", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_nearest_sessions(
        &self,
        query: &NearestQuery,
    ) -> Result<Vec<NearbyLocation>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            WITH origin AS (
                SELECT ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography AS point
            )
            SELECT {}, ST_Distance(locations.point, origin.point) AS distance_meters
            FROM locations, origin
            WHERE owner_type = $3
              AND ST_DWithin(locations.point, origin.point, $4)
            ORDER BY distance_meters, id
            LIMIT $5 OFFSET $6
            "#,
            LOCATION_COLUMNS.replace("point::", "locations.point::")
        ))
        .bind(query.origin.longitude())
        .bind(query.origin.latitude())
        .bind(OwnerType::Session.as_str())
        .bind(query.radius_meters)
        .bind(i64::from(query.limit))
        .bind(query.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to query nearest sessions", e))?;

        rows.iter()
            .map(|row| {
                let distance_meters: f64 = row
                    .try_get("distance_meters")
                    .map_err(|e| db_error("Failed to read distance", e))?;
                Ok(NearbyLocation {
                    location: row_to_location(row)?,
                    distance_meters,
                })
            })
            .collect()
    }
}

fn row_to_location(row: &PgRow) -> Result<Location, DomainError> {
    let read = |e: sqlx::Error| db_error("Failed to read location row", e);

    let owner_type: String = row.try_get("owner_type").map_err(read)?;
    let owner_type = owner_type
        .parse::<OwnerType>()
        .map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))?;
    let point = GeoPoint::new(
        row.try_get("latitude").map_err(read)?,
        row.try_get("longitude").map_err(read)?,
    )
    .map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))?;

    Ok(Location::reconstitute(
        LocationId::from_uuid(row.try_get("id").map_err(read)?),
        OwnerRef::new(row.try_get("owner_id").map_err(read)?, owner_type),
        LocationWrite {
            point,
            address: row.try_get("address").map_err(read)?,
            governorate: row.try_get("governorate").map_err(read)?,
        },
        Timestamp::from_datetime(row.try_get("created_at").map_err(read)?),
        Timestamp::from_datetime(row.try_get("updated_at").map_err(read)?),
    ))
}
