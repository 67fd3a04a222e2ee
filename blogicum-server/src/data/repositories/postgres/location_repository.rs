use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::data::location_repository::LocationRepository;
use crate::domain::error::DomainError;
use crate::domain::location::{Location, LocationRequest};

#[derive(Debug, Clone)]
pub(crate) struct PostgresLocationRepository {
    pool: PgPool,
}

impl PostgresLocationRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct LocationRow {
    id: i64,
    name: String,
    is_published: bool,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn create_location(&self, input: LocationRequest) -> Result<Location, DomainError> {
        let row = sqlx::query_as::<_, LocationRow>(
            r#"
            INSERT INTO locations (name, is_published)
            VALUES ($1, $2)
            RETURNING id, name, is_published, created_at
            "#,
        )
        .bind(input.name)
        .bind(input.is_published)
        .fetch_one(&self.pool)
        .await
        .map_err(map_location_db_error)?;

        map_row_to_location(row)
    }

    async fn update_location(
        &self,
        id: i64,
        input: LocationRequest,
    ) -> Result<Option<Location>, DomainError> {
        let row = sqlx::query_as::<_, LocationRow>(
            r#"
            UPDATE locations
            SET name = $2,
                is_published = $3
            WHERE id = $1
            RETURNING id, name, is_published, created_at
            "#,
        )
        .bind(id)
        .bind(input.name)
        .bind(input.is_published)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_location_db_error)?;

        row.map(map_row_to_location).transpose()
    }

    async fn delete_location(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_location_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_locations(&self) -> Result<Vec<Location>, DomainError> {
        let rows = sqlx::query_as::<_, LocationRow>(
            r#"
            SELECT id, name, is_published, created_at
            FROM locations
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_location_db_error)?;

        rows.into_iter().map(map_row_to_location).collect()
    }
}

fn map_row_to_location(row: LocationRow) -> Result<Location, DomainError> {
    Location::new(row.id, row.name, row.is_published, row.created_at)
        .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_location_db_error(err: sqlx::Error) -> DomainError {
    DomainError::Unexpected(err.to_string())
}
