use sqlx::sqlite::SqlitePool;
use tracing::{debug, instrument};

use crate::db::{Location, NewLocation, StoreError};

#[derive(Clone)]
pub struct LocationRepository {
    pool: SqlitePool,
}

impl LocationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a location, or update the existing row when the
    /// location_setting is already known. Returns the row id either way.
    #[instrument(skip(self, location), fields(location_setting = %location.location_setting))]
    pub async fn upsert(&self, location: &NewLocation) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO location (location_setting, city_name, coord_lat, coord_long)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (location_setting) DO UPDATE SET
                city_name = excluded.city_name,
                coord_lat = excluded.coord_lat,
                coord_long = excluded.coord_long
            RETURNING id
            "#,
        )
        .bind(&location.location_setting)
        .bind(&location.city_name)
        .bind(location.coord_lat)
        .bind(location.coord_long)
        .fetch_one(&self.pool)
        .await?;

        debug!("Upserted location with id {}", id);
        Ok(id)
    }

    #[instrument(skip(self), fields(location_setting = %location_setting))]
    pub async fn find_by_setting(
        &self,
        location_setting: &str,
    ) -> Result<Option<Location>, StoreError> {
        let location = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, location_setting, city_name, coord_lat, coord_long
            FROM location
            WHERE location_setting = ?1
            "#,
        )
        .bind(location_setting)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Location>, StoreError> {
        let location = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, location_setting, city_name, coord_lat, coord_long
            FROM location
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<Location>, StoreError> {
        let locations = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, location_setting, city_name, coord_lat, coord_long
            FROM location
            ORDER BY location_setting
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!("Found {} locations", locations.len());
        Ok(locations)
    }

    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM location")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as usize)
    }

    #[instrument(skip(self, location))]
    pub async fn update_by_id(&self, id: i64, location: &NewLocation) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE location SET
                location_setting = ?2,
                city_name = ?3,
                coord_lat = ?4,
                coord_long = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&location.location_setting)
        .bind(&location.city_name)
        .bind(location.coord_lat)
        .bind(location.coord_long)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_mutation)?;

        Ok(result.rows_affected())
    }

    /// Delete a location by its setting. Weather rows referencing it go with
    /// it (ON DELETE CASCADE); stale weather without a location is
    /// meaningless.
    #[instrument(skip(self), fields(location_setting = %location_setting))]
    pub async fn delete_by_setting(&self, location_setting: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM location WHERE location_setting = ?1")
            .bind(location_setting)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_mutation)?;

        debug!("Deleted {} location rows", result.rows_affected());
        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM location WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_mutation)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    pub async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM location")
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_mutation)?;

        Ok(result.rows_affected())
    }
}
