use sqlx::sqlite::SqlitePool;
use tracing::{debug, info, instrument};

use crate::date::normalize_date;
use crate::db::{ForecastRow, NewWeather, StoreError, WeatherUpdate};

/// Sort order for forecast queries. Callers that supply nothing get
/// ascending day order, which is what the list view contract promises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    DayAscending,
    DayDescending,
}

impl SortOrder {
    fn sql(self) -> &'static str {
        match self {
            SortOrder::DayAscending => "weather.date ASC",
            SortOrder::DayDescending => "weather.date DESC",
        }
    }
}

/// Join projection in contract column order; see `contract::FORECAST_COLUMNS`.
const FORECAST_SELECT: &str = r#"
    SELECT weather.id AS id,
           weather.date AS date,
           weather.short_desc AS short_desc,
           weather.max AS max,
           weather.min AS min,
           location.location_setting AS location_setting,
           weather.weather_id AS weather_id,
           location.coord_lat AS coord_lat,
           location.coord_long AS coord_long
    FROM weather
    INNER JOIN location ON weather.location_id = location.id
"#;

#[derive(Clone)]
pub struct WeatherRepository {
    pool: SqlitePool,
}

impl WeatherRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert one weather row. The date is normalized as the final step
    /// before persistence, and a row already present for the same
    /// (location, day) is replaced, so the later insert's values win.
    #[instrument(skip(self, record), fields(location_id = record.location_id))]
    pub async fn insert(&self, record: &NewWeather) -> Result<i64, StoreError> {
        let date = normalize_date(record.date)?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO weather (location_id, date, weather_id, short_desc,
                                 min, max, humidity, pressure, wind, degrees)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT (location_id, date) DO UPDATE SET
                weather_id = excluded.weather_id,
                short_desc = excluded.short_desc,
                min = excluded.min,
                max = excluded.max,
                humidity = excluded.humidity,
                pressure = excluded.pressure,
                wind = excluded.wind,
                degrees = excluded.degrees
            RETURNING id
            "#,
        )
        .bind(record.location_id)
        .bind(date)
        .bind(record.weather_id)
        .bind(&record.short_desc)
        .bind(record.min)
        .bind(record.max)
        .bind(record.humidity)
        .bind(record.pressure)
        .bind(record.wind)
        .bind(record.degrees)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_weather_insert(e, record.location_id))?;

        debug!("Inserted weather row {} for day {}", id, date);
        Ok(id)
    }

    /// Insert a batch of weather rows in one transaction. Either every row
    /// becomes visible or, on any failure, none do. Each row gets the same
    /// normalization and replace-on-conflict treatment as `insert`.
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn bulk_insert(&self, records: &[NewWeather]) -> Result<u64, StoreError> {
        debug!(
            "Beginning transaction to insert {} weather rows",
            records.len()
        );
        let mut tx = self.pool.begin().await?;
        let mut inserted: u64 = 0;

        for record in records {
            let date = normalize_date(record.date)?;

            sqlx::query(
                r#"
                INSERT INTO weather (location_id, date, weather_id, short_desc,
                                     min, max, humidity, pressure, wind, degrees)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ON CONFLICT (location_id, date) DO UPDATE SET
                    weather_id = excluded.weather_id,
                    short_desc = excluded.short_desc,
                    min = excluded.min,
                    max = excluded.max,
                    humidity = excluded.humidity,
                    pressure = excluded.pressure,
                    wind = excluded.wind,
                    degrees = excluded.degrees
                "#,
            )
            .bind(record.location_id)
            .bind(date)
            .bind(record.weather_id)
            .bind(&record.short_desc)
            .bind(record.min)
            .bind(record.max)
            .bind(record.humidity)
            .bind(record.pressure)
            .bind(record.wind)
            .bind(record.degrees)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::from_weather_insert(e, record.location_id))?;

            inserted += 1;
        }

        tx.commit().await?;
        info!("Inserted {} weather rows", inserted);
        Ok(inserted)
    }

    /// All weather joined with its location, across every location.
    #[instrument(skip(self))]
    pub async fn query_all(&self, sort: SortOrder) -> Result<Vec<ForecastRow>, StoreError> {
        let sql = format!("{FORECAST_SELECT} ORDER BY {}", sort.sql());
        let rows = sqlx::query_as::<_, ForecastRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!("Found {} forecast rows", rows.len());
        Ok(rows)
    }

    /// All weather for one location. An unknown location yields an empty
    /// result, not an error.
    #[instrument(skip(self), fields(location_setting = %location_setting))]
    pub async fn query_for_location(
        &self,
        location_setting: &str,
        sort: SortOrder,
    ) -> Result<Vec<ForecastRow>, StoreError> {
        let sql = format!(
            "{FORECAST_SELECT} WHERE location.location_setting = ?1 ORDER BY {}",
            sort.sql()
        );
        let rows = sqlx::query_as::<_, ForecastRow>(&sql)
            .bind(location_setting)
            .fetch_all(&self.pool)
            .await?;

        debug!("Found {} forecast rows", rows.len());
        Ok(rows)
    }

    /// Weather for one location from a start day forward.
    #[instrument(skip(self), fields(location_setting = %location_setting))]
    pub async fn query_from_date(
        &self,
        location_setting: &str,
        start_day: i64,
        sort: SortOrder,
    ) -> Result<Vec<ForecastRow>, StoreError> {
        let sql = format!(
            "{FORECAST_SELECT} WHERE location.location_setting = ?1 AND weather.date >= ?2 ORDER BY {}",
            sort.sql()
        );
        let rows = sqlx::query_as::<_, ForecastRow>(&sql)
            .bind(location_setting)
            .bind(start_day)
            .fetch_all(&self.pool)
            .await?;

        debug!("Found {} forecast rows from day {}", rows.len(), start_day);
        Ok(rows)
    }

    /// Weather for one location on one exact day.
    #[instrument(skip(self), fields(location_setting = %location_setting))]
    pub async fn query_on_date(
        &self,
        location_setting: &str,
        day: i64,
    ) -> Result<Vec<ForecastRow>, StoreError> {
        let sql =
            format!("{FORECAST_SELECT} WHERE location.location_setting = ?1 AND weather.date = ?2");
        let rows = sqlx::query_as::<_, ForecastRow>(&sql)
            .bind(location_setting)
            .bind(day)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    #[instrument(skip(self, update), fields(location_setting = %location_setting))]
    pub async fn update_for_location_and_date(
        &self,
        location_setting: &str,
        day: i64,
        update: &WeatherUpdate,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE weather SET
                weather_id = ?3,
                short_desc = ?4,
                min = ?5,
                max = ?6,
                humidity = ?7,
                pressure = ?8,
                wind = ?9,
                degrees = ?10
            WHERE date = ?2
              AND location_id IN (SELECT id FROM location WHERE location_setting = ?1)
            "#,
        )
        .bind(location_setting)
        .bind(day)
        .bind(update.weather_id)
        .bind(&update.short_desc)
        .bind(update.min)
        .bind(update.max)
        .bind(update.humidity)
        .bind(update.pressure)
        .bind(update.wind)
        .bind(update.degrees)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_mutation)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self), fields(location_setting = %location_setting))]
    pub async fn delete_for_location(&self, location_setting: &str) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM weather
            WHERE location_id IN (SELECT id FROM location WHERE location_setting = ?1)
            "#,
        )
        .bind(location_setting)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_mutation)?;

        debug!("Deleted {} weather rows", result.rows_affected());
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), fields(location_setting = %location_setting))]
    pub async fn delete_for_location_and_date(
        &self,
        location_setting: &str,
        day: i64,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM weather
            WHERE date = ?2
              AND location_id IN (SELECT id FROM location WHERE location_setting = ?1)
            "#,
        )
        .bind(location_setting)
        .bind(day)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_mutation)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    pub async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM weather")
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_mutation)?;

        Ok(result.rows_affected())
    }

    /// Prune weather rows older than the given cutoff. Used by the sync
    /// collaborator to drop days that have scrolled out of the forecast
    /// window. The cutoff is normalized, so any timestamp within a day
    /// keeps that whole day.
    #[instrument(skip(self))]
    pub async fn delete_before(&self, cutoff_millis: i64) -> Result<u64, StoreError> {
        let cutoff = normalize_date(cutoff_millis)?;

        let result = sqlx::query("DELETE FROM weather WHERE date < ?1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_mutation)?;

        info!(
            "Pruned {} weather rows before day {}",
            result.rows_affected(),
            cutoff
        );
        Ok(result.rows_affected())
    }
}
