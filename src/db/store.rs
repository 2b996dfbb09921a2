use tracing::{debug, instrument};
use url::Url;

use crate::contract::{self, UriKind};
use crate::db::{
    DbPool, ForecastRow, Location, LocationRepository, NewLocation, NewWeather, SortOrder,
    StoreError, WeatherRepository, WeatherUpdate,
};

/// URI-dispatching facade over the two repositories.
///
/// This is the whole contract toward the outside: the presentation
/// collaborator queries through it, the sync collaborator writes through it.
/// Every operation takes a resource identifier (see `contract`) and routes
/// to the table and filter shape that identifier addresses.
#[derive(Clone)]
pub struct WeatherStore {
    locations: LocationRepository,
    weather: WeatherRepository,
}

impl WeatherStore {
    pub fn new(db: DbPool) -> Self {
        Self {
            locations: LocationRepository::new(db.pool().clone()),
            weather: WeatherRepository::new(db.pool().clone()),
        }
    }

    pub fn locations(&self) -> &LocationRepository {
        &self.locations
    }

    pub fn weather(&self) -> &WeatherRepository {
        &self.weather
    }

    /// Run the forecast query a weather URI addresses. The three shapes:
    ///
    /// - `/weather/{loc}` — every day for the location
    /// - `/weather/{loc}?date={day}` — that day and forward
    /// - `/weather/{loc}/{day}` — exactly that day
    ///
    /// No matching rows is an empty vec, never an error. Rows come back in
    /// ascending day order unless the caller asks for descending.
    #[instrument(skip(self, uri), fields(uri = %uri))]
    pub async fn query(
        &self,
        uri: &Url,
        sort: Option<SortOrder>,
    ) -> Result<Vec<ForecastRow>, StoreError> {
        let sort = sort.unwrap_or_default();

        match contract::match_uri(uri)? {
            UriKind::Weather => self.weather.query_all(sort).await,
            UriKind::WeatherWithLocation(loc) => {
                let start_day = contract::start_date_from_uri(uri)?;
                if start_day == 0 {
                    self.weather.query_for_location(&loc, sort).await
                } else {
                    self.weather.query_from_date(&loc, start_day, sort).await
                }
            }
            UriKind::WeatherWithLocationAndDate(loc, day) => {
                self.weather.query_on_date(&loc, day).await
            }
            UriKind::Location | UriKind::LocationWithId(_) => Err(StoreError::MalformedIdentifier(
                format!("{uri}: location URIs do not address forecast rows"),
            )),
        }
    }

    /// Location rows for a `/location` or `/location/{id}` URI.
    #[instrument(skip(self, uri), fields(uri = %uri))]
    pub async fn query_locations(&self, uri: &Url) -> Result<Vec<Location>, StoreError> {
        match contract::match_uri(uri)? {
            UriKind::Location => self.locations.find_all().await,
            UriKind::LocationWithId(id) => {
                Ok(self.locations.find_by_id(id).await?.into_iter().collect())
            }
            _ => Err(StoreError::MalformedIdentifier(format!(
                "{uri}: not a location URI"
            ))),
        }
    }

    /// Insert one weather row through the `/weather` URI. Returns the row id.
    #[instrument(skip(self, uri, record), fields(uri = %uri))]
    pub async fn insert_weather(
        &self,
        uri: &Url,
        record: &NewWeather,
    ) -> Result<i64, StoreError> {
        match contract::match_uri(uri)? {
            UriKind::Weather => self.weather.insert(record).await,
            _ => Err(StoreError::MalformedIdentifier(format!(
                "{uri}: weather rows are inserted through the /weather URI"
            ))),
        }
    }

    /// Upsert a location through the `/location` URI. Returns the row id.
    #[instrument(skip(self, uri, record), fields(uri = %uri))]
    pub async fn insert_location(
        &self,
        uri: &Url,
        record: &NewLocation,
    ) -> Result<i64, StoreError> {
        match contract::match_uri(uri)? {
            UriKind::Location => self.locations.upsert(record).await,
            _ => Err(StoreError::MalformedIdentifier(format!(
                "{uri}: locations are inserted through the /location URI"
            ))),
        }
    }

    /// Atomic batch insert through the `/weather` URI; the sync
    /// collaborator's write path. All rows commit or none do.
    #[instrument(skip(self, uri, records), fields(uri = %uri, count = records.len()))]
    pub async fn bulk_insert(
        &self,
        uri: &Url,
        records: &[NewWeather],
    ) -> Result<u64, StoreError> {
        match contract::match_uri(uri)? {
            UriKind::Weather => self.weather.bulk_insert(records).await,
            _ => Err(StoreError::MalformedIdentifier(format!(
                "{uri}: bulk insert targets the /weather URI"
            ))),
        }
    }

    /// Update the weather row an exact-date URI addresses.
    #[instrument(skip(self, uri, update), fields(uri = %uri))]
    pub async fn update_weather(
        &self,
        uri: &Url,
        update: &WeatherUpdate,
    ) -> Result<u64, StoreError> {
        match contract::match_uri(uri)? {
            UriKind::WeatherWithLocationAndDate(loc, day) => {
                self.weather
                    .update_for_location_and_date(&loc, day, update)
                    .await
            }
            _ => Err(StoreError::MalformedIdentifier(format!(
                "{uri}: updates address one (location, day) row"
            ))),
        }
    }

    /// Update the location row a `/location/{id}` URI addresses.
    #[instrument(skip(self, uri, record), fields(uri = %uri))]
    pub async fn update_location(
        &self,
        uri: &Url,
        record: &NewLocation,
    ) -> Result<u64, StoreError> {
        match contract::match_uri(uri)? {
            UriKind::LocationWithId(id) => self.locations.update_by_id(id, record).await,
            _ => Err(StoreError::MalformedIdentifier(format!(
                "{uri}: location updates address /location/{{id}}"
            ))),
        }
    }

    /// Delete whatever rows the URI addresses. Deleting locations cascades
    /// to their weather rows.
    #[instrument(skip(self, uri), fields(uri = %uri))]
    pub async fn delete(&self, uri: &Url) -> Result<u64, StoreError> {
        let deleted = match contract::match_uri(uri)? {
            UriKind::Weather => self.weather.delete_all().await?,
            UriKind::WeatherWithLocation(loc) => self.weather.delete_for_location(&loc).await?,
            UriKind::WeatherWithLocationAndDate(loc, day) => {
                self.weather.delete_for_location_and_date(&loc, day).await?
            }
            UriKind::Location => self.locations.delete_all().await?,
            UriKind::LocationWithId(id) => self.locations.delete_by_id(id).await?,
        };

        debug!("Deleted {} rows", deleted);
        Ok(deleted)
    }
}
