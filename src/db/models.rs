use serde::Serialize;
use sqlx::FromRow;

// Database entity models

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Location {
    pub id: i64,
    /// Canonical query key for a place, e.g. a postal code. Unique.
    pub location_setting: String,
    pub city_name: String,
    pub coord_lat: f64,
    pub coord_long: f64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WeatherRecord {
    pub id: i64,
    pub location_id: i64,
    /// Start-of-UTC-day timestamp in milliseconds, always normalized.
    pub date: i64,
    pub weather_id: i64,
    pub short_desc: String,
    pub min: f64,
    pub max: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind: f64,
    pub degrees: f64,
}

// Insert payloads (ids are store-assigned)

#[derive(Debug, Clone)]
pub struct NewLocation {
    pub location_setting: String,
    pub city_name: String,
    pub coord_lat: f64,
    pub coord_long: f64,
}

#[derive(Debug, Clone)]
pub struct NewWeather {
    pub location_id: i64,
    /// May be a raw timestamp; the store normalizes it before persisting.
    pub date: i64,
    pub weather_id: i64,
    pub short_desc: String,
    pub min: f64,
    pub max: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind: f64,
    pub degrees: f64,
}

/// Field values for a filtered weather update. The row key
/// (location, date) comes from the resource identifier, not from here.
#[derive(Debug, Clone)]
pub struct WeatherUpdate {
    pub weather_id: i64,
    pub short_desc: String,
    pub min: f64,
    pub max: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind: f64,
    pub degrees: f64,
}

/// Query-time projection joining one location and one weather row.
///
/// Field order follows `contract::FORECAST_COLUMNS`; list consumers rely on
/// those ordinal positions.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ForecastRow {
    pub id: i64,
    pub date: i64,
    pub short_desc: String,
    pub max: f64,
    pub min: f64,
    pub location_setting: String,
    pub weather_id: i64,
    pub coord_lat: f64,
    pub coord_long: f64,
}
