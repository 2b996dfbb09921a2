//! Resource identifier scheme for the weather store.
//!
//! Every query shape against the store is addressed by a `content://` style
//! URI under a fixed provider authority:
//!
//! - `/weather` — all weather rows
//! - `/weather/{locationSetting}` — all weather for one location
//! - `/weather/{locationSetting}?date={day}` — weather from a start day forward
//! - `/weather/{locationSetting}/{day}` — weather on one exact day
//! - `/location`, `/location/{id}` — location rows
//!
//! Builders that embed a day always normalize the raw timestamp first, so a
//! URI never carries an unnormalized day value.

use percent_encoding::percent_decode_str;
use url::Url;

use crate::date::normalize_date;
use crate::db::StoreError;

pub const SCHEME: &str = "content";
pub const CONTENT_AUTHORITY: &str = "com.forecaststore.provider";

pub const PATH_WEATHER: &str = "weather";
pub const PATH_LOCATION: &str = "location";

/// Query parameter carrying the normalized start day.
pub const QUERY_PARAM_DATE: &str = "date";

/// Fixed projection exposed to forecast list consumers. The ordinal
/// positions below are part of the contract; `ForecastRow` fields follow
/// the same order.
pub const FORECAST_COLUMNS: [&str; 9] = [
    "id",
    "date",
    "short_desc",
    "max",
    "min",
    "location_setting",
    "weather_id",
    "coord_lat",
    "coord_long",
];

pub const COL_WEATHER_ID: usize = 0;
pub const COL_WEATHER_DATE: usize = 1;
pub const COL_WEATHER_DESC: usize = 2;
pub const COL_WEATHER_MAX_TEMP: usize = 3;
pub const COL_WEATHER_MIN_TEMP: usize = 4;
pub const COL_LOCATION_SETTING: usize = 5;
pub const COL_WEATHER_CONDITION_ID: usize = 6;
pub const COL_COORD_LAT: usize = 7;
pub const COL_COORD_LONG: usize = 8;

/// Which store operation a URI addresses, with its path-borne arguments
/// already extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriKind {
    Weather,
    WeatherWithLocation(String),
    WeatherWithLocationAndDate(String, i64),
    Location,
    LocationWithId(i64),
}

fn with_segments(segments: &[&str]) -> Url {
    let mut uri = Url::parse(&format!("{SCHEME}://{CONTENT_AUTHORITY}"))
        .expect("static base URI is valid");
    uri.path_segments_mut()
        .expect("base URI is hierarchical")
        .extend(segments);
    uri
}

pub fn weather_uri() -> Url {
    with_segments(&[PATH_WEATHER])
}

/// Item URI for one weather row id, an opaque handle for callers that hold
/// onto an inserted row. Its path shape is indistinguishable from
/// `/weather/{locationSetting}`, so `match_uri` classifies it as the
/// location shape; the scheme has always had that ambiguity.
pub fn weather_uri_with_id(id: i64) -> Url {
    with_segments(&[PATH_WEATHER, &id.to_string()])
}

pub fn location_uri() -> Url {
    with_segments(&[PATH_LOCATION])
}

pub fn location_uri_with_id(id: i64) -> Url {
    with_segments(&[PATH_LOCATION, &id.to_string()])
}

pub fn weather_for_location(location_setting: &str) -> Url {
    with_segments(&[PATH_WEATHER, location_setting])
}

/// `/weather/{loc}?date={day}` — "this day and forward". The raw timestamp
/// is normalized before being embedded.
pub fn weather_for_location_with_start_date(
    location_setting: &str,
    start_date_millis: i64,
) -> Result<Url, StoreError> {
    let normalized = normalize_date(start_date_millis)?;
    let mut uri = weather_for_location(location_setting);
    uri.query_pairs_mut()
        .append_pair(QUERY_PARAM_DATE, &normalized.to_string());
    Ok(uri)
}

/// `/weather/{loc}/{day}` — one exact day. The raw timestamp is normalized
/// before being embedded.
pub fn weather_for_location_with_date(
    location_setting: &str,
    date_millis: i64,
) -> Result<Url, StoreError> {
    let normalized = normalize_date(date_millis)?;
    Ok(with_segments(&[
        PATH_WEATHER,
        location_setting,
        &normalized.to_string(),
    ]))
}

fn malformed(uri: &Url, reason: &str) -> StoreError {
    StoreError::MalformedIdentifier(format!("{uri}: {reason}"))
}

fn decode_segment(uri: &Url, segment: &str) -> Result<String, StoreError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| malformed(uri, "path segment is not valid UTF-8"))
}

fn path_segments(uri: &Url) -> Result<Vec<String>, StoreError> {
    let segments = uri
        .path_segments()
        .ok_or_else(|| malformed(uri, "no path"))?;
    segments
        .filter(|s| !s.is_empty())
        .map(|s| decode_segment(uri, s))
        .collect()
}

/// Extract the location setting (second path segment) from a weather URI.
pub fn location_setting_from_uri(uri: &Url) -> Result<String, StoreError> {
    let segments = path_segments(uri)?;
    match segments.as_slice() {
        [path, loc, ..] if path == PATH_WEATHER => Ok(loc.clone()),
        _ => Err(malformed(uri, "expected /weather/{locationSetting}")),
    }
}

/// Extract the exact day (third path segment) from a weather URI. Fails when
/// the segment is missing or non-numeric.
pub fn date_from_uri(uri: &Url) -> Result<i64, StoreError> {
    let segments = path_segments(uri)?;
    match segments.as_slice() {
        [path, _, day] if path == PATH_WEATHER => day
            .parse::<i64>()
            .map_err(|_| malformed(uri, "date segment is not numeric")),
        _ => Err(malformed(uri, "expected /weather/{locationSetting}/{date}")),
    }
}

/// Extract the start day from the `date` query parameter. Absent or empty
/// means "no lower bound" and yields 0.
pub fn start_date_from_uri(uri: &Url) -> Result<i64, StoreError> {
    match uri.query_pairs().find(|(k, _)| k == QUERY_PARAM_DATE) {
        None => Ok(0),
        Some((_, v)) if v.is_empty() => Ok(0),
        Some((_, v)) => v
            .parse::<i64>()
            .map_err(|_| malformed(uri, "date parameter is not numeric")),
    }
}

/// Classify a URI into the store operation it addresses.
pub fn match_uri(uri: &Url) -> Result<UriKind, StoreError> {
    if uri.scheme() != SCHEME {
        return Err(malformed(uri, "wrong scheme"));
    }
    if uri.host_str() != Some(CONTENT_AUTHORITY) {
        return Err(malformed(uri, "unknown authority"));
    }

    let segments = path_segments(uri)?;
    match segments.as_slice() {
        [path] if path == PATH_WEATHER => Ok(UriKind::Weather),
        [path, loc] if path == PATH_WEATHER => Ok(UriKind::WeatherWithLocation(loc.clone())),
        [path, loc, day] if path == PATH_WEATHER => {
            let day = day
                .parse::<i64>()
                .map_err(|_| malformed(uri, "date segment is not numeric"))?;
            Ok(UriKind::WeatherWithLocationAndDate(loc.clone(), day))
        }
        [path] if path == PATH_LOCATION => Ok(UriKind::Location),
        [path, id] if path == PATH_LOCATION => {
            let id = id
                .parse::<i64>()
                .map_err(|_| malformed(uri, "location id is not numeric"))?;
            Ok(UriKind::LocationWithId(id))
        }
        _ => Err(malformed(uri, "unknown path shape")),
    }
}
