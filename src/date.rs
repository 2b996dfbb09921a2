use chrono::{NaiveTime, TimeZone, Utc};

use crate::db::StoreError;

/// Milliseconds in one UTC day.
pub const DAY_IN_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Normalize a millisecond timestamp to the start of its UTC calendar day.
///
/// Every weather row is keyed by this value, so any two instants that fall
/// on the same UTC day address the same row. Idempotent: normalizing an
/// already-normalized value returns it unchanged.
pub fn normalize_date(timestamp_millis: i64) -> Result<i64, StoreError> {
    let instant = Utc
        .timestamp_millis_opt(timestamp_millis)
        .single()
        .ok_or(StoreError::InvalidTimestamp(timestamp_millis))?;

    let day_start = instant.date_naive().and_time(NaiveTime::MIN).and_utc();
    Ok(day_start.timestamp_millis())
}
