use sqlx::error::ErrorKind;

/// Failure taxonomy for the weather store.
///
/// "No matching rows" is never an error; queries return an empty result set
/// for that case so callers can tell "no forecast yet" apart from a broken
/// store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("timestamp {0} is out of range for a UTC instant")]
    InvalidTimestamp(i64),
    #[error("malformed resource identifier: {0}")]
    MalformedIdentifier(String),
    #[error("no location record for {0}")]
    UnknownLocation(String),
    #[error("referential conflict: {0}")]
    ReferentialConflict(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),
}

impl StoreError {
    /// Map a weather-insert failure: a foreign key violation means the
    /// referenced location row does not exist.
    pub(crate) fn from_weather_insert(err: sqlx::Error, location_id: i64) -> Self {
        match &err {
            sqlx::Error::Database(db) if matches!(db.kind(), ErrorKind::ForeignKeyViolation) => {
                StoreError::UnknownLocation(format!("location id {location_id}"))
            }
            _ => StoreError::StorageUnavailable(err),
        }
    }

    /// Map an update/delete failure: constraint violations mean the mutation
    /// conflicts with rows that reference (or are referenced by) the target.
    pub(crate) fn from_mutation(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db)
                if matches!(
                    db.kind(),
                    ErrorKind::ForeignKeyViolation | ErrorKind::UniqueViolation
                ) =>
            {
                StoreError::ReferentialConflict(db.message().to_string())
            }
            _ => StoreError::StorageUnavailable(err),
        }
    }
}
