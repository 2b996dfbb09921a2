// Tests for the weather store: uniqueness/replace-on-conflict, ordering,
// date filters, bulk-insert atomicity and the location cascade.

use chrono::{TimeZone, Utc};
use forecast_store::contract;
use forecast_store::date::{normalize_date, DAY_IN_MILLIS};
use forecast_store::db::{
    DbPool, NewLocation, NewWeather, SortOrder, StoreError, WeatherStore, WeatherUpdate,
};

mod store_fixtures {
    use super::*;

    pub async fn setup_store() -> WeatherStore {
        let db = DbPool::connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory store");
        WeatherStore::new(db)
    }

    pub fn mountain_view() -> NewLocation {
        NewLocation {
            location_setting: "94043".to_string(),
            city_name: "Mountain View".to_string(),
            coord_lat: 37.386,
            coord_long: -122.084,
        }
    }

    pub fn weather_row(location_id: i64, date: i64, desc: &str) -> NewWeather {
        NewWeather {
            location_id,
            date,
            weather_id: 800,
            short_desc: desc.to_string(),
            min: 11.0,
            max: 25.0,
            humidity: 60.0,
            pressure: 1013.0,
            wind: 3.5,
            degrees: 180.0,
        }
    }

    pub fn base_timestamp() -> i64 {
        Utc.with_ymd_and_hms(2016, 8, 23, 9, 0, 0)
            .unwrap()
            .timestamp_millis()
    }
}

#[tokio::test]
async fn test_same_day_insert_replaces_with_later_values() {
    let store = store_fixtures::setup_store().await;
    let location_id = store
        .insert_location(&contract::location_uri(), &store_fixtures::mountain_view())
        .await
        .expect("Failed to insert location");

    // Two raw timestamps 90 seconds apart, same UTC day
    let t = store_fixtures::base_timestamp();
    store
        .bulk_insert(
            &contract::weather_uri(),
            &[store_fixtures::weather_row(location_id, t, "Cloudy")],
        )
        .await
        .expect("First batch failed");
    store
        .bulk_insert(
            &contract::weather_uri(),
            &[store_fixtures::weather_row(location_id, t + 90_000, "Clear")],
        )
        .await
        .expect("Second batch failed");

    let uri = contract::weather_for_location_with_date("94043", t).unwrap();
    let rows = store.query(&uri, None).await.expect("Query failed");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].short_desc, "Clear");
    assert_eq!(rows[0].date, normalize_date(t).unwrap());
}

#[tokio::test]
async fn test_query_returns_rows_in_ascending_day_order() {
    let store = store_fixtures::setup_store().await;
    let location_id = store
        .insert_location(&contract::location_uri(), &store_fixtures::mountain_view())
        .await
        .unwrap();

    let t = store_fixtures::base_timestamp();
    // Inserted out of order on purpose
    let batch = vec![
        store_fixtures::weather_row(location_id, t + 2 * DAY_IN_MILLIS, "Rain"),
        store_fixtures::weather_row(location_id, t, "Clear"),
        store_fixtures::weather_row(location_id, t + DAY_IN_MILLIS, "Cloudy"),
    ];
    store
        .bulk_insert(&contract::weather_uri(), &batch)
        .await
        .unwrap();

    let uri = contract::weather_for_location("94043");
    let rows = store.query(&uri, None).await.unwrap();

    assert_eq!(rows.len(), 3);
    assert!(rows.windows(2).all(|w| w[0].date <= w[1].date));
    assert_eq!(rows[0].short_desc, "Clear");
    assert_eq!(rows[2].short_desc, "Rain");
}

#[tokio::test]
async fn test_descending_sort_when_requested() {
    let store = store_fixtures::setup_store().await;
    let location_id = store
        .insert_location(&contract::location_uri(), &store_fixtures::mountain_view())
        .await
        .unwrap();

    let t = store_fixtures::base_timestamp();
    let batch = vec![
        store_fixtures::weather_row(location_id, t, "Clear"),
        store_fixtures::weather_row(location_id, t + DAY_IN_MILLIS, "Cloudy"),
    ];
    store
        .bulk_insert(&contract::weather_uri(), &batch)
        .await
        .unwrap();

    let uri = contract::weather_for_location("94043");
    let rows = store
        .query(&uri, Some(SortOrder::DayDescending))
        .await
        .unwrap();

    assert_eq!(rows[0].short_desc, "Cloudy");
    assert_eq!(rows[1].short_desc, "Clear");
}

#[tokio::test]
async fn test_start_date_query_filters_earlier_days() {
    let store = store_fixtures::setup_store().await;
    let location_id = store
        .insert_location(&contract::location_uri(), &store_fixtures::mountain_view())
        .await
        .unwrap();

    let t = store_fixtures::base_timestamp();
    let batch = vec![
        store_fixtures::weather_row(location_id, t - DAY_IN_MILLIS, "Yesterday"),
        store_fixtures::weather_row(location_id, t, "Today"),
        store_fixtures::weather_row(location_id, t + DAY_IN_MILLIS, "Tomorrow"),
    ];
    store
        .bulk_insert(&contract::weather_uri(), &batch)
        .await
        .unwrap();

    let uri = contract::weather_for_location_with_start_date("94043", t).unwrap();
    let rows = store.query(&uri, None).await.unwrap();

    let start_day = normalize_date(t).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.date >= start_day));
    assert!(rows.windows(2).all(|w| w[0].date <= w[1].date));
}

#[tokio::test]
async fn test_joined_row_carries_location_columns() {
    let store = store_fixtures::setup_store().await;
    let location_id = store
        .insert_location(&contract::location_uri(), &store_fixtures::mountain_view())
        .await
        .unwrap();

    let t = store_fixtures::base_timestamp();
    store
        .insert_weather(
            &contract::weather_uri(),
            &store_fixtures::weather_row(location_id, t, "Clear"),
        )
        .await
        .unwrap();

    let rows = store
        .query(&contract::weather_for_location("94043"), None)
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].location_setting, "94043");
    assert_eq!(rows[0].coord_lat, 37.386);
    assert_eq!(rows[0].coord_long, -122.084);
    assert_eq!(rows[0].weather_id, 800);
}

#[tokio::test]
async fn test_bulk_insert_rolls_back_whole_batch_on_failure() {
    let store = store_fixtures::setup_store().await;
    let location_id = store
        .insert_location(&contract::location_uri(), &store_fixtures::mountain_view())
        .await
        .unwrap();

    let t = store_fixtures::base_timestamp();
    let batch = vec![
        store_fixtures::weather_row(location_id, t, "Clear"),
        // References no location row; the whole batch must fail
        store_fixtures::weather_row(9999, t + DAY_IN_MILLIS, "Orphan"),
    ];

    let result = store.bulk_insert(&contract::weather_uri(), &batch).await;
    assert!(matches!(result, Err(StoreError::UnknownLocation(_))));

    let rows = store
        .query(&contract::weather_for_location("94043"), None)
        .await
        .unwrap();
    assert!(rows.is_empty(), "rolled-back batch must not be visible");
}

#[tokio::test]
async fn test_orphan_insert_fails_with_unknown_location() {
    let store = store_fixtures::setup_store().await;

    let t = store_fixtures::base_timestamp();
    let result = store
        .insert_weather(
            &contract::weather_uri(),
            &store_fixtures::weather_row(42, t, "Orphan"),
        )
        .await;

    assert!(matches!(result, Err(StoreError::UnknownLocation(_))));
}

#[tokio::test]
async fn test_location_delete_cascades_to_weather() {
    let store = store_fixtures::setup_store().await;
    let location_id = store
        .insert_location(&contract::location_uri(), &store_fixtures::mountain_view())
        .await
        .unwrap();

    let t = store_fixtures::base_timestamp();
    let batch = vec![
        store_fixtures::weather_row(location_id, t, "Clear"),
        store_fixtures::weather_row(location_id, t + DAY_IN_MILLIS, "Rain"),
    ];
    store
        .bulk_insert(&contract::weather_uri(), &batch)
        .await
        .unwrap();

    let deleted = store
        .locations()
        .delete_by_setting("94043")
        .await
        .expect("Delete failed");
    assert_eq!(deleted, 1);

    // Weather went with the location; the query is empty, not an error
    let rows = store
        .query(&contract::weather_for_location("94043"), None)
        .await
        .expect("Query after cascade failed");
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_unknown_location_query_is_empty_not_error() {
    let store = store_fixtures::setup_store().await;

    let rows = store
        .query(&contract::weather_for_location("00000"), None)
        .await
        .expect("Query failed");

    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_location_upsert_updates_in_place() {
    let store = store_fixtures::setup_store().await;

    let first_id = store
        .insert_location(&contract::location_uri(), &store_fixtures::mountain_view())
        .await
        .unwrap();

    let moved = NewLocation {
        location_setting: "94043".to_string(),
        city_name: "Mountain View, CA".to_string(),
        coord_lat: 37.4,
        coord_long: -122.1,
    };
    let second_id = store
        .insert_location(&contract::location_uri(), &moved)
        .await
        .unwrap();

    assert_eq!(first_id, second_id);
    let locations = store
        .query_locations(&contract::location_uri())
        .await
        .unwrap();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].city_name, "Mountain View, CA");
}

#[tokio::test]
async fn test_location_lookup_and_count_after_upsert() {
    let store = store_fixtures::setup_store().await;
    assert_eq!(store.locations().count().await.unwrap(), 0);

    store
        .insert_location(&contract::location_uri(), &store_fixtures::mountain_view())
        .await
        .unwrap();

    assert_eq!(store.locations().count().await.unwrap(), 1);

    let found = store
        .locations()
        .find_by_setting("94043")
        .await
        .unwrap()
        .expect("location row should exist");
    assert_eq!(found.city_name, "Mountain View");
    assert_eq!(found.coord_lat, 37.386);

    assert!(store
        .locations()
        .find_by_setting("00000")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_update_addressed_by_exact_date_uri() {
    let store = store_fixtures::setup_store().await;
    let location_id = store
        .insert_location(&contract::location_uri(), &store_fixtures::mountain_view())
        .await
        .unwrap();

    let t = store_fixtures::base_timestamp();
    store
        .insert_weather(
            &contract::weather_uri(),
            &store_fixtures::weather_row(location_id, t, "Clear"),
        )
        .await
        .unwrap();

    let uri = contract::weather_for_location_with_date("94043", t).unwrap();
    let affected = store
        .update_weather(
            &uri,
            &WeatherUpdate {
                weather_id: 500,
                short_desc: "Light rain".to_string(),
                min: 10.0,
                max: 17.0,
                humidity: 90.0,
                pressure: 1001.0,
                wind: 6.0,
                degrees: 220.0,
            },
        )
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let rows = store.query(&uri, None).await.unwrap();
    assert_eq!(rows[0].short_desc, "Light rain");
    assert_eq!(rows[0].weather_id, 500);
}

#[tokio::test]
async fn test_delete_before_prunes_old_days() {
    let store = store_fixtures::setup_store().await;
    let location_id = store
        .insert_location(&contract::location_uri(), &store_fixtures::mountain_view())
        .await
        .unwrap();

    let t = store_fixtures::base_timestamp();
    let batch = vec![
        store_fixtures::weather_row(location_id, t - 2 * DAY_IN_MILLIS, "Stale"),
        store_fixtures::weather_row(location_id, t - DAY_IN_MILLIS, "Stale"),
        store_fixtures::weather_row(location_id, t, "Current"),
    ];
    store
        .bulk_insert(&contract::weather_uri(), &batch)
        .await
        .unwrap();

    let pruned = store.weather().delete_before(t).await.unwrap();
    assert_eq!(pruned, 2);

    let rows = store
        .query(&contract::weather_for_location("94043"), None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].short_desc, "Current");
}

#[tokio::test]
async fn test_closed_store_surfaces_storage_unavailable() {
    let db = DbPool::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory store");
    let store = WeatherStore::new(db.clone());

    db.pool().close().await;

    let result = store
        .query(&contract::weather_for_location("94043"), None)
        .await;
    assert!(matches!(result, Err(StoreError::StorageUnavailable(_))));
}
