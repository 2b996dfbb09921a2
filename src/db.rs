pub mod error;
pub mod location_repository;
pub mod models;
pub mod pool;
pub mod store;
pub mod weather_repository;

pub use error::StoreError;
pub use location_repository::LocationRepository;
pub use models::*;
pub use pool::DbPool;
pub use store::WeatherStore;
pub use weather_repository::{SortOrder, WeatherRepository};
