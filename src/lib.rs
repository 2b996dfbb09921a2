pub mod binder;
pub mod config;
pub mod contract;
pub mod date;
pub mod db;
