//! Infrastructure layer: database configuration and the SQLite item store.

pub mod config;
pub mod db;

pub use config::{DatabaseConfig, DatabaseLocation};
pub use db::SqliteItemStore;
