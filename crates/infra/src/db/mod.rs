//! Database adapters (connection pools, item repository, schema).

mod error;
pub mod sqlite;

pub use sqlite::SqliteItemStore;
