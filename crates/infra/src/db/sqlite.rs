//! SQLite-backed item store.
//!
//! A `SqliteItemStore` is an explicitly opened handle: `open` connects and
//! creates the `items` table if absent, `close` drains the pool. Every
//! operation checks a connection out of the pool for that one statement and
//! returns it afterwards; nothing spans operations.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use stockroom_core::ItemId;
use stockroom_inventory::{Item, ItemDraft, ItemStore, StoreError, StoreResult};

use super::error::store_failure;
use crate::config::{DatabaseConfig, DatabaseLocation};

const CREATE_ITEMS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS items (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        name         TEXT NOT NULL,
        description  TEXT,
        quantity     INTEGER NOT NULL DEFAULT 0,
        price        REAL NOT NULL DEFAULT 0.0,
        category     TEXT NOT NULL,
        created_date TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        last_updated TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// Format SQLite's `CURRENT_TIMESTAMP` default writes (UTC).
const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct SqliteItemStore {
    pool: SqlitePool,
}

impl SqliteItemStore {
    /// Connect to the configured database and ensure the schema exists.
    pub async fn open(config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = match &config.location {
            DatabaseLocation::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|err| {
                        tracing::error!(path = ?parent, error = %err, "failed to create database directory");
                        StoreError::Unavailable(format!(
                            "failed to create database directory at {parent:?}: {err}"
                        ))
                    })?;
                }

                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true);

                SqlitePoolOptions::new()
                    .max_connections(config.max_connections.max(1))
                    .connect_with(options)
                    .await
                    .map_err(store_failure("open"))?
            }
            DatabaseLocation::InMemory => {
                let options =
                    SqliteConnectOptions::from_str("sqlite::memory:").map_err(store_failure("open"))?;

                // Every in-memory connection is its own database, so pin exactly one.
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options)
                    .await
                    .map_err(store_failure("open"))?
            }
        };

        let store = Self { pool };
        store.ensure_schema().await?;
        tracing::info!(location = ?config.location, "item store opened");
        Ok(store)
    }

    /// Open a private in-memory database (tests/dev).
    pub async fn in_memory() -> StoreResult<Self> {
        Self::open(&DatabaseConfig::in_memory()).await
    }

    /// Close the pool, waiting for checked-out connections to be returned.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("item store closed");
    }

    /// Underlying pool, for callers that need raw SQL (e.g. fixtures).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(CREATE_ITEMS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(store_failure("create_schema"))?;
        Ok(())
    }
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn insert(&self, draft: &ItemDraft) -> StoreResult<Item> {
        let now = timestamp_now();
        let row = sqlx::query(
            r#"
            INSERT INTO items (
                name,
                description,
                quantity,
                price,
                category,
                created_date,
                last_updated
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING *
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.quantity)
        .bind(draft.price)
        .bind(&draft.category)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(store_failure("insert"))?;

        let item = row_to_item(&row)?;
        tracing::debug!(item_id = %item.id, "inserted item row");
        Ok(item)
    }

    async fn find_by_id(&self, id: ItemId) -> StoreResult<Option<Item>> {
        let row = sqlx::query("SELECT * FROM items WHERE id = ?1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_failure("find_by_id"))?;

        row.as_ref().map(row_to_item).transpose()
    }

    async fn find_all(&self) -> StoreResult<Vec<Item>> {
        let rows = sqlx::query("SELECT * FROM items ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
            .map_err(store_failure("find_all"))?;

        rows.iter().map(row_to_item).collect()
    }

    async fn find_by_category(&self, category: &str) -> StoreResult<Vec<Item>> {
        let rows = sqlx::query("SELECT * FROM items WHERE category = ?1 ORDER BY name, id")
            .bind(category)
            .fetch_all(&self.pool)
            .await
            .map_err(store_failure("find_by_category"))?;

        rows.iter().map(row_to_item).collect()
    }

    async fn search(&self, term: &str) -> StoreResult<Vec<Item>> {
        let pattern = format!("%{}%", escape_like(term));
        let rows = sqlx::query(
            r#"
            SELECT *
            FROM items
            WHERE lower(name) LIKE lower(?1) ESCAPE '\'
               OR lower(COALESCE(description, '')) LIKE lower(?1) ESCAPE '\'
            ORDER BY name, id
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(store_failure("search"))?;

        rows.iter().map(row_to_item).collect()
    }

    async fn update(&self, item: &Item) -> StoreResult<Item> {
        let row = sqlx::query(
            r#"
            UPDATE items
            SET name = ?1,
                description = ?2,
                quantity = ?3,
                price = ?4,
                category = ?5,
                last_updated = ?6
            WHERE id = ?7
            RETURNING *
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.price)
        .bind(&item.category)
        .bind(timestamp_now())
        .bind(item.id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_failure("update"))?;

        match row {
            Some(row) => row_to_item(&row),
            None => {
                tracing::debug!(item_id = %item.id, "update matched no row");
                Err(StoreError::NotFound)
            }
        }
    }

    async fn update_quantity(&self, id: ItemId, quantity: i64) -> StoreResult<Item> {
        let row = sqlx::query(
            r#"
            UPDATE items
            SET quantity = ?1,
                last_updated = ?2
            WHERE id = ?3
            RETURNING *
            "#,
        )
        .bind(quantity)
        .bind(timestamp_now())
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_failure("update_quantity"))?;

        match row {
            Some(row) => row_to_item(&row),
            None => {
                tracing::debug!(item_id = %id, "quantity update matched no row");
                Err(StoreError::NotFound)
            }
        }
    }

    async fn delete(&self, id: ItemId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(store_failure("delete"))?;

        if result.rows_affected() == 0 {
            tracing::debug!(item_id = %id, "delete matched no row");
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn count(&self) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await
            .map_err(store_failure("count"))
    }

    async fn total_value(&self) -> StoreResult<f64> {
        sqlx::query_scalar::<_, f64>(
            "SELECT CAST(COALESCE(SUM(quantity * price), 0) AS REAL) FROM items",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(store_failure("total_value"))
    }

    async fn distinct_categories(&self) -> StoreResult<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT DISTINCT category FROM items ORDER BY category")
            .fetch_all(&self.pool)
            .await
            .map_err(store_failure("distinct_categories"))
    }
}

fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Escape LIKE wildcards so the term matches literally (escape char `\`).
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Map a database row into an `Item`.
fn row_to_item(row: &SqliteRow) -> StoreResult<Item> {
    let id: i64 = column(row, "id")?;
    let created: Option<String> = column(row, "created_date")?;
    let updated: Option<String> = column(row, "last_updated")?;

    let created_at = parse_timestamp(created.as_deref(), "created_date", id)?;
    let updated_at = match updated {
        Some(raw) => parse_timestamp(Some(&raw), "last_updated", id)?,
        None => created_at,
    };

    Ok(Item {
        id: ItemId::new(id),
        name: column(row, "name")?,
        description: column(row, "description")?,
        quantity: column(row, "quantity")?,
        price: column(row, "price")?,
        category: column(row, "category")?,
        created_at,
        updated_at,
    })
}

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> StoreResult<T>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name).map_err(store_failure("decode_row"))
}

/// Accepts RFC 3339 (written by this store) and SQLite's `CURRENT_TIMESTAMP`
/// text (written by schema defaults).
fn parse_timestamp(raw: Option<&str>, column: &str, id: i64) -> StoreResult<DateTime<Utc>> {
    let raw = raw.ok_or_else(|| StoreError::Corrupt(format!("items.{column} is NULL for id {id}")))?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, SQLITE_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|err| {
            tracing::error!(column, id, raw, error = %err, "unparseable timestamp in items table");
            StoreError::Corrupt(format!("invalid items.{column} {raw:?} for id {id}: {err}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn parses_both_timestamp_formats() {
        let rfc = parse_timestamp(Some("2024-03-01T10:20:30.123456Z"), "created_date", 1).unwrap();
        assert_eq!(rfc.to_rfc3339_opts(SecondsFormat::Micros, true), "2024-03-01T10:20:30.123456Z");

        let sqlite = parse_timestamp(Some("2024-03-01 10:20:30"), "created_date", 1).unwrap();
        assert_eq!(sqlite.to_rfc3339(), "2024-03-01T10:20:30+00:00");
    }

    #[test]
    fn rejects_missing_or_garbled_timestamps() {
        assert!(matches!(
            parse_timestamp(None, "created_date", 1),
            Err(StoreError::Corrupt(_))
        ));
        assert!(matches!(
            parse_timestamp(Some("yesterday"), "created_date", 1),
            Err(StoreError::Corrupt(_))
        ));
    }
}
