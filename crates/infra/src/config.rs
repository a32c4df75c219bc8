//! Database configuration.
//!
//! Read once at bootstrap from the environment:
//! - `STOCKROOM_DB_PATH`: database file (default `{app_data_dir}/stockroom/inventory.db`)
//! - `STOCKROOM_DB_MAX_CONNECTIONS`: pool size for file databases (default 4)

use std::path::{Path, PathBuf};

use anyhow::Context;

pub const DB_PATH_ENV: &str = "STOCKROOM_DB_PATH";
pub const DB_MAX_CONNECTIONS_ENV: &str = "STOCKROOM_DB_MAX_CONNECTIONS";

const DEFAULT_MAX_CONNECTIONS: u32 = 4;

/// Where the item table lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// A SQLite file, created (with its parent directory) if missing.
    File(PathBuf),
    /// A private in-memory database; contents vanish when the store closes.
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub location: DatabaseLocation,
    /// Upper bound on pooled connections. Ignored for in-memory databases,
    /// which always use a single connection.
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DatabaseLocation::File(path.into()),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: DatabaseLocation::InMemory,
            max_connections: 1,
        }
    }

    /// Load from process environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let path = match lookup(DB_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        let mut config = Self::file(path);
        if let Some(raw) = lookup(DB_MAX_CONNECTIONS_ENV) {
            let max = raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("{DB_MAX_CONNECTIONS_ENV} must be a positive integer, got {raw:?}"))?;
            if max == 0 {
                anyhow::bail!("{DB_MAX_CONNECTIONS_ENV} must be at least 1");
            }
            config.max_connections = max;
        }
        Ok(config)
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            DatabaseLocation::File(path) => Some(path),
            DatabaseLocation::InMemory => None,
        }
    }
}

/// Resolve the default database path: `{app_data_dir}/stockroom/inventory.db`.
pub fn default_db_path() -> anyhow::Result<PathBuf> {
    let mut dir = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

    dir.push("stockroom");
    dir.push("inventory.db");
    Ok(dir)
}
