//! Application configuration, read from the environment at bootstrap.
//!
//! - `STOCKROOM_LOW_STOCK_THRESHOLD`: dashboard low-stock threshold (default 5)
//! - `STOCKROOM_LOG_FORMAT`: `json` (default) or `pretty`
//! - database settings: see [`stockroom_infra::config`]

use anyhow::Context;
use stockroom_infra::DatabaseConfig;
use stockroom_observability::LogFormat;

pub const LOW_STOCK_THRESHOLD_ENV: &str = "STOCKROOM_LOW_STOCK_THRESHOLD";
pub const LOG_FORMAT_ENV: &str = "STOCKROOM_LOG_FORMAT";

pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub low_stock_threshold: i64,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn new(database: DatabaseConfig) -> Self {
        Self {
            database,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            log_format: LogFormat::default(),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database = DatabaseConfig::from_lookup(&lookup).context("invalid database configuration")?;
        let mut config = Self::new(database);

        if let Some(raw) = lookup(LOW_STOCK_THRESHOLD_ENV) {
            let threshold = raw
                .trim()
                .parse::<i64>()
                .with_context(|| format!("{LOW_STOCK_THRESHOLD_ENV} must be an integer, got {raw:?}"))?;
            if threshold < 0 {
                anyhow::bail!("{LOW_STOCK_THRESHOLD_ENV} cannot be negative");
            }
            config.low_stock_threshold = threshold;
        }

        if let Some(raw) = lookup(LOG_FORMAT_ENV) {
            config.log_format = raw
                .parse::<LogFormat>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("invalid {LOG_FORMAT_ENV}"))?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[("STOCKROOM_DB_PATH", "/tmp/inv.db")])).unwrap();
        assert_eq!(config.low_stock_threshold, DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.database.path(), Some(Path::new("/tmp/inv.db")));
    }

    #[test]
    fn reads_threshold_and_log_format() {
        let config = AppConfig::from_lookup(lookup(&[
            ("STOCKROOM_DB_PATH", "/tmp/inv.db"),
            (LOW_STOCK_THRESHOLD_ENV, "12"),
            (LOG_FORMAT_ENV, "pretty"),
        ]))
        .unwrap();
        assert_eq!(config.low_stock_threshold, 12);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn rejects_bad_values() {
        for vars in [
            [(LOW_STOCK_THRESHOLD_ENV, "-1"), (LOG_FORMAT_ENV, "json")],
            [(LOW_STOCK_THRESHOLD_ENV, "five"), (LOG_FORMAT_ENV, "json")],
            [(LOW_STOCK_THRESHOLD_ENV, "5"), (LOG_FORMAT_ENV, "yaml")],
        ] {
            let mut all = vec![("STOCKROOM_DB_PATH", "/tmp/inv.db")];
            all.extend(vars);
            assert!(AppConfig::from_lookup(lookup(&all)).is_err(), "{vars:?} should be rejected");
        }
    }
}
