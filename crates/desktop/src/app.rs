//! Application context shared by every view.

use std::sync::Arc;

use anyhow::Context;
use stockroom_infra::SqliteItemStore;
use stockroom_inventory::{InventoryResult, InventoryService};

use crate::config::AppConfig;
use crate::refresh::DashboardRefresher;
use crate::report::ReportsView;

/// Owns the inventory service every view talks to.
///
/// Views share one `AppContext`; there is no other channel between them.
#[derive(Debug, Clone)]
pub struct AppContext {
    service: Arc<InventoryService<SqliteItemStore>>,
    config: AppConfig,
}

impl AppContext {
    /// Initialize logging, open the database and build the service.
    pub async fn bootstrap(config: AppConfig) -> anyhow::Result<Self> {
        stockroom_observability::init(config.log_format);
        Self::open(config).await
    }

    /// Open the database and build the service, leaving logging untouched.
    pub async fn open(config: AppConfig) -> anyhow::Result<Self> {
        let store = SqliteItemStore::open(&config.database)
            .await
            .with_context(|| format!("failed to open inventory database ({:?})", config.database.location))?;

        tracing::info!(
            low_stock_threshold = config.low_stock_threshold,
            "inventory service ready"
        );

        Ok(Self {
            service: Arc::new(InventoryService::new(store)),
            config,
        })
    }

    pub fn service(&self) -> &InventoryService<SqliteItemStore> {
        &self.service
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// A refresher for the dashboard, using the configured threshold.
    pub fn dashboard_refresher(&self) -> DashboardRefresher<SqliteItemStore> {
        DashboardRefresher::new(self.service.clone(), self.config.low_stock_threshold)
    }

    /// Load the reports view at the configured threshold.
    pub async fn reports(&self) -> InventoryResult<ReportsView> {
        ReportsView::load(&self.service, self.config.low_stock_threshold).await
    }

    /// Close the database.
    ///
    /// The pool is shared by every clone of this context and every
    /// refresher built from it; after this returns their store calls fail
    /// with `StoreError::Unavailable`.
    pub async fn shutdown(self) {
        let shared = Arc::strong_count(&self.service) - 1;
        if shared > 0 {
            tracing::debug!(shared, "closing database while the service is still shared");
        }
        self.service.store().clone().close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use stockroom_infra::DatabaseConfig;
    use stockroom_inventory::{InventoryError, ItemDraft, StoreError};

    async fn context() -> AppContext {
        AppContext::open(AppConfig::new(DatabaseConfig::in_memory()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn views_share_one_service() {
        let ctx = context().await;
        let other_view = ctx.clone();

        ctx.service()
            .add_item(ItemDraft::new("Widget", "Parts").with_quantity(1))
            .await
            .unwrap();
        assert_eq!(other_view.service().total_item_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn dashboard_refresh_runs_against_the_database() {
        let ctx = context().await;
        ctx.service()
            .add_item(ItemDraft::new("Widget", "Parts").with_quantity(9).with_price(2.0))
            .await
            .unwrap();

        let seen = std::sync::Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let delivered = ctx
            .dashboard_refresher()
            .refresh(move |result| *sink.lock().unwrap() = Some(result))
            .await
            .unwrap();
        assert!(delivered);

        let snapshot = seen.lock().unwrap().take().unwrap().unwrap();
        assert_eq!(snapshot.summary.total_value, 18.0);
        assert_eq!(snapshot.low_stock_count, 0);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["recent_items"][0]["status"], "in_stock");
    }

    #[tokio::test]
    async fn reports_use_configured_threshold() {
        let mut config = AppConfig::new(DatabaseConfig::in_memory());
        config.low_stock_threshold = 2;
        let ctx = AppContext::open(config).await.unwrap();
        ctx.service()
            .add_item(ItemDraft::new("Bolt", "Parts").with_quantity(2))
            .await
            .unwrap();

        let reports = ctx.reports().await.unwrap();
        assert!(reports.low_stock.starts_with("Items with quantity <= 2:"));
        assert!(reports.low_stock.ends_with("Total low stock items: 1"));
        assert_eq!(reports.summary.total_items, 1);
    }

    #[tokio::test]
    async fn bootstrap_installs_logging_and_opens_store() {
        let ctx = AppContext::bootstrap(AppConfig::new(DatabaseConfig::in_memory()))
            .await
            .unwrap();
        assert_eq!(ctx.service().total_item_count().await.unwrap(), 0);
        ctx.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_closes_the_pool_for_every_holder() {
        let ctx = context().await;
        let other_view = ctx.clone();
        let refresher = ctx.dashboard_refresher();

        ctx.shutdown().await;

        let err = other_view.service().total_item_count().await.unwrap_err();
        assert!(matches!(err, InventoryError::Store(StoreError::Unavailable(_))), "{err:?}");

        let seen = std::sync::Arc::new(Mutex::new(None));
        let sink = seen.clone();
        refresher
            .refresh(move |result| *sink.lock().unwrap() = Some(result))
            .await
            .unwrap();
        assert!(seen.lock().unwrap().take().unwrap().is_err());
    }
}
