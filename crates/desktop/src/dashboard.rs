//! Dashboard snapshot loading.

use stockroom_inventory::{InventoryResult, InventoryService, ItemStore};

use crate::types::{DashboardSnapshot, ItemRow, SummaryStats};

/// How many items the recent activity list shows.
pub const RECENT_ITEM_LIMIT: usize = 5;

impl SummaryStats {
    pub async fn load<S: ItemStore>(service: &InventoryService<S>) -> InventoryResult<Self> {
        Ok(Self {
            total_items: service.total_item_count().await?,
            total_value: service.total_inventory_value().await?,
            category_count: service.categories().await?.len(),
        })
    }
}

impl DashboardSnapshot {
    pub async fn load<S: ItemStore>(
        service: &InventoryService<S>,
        low_stock_threshold: i64,
    ) -> InventoryResult<Self> {
        let summary = SummaryStats::load(service).await?;
        let low_stock_count = service.low_stock_items(low_stock_threshold).await?.len();

        let mut items = service.all_items().await?;
        items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        let recent_items = items
            .iter()
            .take(RECENT_ITEM_LIMIT)
            .map(|item| ItemRow::from_item(item, low_stock_threshold))
            .collect();

        Ok(Self {
            summary,
            low_stock_threshold,
            low_stock_count,
            recent_items,
        })
    }
}
