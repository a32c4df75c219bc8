//! View types handed to the GUI shell.
//!
//! Plain serializable data; no handles to the store or runtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::ItemId;
use stockroom_inventory::Item;

/// Stock level indicator shown next to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    /// Quantity at or below the low-stock threshold.
    Low,
    InStock,
}

impl StockStatus {
    pub fn for_quantity(quantity: i64, threshold: i64) -> Self {
        if quantity <= threshold {
            StockStatus::Low
        } else {
            StockStatus::InStock
        }
    }
}

/// One item line on the dashboard's recent activity list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRow {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub price: f64,
    pub status: StockStatus,
    pub updated_at: DateTime<Utc>,
}

impl ItemRow {
    pub fn from_item(item: &Item, threshold: i64) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            category: item.category.clone(),
            quantity: item.quantity,
            price: item.price,
            status: StockStatus::for_quantity(item.quantity, threshold),
            updated_at: item.updated_at,
        }
    }
}

/// Headline numbers shared by the dashboard and the reports view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_items: i64,
    pub total_value: f64,
    pub category_count: usize,
}

/// Everything the dashboard renders, loaded in one background pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub summary: SummaryStats,
    pub low_stock_threshold: i64,
    pub low_stock_count: usize,
    /// Most recently updated items, newest first.
    pub recent_items: Vec<ItemRow>,
}
