//! Inventory service: validation and business policy atop an `ItemStore`.
//!
//! Every write passes the field rules in [`validate_item`](crate::validate_item)
//! before it reaches the store, so the store never holds an item the service
//! would reject (unless written through the store directly).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockroom_core::{DomainError, ItemId};

use crate::item::{Item, ItemDraft};
use crate::store::{ItemStore, StoreError};

pub type InventoryResult<T> = Result<T, InventoryError>;

/// Error returned by service operations.
///
/// `Domain` covers caller-correctable outcomes (validation, missing item,
/// duplicate name); `Store` carries storage faults through unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl InventoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            InventoryError::Domain(DomainError::NotFound) | InventoryError::Store(StoreError::NotFound)
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, InventoryError::Domain(DomainError::Validation(_)))
    }
}

/// Per-category stock totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub item_count: usize,
    pub total_value: f64,
}

/// Validation and policy layer consumed by the presentation side.
#[derive(Debug)]
pub struct InventoryService<S> {
    store: S,
}

impl<S: ItemStore> InventoryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Validate and persist a new item. Does not check for duplicate names.
    pub async fn add_item(&self, draft: ItemDraft) -> InventoryResult<Item> {
        self.validate_item(&draft)?;
        let item = self.store.insert(&draft).await?;
        tracing::info!(item_id = %item.id, name = %item.name, "item added");
        Ok(item)
    }

    /// Like [`add_item`](Self::add_item), but declines names that already exist
    /// (case-insensitive).
    pub async fn add_unique_item(&self, draft: ItemDraft) -> InventoryResult<Item> {
        self.validate_item(&draft)?;
        if self.item_exists(&draft.name).await? {
            tracing::warn!(name = %draft.name, "item declined: name already exists");
            return Err(DomainError::conflict(format!(
                "an item named '{}' already exists",
                draft.name.trim()
            ))
            .into());
        }
        self.add_item(draft).await
    }

    pub async fn update_item(&self, item: &Item) -> InventoryResult<Item> {
        if let Err(err) = item.validate() {
            tracing::warn!(item_id = %item.id, %err, "update declined");
            return Err(err.into());
        }
        let updated = self.store.update(item).await?;
        tracing::info!(item_id = %updated.id, "item updated");
        Ok(updated)
    }

    pub async fn delete_item(&self, id: ItemId) -> InventoryResult<()> {
        self.store.delete(id).await?;
        tracing::info!(item_id = %id, "item deleted");
        Ok(())
    }

    pub async fn get_item(&self, id: ItemId) -> InventoryResult<Option<Item>> {
        Ok(self.store.find_by_id(id).await?)
    }

    pub async fn all_items(&self) -> InventoryResult<Vec<Item>> {
        Ok(self.store.find_all().await?)
    }

    /// Substring search on name/description. A blank term lists everything.
    pub async fn search_items(&self, term: &str) -> InventoryResult<Vec<Item>> {
        let term = term.trim();
        if term.is_empty() {
            return self.all_items().await;
        }
        Ok(self.store.search(term).await?)
    }

    pub async fn items_by_category(&self, category: &str) -> InventoryResult<Vec<Item>> {
        Ok(self.store.find_by_category(category).await?)
    }

    /// Add `delta` to the current quantity, never going below zero.
    pub async fn adjust_quantity(&self, id: ItemId, delta: i64) -> InventoryResult<Item> {
        let item = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(DomainError::not_found)?;

        let quantity = clamped_quantity(item.quantity, delta);
        if quantity == 0 && item.quantity.saturating_add(delta) < 0 {
            tracing::debug!(item_id = %id, delta, "adjustment clamped at zero");
        }
        let updated = self.store.update_quantity(id, quantity).await?;
        tracing::info!(item_id = %id, from = item.quantity, to = updated.quantity, "quantity adjusted");
        Ok(updated)
    }

    pub async fn set_quantity(&self, id: ItemId, quantity: i64) -> InventoryResult<Item> {
        if quantity < 0 {
            tracing::warn!(item_id = %id, quantity, "set quantity declined");
            return Err(DomainError::validation("quantity cannot be negative").into());
        }
        let updated = self.store.update_quantity(id, quantity).await?;
        tracing::info!(item_id = %id, quantity, "quantity set");
        Ok(updated)
    }

    pub async fn total_item_count(&self) -> InventoryResult<i64> {
        Ok(self.store.count().await?)
    }

    pub async fn total_inventory_value(&self) -> InventoryResult<f64> {
        Ok(self.store.total_value().await?)
    }

    pub async fn categories(&self) -> InventoryResult<Vec<String>> {
        Ok(self.store.distinct_categories().await?)
    }

    /// Items with `quantity <= threshold`, in name order.
    pub async fn low_stock_items(&self, threshold: i64) -> InventoryResult<Vec<Item>> {
        let items = self.all_items().await?;
        Ok(items
            .into_iter()
            .filter(|item| item.is_low_stock(threshold))
            .collect())
    }

    /// Item count and stock value per category, in category order.
    pub async fn category_breakdown(&self) -> InventoryResult<Vec<CategorySummary>> {
        let items = self.all_items().await?;
        let mut by_category: BTreeMap<String, CategorySummary> = BTreeMap::new();
        for item in &items {
            let summary = by_category
                .entry(item.category.clone())
                .or_insert_with(|| CategorySummary {
                    category: item.category.clone(),
                    item_count: 0,
                    total_value: 0.0,
                });
            summary.item_count += 1;
            summary.total_value += item.value();
        }
        Ok(by_category.into_values().collect())
    }

    /// True when any stored item has this name (case-insensitive, trimmed).
    ///
    /// Scans every item; there is no name index.
    pub async fn item_exists(&self, name: &str) -> InventoryResult<bool> {
        let items = self.all_items().await?;
        Ok(items.iter().any(|item| item.has_name(name)))
    }

    pub fn is_valid_item(&self, draft: &ItemDraft) -> bool {
        draft.is_valid()
    }

    /// Like [`is_valid_item`](Self::is_valid_item), but reports which rule failed.
    pub fn validate_item(&self, draft: &ItemDraft) -> InventoryResult<()> {
        draft.validate().map_err(|err| {
            tracing::warn!(name = %draft.name, %err, "item declined");
            err.into()
        })
    }
}

fn clamped_quantity(current: i64, delta: i64) -> i64 {
    current.saturating_add(delta).max(0)
}
