//! Persistence port for inventory items.
//!
//! `ItemStore` is the gateway contract the service runs on. The SQLite
//! implementation lives in `stockroom-infra`; `InMemoryItemStore` mirrors its
//! observable behavior (ordering, search semantics, timestamps) for tests/dev.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

use stockroom_core::ItemId;

use crate::item::{Item, ItemDraft};

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A write targeted an identity that does not exist.
    #[error("item not found")]
    NotFound,

    /// The backing store could not be reached (I/O, pool, configuration).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The store rejected a write (NOT NULL, CHECK, UNIQUE, ...).
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// Malformed statement or other store-reported failure.
    #[error("query failed: {0}")]
    Query(String),

    /// A stored row could not be mapped back into an `Item`.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Item persistence gateway.
///
/// Listing operations return items sorted by name (byte order), ties broken
/// by id. `search` is a case-insensitive (ASCII) literal substring match on
/// name or description. Timestamps are always assigned by the store.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn insert(&self, draft: &ItemDraft) -> StoreResult<Item>;
    async fn find_by_id(&self, id: ItemId) -> StoreResult<Option<Item>>;
    async fn find_all(&self) -> StoreResult<Vec<Item>>;
    async fn find_by_category(&self, category: &str) -> StoreResult<Vec<Item>>;
    async fn search(&self, term: &str) -> StoreResult<Vec<Item>>;
    /// Replace all mutable fields by identity; refreshes `updated_at`.
    async fn update(&self, item: &Item) -> StoreResult<Item>;
    /// Set the quantity by identity; refreshes `updated_at`.
    async fn update_quantity(&self, id: ItemId, quantity: i64) -> StoreResult<Item>;
    async fn delete(&self, id: ItemId) -> StoreResult<()>;
    async fn count(&self) -> StoreResult<i64>;
    /// Sum of quantity × price over all items (`0.0` when empty).
    async fn total_value(&self) -> StoreResult<f64>;
    async fn distinct_categories(&self) -> StoreResult<Vec<String>>;
}

#[async_trait]
impl<S> ItemStore for Arc<S>
where
    S: ItemStore + ?Sized,
{
    async fn insert(&self, draft: &ItemDraft) -> StoreResult<Item> {
        (**self).insert(draft).await
    }

    async fn find_by_id(&self, id: ItemId) -> StoreResult<Option<Item>> {
        (**self).find_by_id(id).await
    }

    async fn find_all(&self) -> StoreResult<Vec<Item>> {
        (**self).find_all().await
    }

    async fn find_by_category(&self, category: &str) -> StoreResult<Vec<Item>> {
        (**self).find_by_category(category).await
    }

    async fn search(&self, term: &str) -> StoreResult<Vec<Item>> {
        (**self).search(term).await
    }

    async fn update(&self, item: &Item) -> StoreResult<Item> {
        (**self).update(item).await
    }

    async fn update_quantity(&self, id: ItemId, quantity: i64) -> StoreResult<Item> {
        (**self).update_quantity(id, quantity).await
    }

    async fn delete(&self, id: ItemId) -> StoreResult<()> {
        (**self).delete(id).await
    }

    async fn count(&self) -> StoreResult<i64> {
        (**self).count().await
    }

    async fn total_value(&self) -> StoreResult<f64> {
        (**self).total_value().await
    }

    async fn distinct_categories(&self) -> StoreResult<Vec<String>> {
        (**self).distinct_categories().await
    }
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    items: BTreeMap<ItemId, Item>,
}

/// In-memory item store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    inner: RwLock<State>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> StoreResult<T> {
        let state = self
            .inner
            .read()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))?;
        Ok(f(&state))
    }

    fn write<T>(&self, f: impl FnOnce(&mut State) -> StoreResult<T>) -> StoreResult<T> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))?;
        f(&mut state)
    }

    fn sorted(&self, keep: impl Fn(&Item) -> bool) -> StoreResult<Vec<Item>> {
        self.read(|state| {
            let mut items: Vec<Item> = state.items.values().filter(|i| keep(i)).cloned().collect();
            items.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            items
        })
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn insert(&self, draft: &ItemDraft) -> StoreResult<Item> {
        self.write(|state| {
            state.last_id += 1;
            let now = Utc::now();
            let item = Item {
                id: ItemId::new(state.last_id),
                name: draft.name.clone(),
                description: draft.description.clone(),
                quantity: draft.quantity,
                price: draft.price,
                category: draft.category.clone(),
                created_at: now,
                updated_at: now,
            };
            state.items.insert(item.id, item.clone());
            Ok(item)
        })
    }

    async fn find_by_id(&self, id: ItemId) -> StoreResult<Option<Item>> {
        self.read(|state| state.items.get(&id).cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<Item>> {
        self.sorted(|_| true)
    }

    async fn find_by_category(&self, category: &str) -> StoreResult<Vec<Item>> {
        self.sorted(|item| item.category == category)
    }

    async fn search(&self, term: &str) -> StoreResult<Vec<Item>> {
        let needle = term.to_ascii_lowercase();
        self.sorted(|item| {
            item.name.to_ascii_lowercase().contains(&needle)
                || item
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_ascii_lowercase().contains(&needle))
        })
    }

    async fn update(&self, item: &Item) -> StoreResult<Item> {
        self.write(|state| {
            let existing = state.items.get_mut(&item.id).ok_or(StoreError::NotFound)?;
            existing.name = item.name.clone();
            existing.description = item.description.clone();
            existing.quantity = item.quantity;
            existing.price = item.price;
            existing.category = item.category.clone();
            existing.updated_at = Utc::now();
            Ok(existing.clone())
        })
    }

    async fn update_quantity(&self, id: ItemId, quantity: i64) -> StoreResult<Item> {
        self.write(|state| {
            let existing = state.items.get_mut(&id).ok_or(StoreError::NotFound)?;
            existing.quantity = quantity;
            existing.updated_at = Utc::now();
            Ok(existing.clone())
        })
    }

    async fn delete(&self, id: ItemId) -> StoreResult<()> {
        self.write(|state| state.items.remove(&id).map(|_| ()).ok_or(StoreError::NotFound))
    }

    async fn count(&self) -> StoreResult<i64> {
        self.read(|state| state.items.len() as i64)
    }

    async fn total_value(&self) -> StoreResult<f64> {
        // Folding from +0.0 keeps an empty store at 0.0 rather than -0.0.
        self.read(|state| state.items.values().map(Item::value).fold(0.0, |acc, v| acc + v))
    }

    async fn distinct_categories(&self) -> StoreResult<Vec<String>> {
        self.read(|state| {
            state
                .items
                .values()
                .map(|item| item.category.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, category: &str, quantity: i64, price: f64) -> ItemDraft {
        ItemDraft::new(name, category)
            .with_quantity(quantity)
            .with_price(price)
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids_and_timestamps() {
        let store = InMemoryItemStore::new();
        let a = store.insert(&draft("A", "X", 1, 1.0)).await.unwrap();
        let b = store.insert(&draft("B", "X", 1, 1.0)).await.unwrap();

        assert!(b.id > a.id);
        assert_eq!(a.created_at, a.updated_at);
        assert_eq!(store.find_by_id(a.id).await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn find_all_sorts_by_name_then_id() {
        let store = InMemoryItemStore::new();
        store.insert(&draft("pear", "Fruit", 1, 1.0)).await.unwrap();
        let apple1 = store.insert(&draft("apple", "Fruit", 1, 1.0)).await.unwrap();
        let apple2 = store.insert(&draft("apple", "Fruit", 2, 1.0)).await.unwrap();
        store.insert(&draft("Zucchini", "Veg", 1, 1.0)).await.unwrap();

        let items = store.find_all().await.unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        // Byte order: uppercase sorts before lowercase.
        assert_eq!(names, vec!["Zucchini", "apple", "apple", "pear"]);
        assert_eq!(items[1].id, apple1.id);
        assert_eq!(items[2].id, apple2.id);
    }

    #[tokio::test]
    async fn search_matches_name_or_description_ignoring_ascii_case() {
        let store = InMemoryItemStore::new();
        store.insert(&draft("Blue Widget", "Hardware", 1, 1.0)).await.unwrap();
        store
            .insert(&draft("Gadget", "Hardware", 1, 1.0).with_description("pairs with a WIDGET"))
            .await
            .unwrap();
        store.insert(&draft("Sprocket", "Hardware", 1, 1.0)).await.unwrap();

        let hits = store.search("widget").await.unwrap();
        let names: Vec<_> = hits.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Blue Widget", "Gadget"]);
    }

    #[tokio::test]
    async fn writes_to_missing_ids_report_not_found() {
        let store = InMemoryItemStore::new();
        let item = store.insert(&draft("A", "X", 1, 1.0)).await.unwrap();
        store.delete(item.id).await.unwrap();

        assert_eq!(store.delete(item.id).await, Err(StoreError::NotFound));
        assert_eq!(store.update(&item).await, Err(StoreError::NotFound));
        assert_eq!(store.update_quantity(item.id, 3).await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn aggregates_cover_count_value_and_categories() {
        let store = InMemoryItemStore::new();
        assert_eq!(store.total_value().await.unwrap(), 0.0);

        store.insert(&draft("A", "Tools", 2, 3.0)).await.unwrap();
        store.insert(&draft("B", "Parts", 1, 5.0)).await.unwrap();
        store.insert(&draft("C", "Tools", 0, 9.0)).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 3);
        assert!((store.total_value().await.unwrap() - 11.0).abs() < 1e-9);
        assert_eq!(store.distinct_categories().await.unwrap(), vec!["Parts", "Tools"]);
    }

    #[tokio::test]
    async fn empty_store_total_is_positive_zero() {
        let store = InMemoryItemStore::new();
        let total = store.total_value().await.unwrap();
        assert_eq!(total, 0.0);
        assert!(!total.is_sign_negative());
        assert_eq!(format!("${total:.2}"), "$0.00");
    }
}
