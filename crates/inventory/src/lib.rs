//! Inventory domain module.
//!
//! Item model, validation rules, the `ItemStore` persistence port and the
//! `InventoryService` policy layer. No SQL lives here; storage backends
//! implement `ItemStore` elsewhere (see `stockroom-infra`).

pub mod item;
pub mod service;
pub mod store;

pub use item::{Item, ItemDraft, validate_item};
pub use service::{CategorySummary, InventoryError, InventoryResult, InventoryService};
pub use store::{InMemoryItemStore, ItemStore, StoreError, StoreResult};
