use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, ItemId};

/// Caller-supplied fields for a new inventory item.
///
/// Carries no identity and no timestamps: both are assigned by the store
/// when the draft is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub price: f64,
    pub category: String,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            quantity: 0,
            price: 0.0,
            category: category.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_item(&self.name, &self.category, self.quantity, self.price)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// A persisted inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub price: f64,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// The mutable fields of this item as a draft.
    pub fn draft(&self) -> ItemDraft {
        ItemDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            quantity: self.quantity,
            price: self.price,
            category: self.category.clone(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_item(&self.name, &self.category, self.quantity, self.price)
    }

    /// Stock value: quantity × unit price.
    pub fn value(&self) -> f64 {
        self.quantity as f64 * self.price
    }

    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.quantity <= threshold
    }

    /// Case-insensitive name comparison, ignoring surrounding whitespace.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

/// Field rules every item accepted by the service must satisfy.
pub fn validate_item(name: &str, category: &str, quantity: i64, price: f64) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    if category.trim().is_empty() {
        return Err(DomainError::validation("category cannot be empty"));
    }
    if quantity < 0 {
        return Err(DomainError::validation("quantity cannot be negative"));
    }
    // NaN fails both comparisons, so test the accepted range directly.
    if !(price.is_finite() && price >= 0.0) {
        return Err(DomainError::validation("price must be a non-negative number"));
    }
    Ok(())
}
