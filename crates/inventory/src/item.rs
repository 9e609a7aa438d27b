use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use grainbridge_core::{DomainError, Entity, ItemId};

/// A stocked rice variety, counted in bags.
///
/// `quantity` is the only numeric field that changes in normal operation:
/// restocks and approved shipments add to it, orders deduct from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub price_per_bag: f64,
    pub supplier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input: create an item.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub quantity: i64,
    #[serde(default)]
    pub price_per_bag: f64,
    #[serde(default)]
    pub supplier: Option<String>,
}

/// Input: partial update of an existing item.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i64>,
    pub price_per_bag: Option<f64>,
    pub supplier: Option<String>,
}

pub fn validate_new_item(input: NewItem) -> Result<NewItem, DomainError> {
    let name = required_text("name", &input.name)?;
    let category = required_text("category", &input.category)?;
    ensure_quantity(input.quantity)?;
    ensure_price(input.price_per_bag)?;

    Ok(NewItem {
        name,
        category,
        quantity: input.quantity,
        price_per_bag: input.price_per_bag,
        supplier: input
            .supplier
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    })
}

impl InventoryItem {
    pub fn create(input: NewItem, now: DateTime<Utc>) -> Self {
        Self {
            id: ItemId::new(),
            name: input.name,
            category: input.category,
            quantity: input.quantity,
            price_per_bag: input.price_per_bag,
            supplier: input.supplier,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the whole update first; nothing changes on error.
    pub fn apply_update(&mut self, update: ItemUpdate, now: DateTime<Utc>) -> Result<(), DomainError> {
        let name = update.name.as_deref().map(|n| required_text("name", n)).transpose()?;
        let category = update
            .category
            .as_deref()
            .map(|c| required_text("category", c))
            .transpose()?;
        if let Some(q) = update.quantity {
            ensure_quantity(q)?;
        }
        if let Some(p) = update.price_per_bag {
            ensure_price(p)?;
        }

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(q) = update.quantity {
            self.quantity = q;
        }
        if let Some(p) = update.price_per_bag {
            self.price_per_bag = p;
        }
        if let Some(s) = update.supplier {
            let s = s.trim().to_string();
            self.supplier = if s.is_empty() { None } else { Some(s) };
        }
        self.updated_at = now;
        Ok(())
    }

    /// Add `amount` bags to stock.
    pub fn restock(&mut self, amount: i64, now: DateTime<Utc>) -> Result<(), DomainError> {
        if amount <= 0 {
            return Err(DomainError::validation("restock quantity must be greater than zero"));
        }
        self.quantity = self
            .quantity
            .checked_add(amount)
            .ok_or_else(|| DomainError::validation("restock quantity is too large"))?;
        self.updated_at = now;
        Ok(())
    }

    /// Remove `amount` bags; refuses to go below zero.
    pub fn deduct(&mut self, amount: i64, now: DateTime<Utc>) -> Result<(), DomainError> {
        if amount > self.quantity {
            return Err(DomainError::validation(format!(
                "Insufficient stock for {}: requested {}, available {}",
                self.name, amount, self.quantity
            )));
        }
        self.quantity -= amount;
        self.updated_at = now;
        Ok(())
    }
}

fn required_text(field: &str, value: &str) -> Result<String, DomainError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(v.to_string())
}

fn ensure_quantity(q: i64) -> Result<(), DomainError> {
    if q < 0 {
        return Err(DomainError::validation("quantity cannot be negative"));
    }
    Ok(())
}

fn ensure_price(p: f64) -> Result<(), DomainError> {
    if !p.is_finite() || p < 0.0 {
        return Err(DomainError::validation("pricePerBag must be a non-negative number"));
    }
    Ok(())
}
