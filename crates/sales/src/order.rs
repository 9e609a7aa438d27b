use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use grainbridge_core::{DomainError, Entity, ItemId, OrderId, UserId};

/// Order status lifecycle.
///
/// Admins may move an order to any status; there is no enforced ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid order status: {0}")]
pub struct ParseStatusError(pub String);

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Case-insensitive parse that also accepts legacy spellings found in
    /// older data: `Canceled` and `Success`.
    pub fn parse_loose(s: &str) -> Result<Self, ParseStatusError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" | "success" => Ok(OrderStatus::Delivered),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }

    /// Revenue-bearing statuses for dashboard totals.
    pub fn is_successful(&self) -> bool {
        matches!(self, OrderStatus::Shipped | OrderStatus::Delivered)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_loose(s)
    }
}

/// A priced order line. `price_at_order` is a snapshot of the item's price
/// when the order was placed and is never re-derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product: ItemId,
    pub quantity: i64,
    pub price_at_order: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer: UserId,
    pub items: Vec<OrderLine>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Order {
    /// A new order always starts out Pending.
    pub fn place(
        customer: UserId,
        items: Vec<OrderLine>,
        total_amount: f64,
        shipping_address: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            customer,
            items,
            total_amount,
            status: OrderStatus::Pending,
            shipping_address,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_status(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }
}

/// One requested line, before pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedLine {
    pub product: ItemId,
    pub quantity: i64,
}

/// Input: place an order.
///
/// `total_amount` is accepted for compatibility with existing clients but the
/// stored total is always recomputed from current prices.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    pub items: Vec<RequestedLine>,
    pub shipping_address: String,
    #[serde(default)]
    pub total_amount: Option<f64>,
}

/// Validate and normalize an order request.
///
/// Lines for the same product are merged (quantities summed), keeping the
/// position of the first occurrence.
pub fn validate_place_order(input: PlaceOrder) -> Result<PlaceOrder, DomainError> {
    if input.items.is_empty() {
        return Err(DomainError::validation("order must contain at least one item"));
    }
    let address = input.shipping_address.trim();
    if address.is_empty() {
        return Err(DomainError::validation("shippingAddress cannot be empty"));
    }

    let mut merged: Vec<RequestedLine> = Vec::with_capacity(input.items.len());
    let mut index: BTreeMap<ItemId, usize> = BTreeMap::new();
    for line in input.items {
        if line.quantity < 1 {
            return Err(DomainError::validation(format!(
                "quantity for item {} must be at least 1",
                line.product
            )));
        }
        match index.get(&line.product) {
            Some(&i) => {
                merged[i].quantity = merged[i]
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or_else(|| DomainError::validation("quantity is too large"))?;
            }
            None => {
                index.insert(line.product, merged.len());
                merged.push(line);
            }
        }
    }

    Ok(PlaceOrder {
        items: merged,
        shipping_address: address.to_string(),
        total_amount: input.total_amount,
    })
}
