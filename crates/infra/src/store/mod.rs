//! Persistence boundary.
//!
//! One trait per record family, combined into [`Store`]. Multi-record
//! mutations that must not interleave (order placement, shipment decisions)
//! are single trait methods so each backend can make them atomic.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use grainbridge_auth::User;
use grainbridge_core::{DomainError, ItemId, OrderId, ShipmentId, UserId};
use grainbridge_inventory::{InventoryItem, ItemUpdate};
use grainbridge_purchasing::{Shipment, ShipmentStatus};
use grainbridge_sales::{Order, OrderStatus, PlaceOrder};

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A business rule refused the operation; nothing was written.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),
}

/// Result of an admin decision on a shipment.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentOutcome {
    pub shipment: Shipment,
    /// The inventory item that received the credit, if any matched.
    pub credited: Option<InventoryItem>,
}

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict("User already exists")` on a duplicate email.
    async fn insert_user(&self, user: User) -> Result<User, StoreError>;
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Replace a stored user. Fails with `Conflict` if the email belongs to
    /// another account.
    async fn update_user(&self, user: User) -> Result<User, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn first_admin(&self) -> Result<Option<User>, StoreError>;
}

#[async_trait::async_trait]
pub trait InventoryStore: Send + Sync {
    async fn insert_item(&self, item: InventoryItem) -> Result<InventoryItem, StoreError>;
    async fn get_item(&self, id: ItemId) -> Result<Option<InventoryItem>, StoreError>;
    /// All items in creation order.
    async fn list_items(&self) -> Result<Vec<InventoryItem>, StoreError>;
    async fn update_item(&self, id: ItemId, update: ItemUpdate, now: DateTime<Utc>) -> Result<InventoryItem, StoreError>;
    async fn restock_item(&self, id: ItemId, amount: i64, now: DateTime<Utc>) -> Result<InventoryItem, StoreError>;
    async fn clear_inventory(&self) -> Result<u64, StoreError>;
}

#[async_trait::async_trait]
pub trait OrderStore: Send + Sync {
    /// Check stock, deduct every line and insert the order as one atomic
    /// step. On error nothing has changed.
    ///
    /// `request` must already have passed `validate_place_order`.
    async fn place_order(&self, customer: UserId, request: PlaceOrder, now: DateTime<Utc>) -> Result<Order, StoreError>;
    /// Insert a fully-formed order without touching stock (demo data).
    async fn insert_order(&self, order: Order) -> Result<Order, StoreError>;
    /// Oldest first; `customer = None` lists everyone's orders.
    async fn list_orders(&self, customer: Option<UserId>) -> Result<Vec<Order>, StoreError>;
    async fn set_order_status(&self, id: OrderId, status: OrderStatus, now: DateTime<Utc>) -> Result<Order, StoreError>;
    async fn clear_orders(&self) -> Result<u64, StoreError>;
}

#[async_trait::async_trait]
pub trait ShipmentStore: Send + Sync {
    async fn insert_shipment(&self, shipment: Shipment) -> Result<Shipment, StoreError>;
    /// Newest first; `supplier = None` lists every supplier's shipments.
    async fn list_shipments(&self, supplier: Option<UserId>) -> Result<Vec<Shipment>, StoreError>;
    /// Apply a decision and, on approval, credit the first inventory item
    /// whose category matches the crop, atomically.
    async fn decide_shipment(
        &self,
        id: ShipmentId,
        requested: ShipmentStatus,
        now: DateTime<Utc>,
    ) -> Result<ShipmentOutcome, StoreError>;
}

/// Everything the HTTP layer needs from persistence.
pub trait Store: UserStore + InventoryStore + OrderStore + ShipmentStore {}

impl<T> Store for T where T: UserStore + InventoryStore + OrderStore + ShipmentStore + ?Sized {}

pub type SharedStore = Arc<dyn Store>;
