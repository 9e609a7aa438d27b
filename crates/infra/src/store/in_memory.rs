//! In-memory store for dev and tests.
//!
//! All tables sit behind one `tokio::sync::RwLock`, so every method that
//! takes the write guard is atomic across tables.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{instrument, warn};

use grainbridge_auth::{Role, User};
use grainbridge_core::{Entity, ItemId, OrderId, ShipmentId, UserId};
use grainbridge_inventory::{find_matching_item, InventoryItem, ItemUpdate};
use grainbridge_purchasing::{Shipment, ShipmentStatus};
use grainbridge_sales::{plan_stock_deductions, Order, OrderStatus, PlaceOrder};

use super::{InventoryStore, OrderStore, ShipmentOutcome, ShipmentStore, StoreError, UserStore};

/// Insertion-ordered table keyed by the record's entity id.
#[derive(Debug)]
struct Table<T> {
    rows: Vec<T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T: Entity> Table<T> {
    fn get(&self, id: &T::Id) -> Option<&T> {
        self.rows.iter().find(|r| r.id() == id)
    }

    fn get_mut(&mut self, id: &T::Id) -> Option<&mut T> {
        self.rows.iter_mut().find(|r| r.id() == id)
    }

    fn insert(&mut self, row: T) {
        self.rows.push(row);
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.iter()
    }

    fn clear(&mut self) -> u64 {
        let n = self.rows.len() as u64;
        self.rows.clear();
        n
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: Table<User>,
    items: Table<InventoryItem>,
    orders: Table<Order>,
    shipments: Table<Shipment>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let mut t = self.inner.write().await;
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("User already exists".to_string()));
        }
        t.users.insert(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let t = self.inner.read().await;
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, user: User) -> Result<User, StoreError> {
        let mut t = self.inner.write().await;
        if t.users.iter().any(|u| u.email == user.email && u.id != user.id) {
            return Err(StoreError::Conflict("Email is already in use".to_string()));
        }
        let slot = t.users.get_mut(&user.id).ok_or(StoreError::NotFound("User"))?;
        *slot = user.clone();
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.inner.read().await.users.iter().cloned().collect())
    }

    async fn first_admin(&self) -> Result<Option<User>, StoreError> {
        let t = self.inner.read().await;
        Ok(t.users.iter().find(|u| u.role == Role::Admin).cloned())
    }
}

#[async_trait::async_trait]
impl InventoryStore for InMemoryStore {
    async fn insert_item(&self, item: InventoryItem) -> Result<InventoryItem, StoreError> {
        self.inner.write().await.items.insert(item.clone());
        Ok(item)
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<InventoryItem>, StoreError> {
        Ok(self.inner.read().await.items.get(&id).cloned())
    }

    async fn list_items(&self) -> Result<Vec<InventoryItem>, StoreError> {
        Ok(self.inner.read().await.items.iter().cloned().collect())
    }

    async fn update_item(&self, id: ItemId, update: ItemUpdate, now: DateTime<Utc>) -> Result<InventoryItem, StoreError> {
        let mut t = self.inner.write().await;
        let item = t.items.get_mut(&id).ok_or(StoreError::NotFound("Inventory item"))?;
        item.apply_update(update, now)?;
        Ok(item.clone())
    }

    #[instrument(skip(self), err)]
    async fn restock_item(&self, id: ItemId, amount: i64, now: DateTime<Utc>) -> Result<InventoryItem, StoreError> {
        let mut t = self.inner.write().await;
        let item = t.items.get_mut(&id).ok_or(StoreError::NotFound("Inventory item"))?;
        item.restock(amount, now)?;
        Ok(item.clone())
    }

    async fn clear_inventory(&self) -> Result<u64, StoreError> {
        Ok(self.inner.write().await.items.clear())
    }
}

#[async_trait::async_trait]
impl OrderStore for InMemoryStore {
    #[instrument(skip(self, request), fields(lines = request.items.len()), err)]
    async fn place_order(&self, customer: UserId, request: PlaceOrder, now: DateTime<Utc>) -> Result<Order, StoreError> {
        let mut guard = self.inner.write().await;
        let t = &mut *guard;

        let plan = plan_stock_deductions(&request.items, |id| t.items.get(id))?;
        for d in &plan.deductions {
            let item = t.items.get_mut(&d.item_id).ok_or(StoreError::NotFound("Inventory item"))?;
            item.deduct(d.quantity, now)?;
        }

        let order = Order::place(customer, plan.lines, plan.total, request.shipping_address, now);
        t.orders.insert(order.clone());
        Ok(order)
    }

    async fn insert_order(&self, order: Order) -> Result<Order, StoreError> {
        self.inner.write().await.orders.insert(order.clone());
        Ok(order)
    }

    async fn list_orders(&self, customer: Option<UserId>) -> Result<Vec<Order>, StoreError> {
        let t = self.inner.read().await;
        let mut orders: Vec<Order> = t
            .orders
            .iter()
            .filter(|o| customer.is_none_or(|c| o.customer == c))
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn set_order_status(&self, id: OrderId, status: OrderStatus, now: DateTime<Utc>) -> Result<Order, StoreError> {
        let mut t = self.inner.write().await;
        let order = t.orders.get_mut(&id).ok_or(StoreError::NotFound("Order"))?;
        order.set_status(status, now);
        Ok(order.clone())
    }

    async fn clear_orders(&self) -> Result<u64, StoreError> {
        Ok(self.inner.write().await.orders.clear())
    }
}

#[async_trait::async_trait]
impl ShipmentStore for InMemoryStore {
    async fn insert_shipment(&self, shipment: Shipment) -> Result<Shipment, StoreError> {
        self.inner.write().await.shipments.insert(shipment.clone());
        Ok(shipment)
    }

    async fn list_shipments(&self, supplier: Option<UserId>) -> Result<Vec<Shipment>, StoreError> {
        let t = self.inner.read().await;
        let mut shipments: Vec<Shipment> = t
            .shipments
            .iter()
            .filter(|s| supplier.is_none_or(|id| s.supplier == id))
            .cloned()
            .collect();
        shipments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(shipments)
    }

    #[instrument(skip(self), err)]
    async fn decide_shipment(
        &self,
        id: ShipmentId,
        requested: ShipmentStatus,
        now: DateTime<Utc>,
    ) -> Result<ShipmentOutcome, StoreError> {
        let mut guard = self.inner.write().await;
        let t = &mut *guard;

        let (decision, crop) = {
            let shipment = t.shipments.get(&id).ok_or(StoreError::NotFound("Shipment"))?;
            (shipment.decide(requested)?, shipment.crop_type)
        };

        // Credit first: a failed restock leaves the shipment undecided.
        let mut credited = None;
        if let Some(amount) = decision.credit {
            let target = find_matching_item(t.items.iter(), crop.label()).map(|i| i.id);
            match target.and_then(|item_id| t.items.get_mut(&item_id)) {
                Some(item) => {
                    item.restock(amount, now)?;
                    credited = Some(item.clone());
                }
                None => warn!(
                    shipment_id = %id,
                    crop = crop.label(),
                    "no matching inventory category found, stock not added"
                ),
            }
        }

        let shipment = t.shipments.get_mut(&id).ok_or(StoreError::NotFound("Shipment"))?;
        shipment.apply(&decision, now);

        Ok(ShipmentOutcome {
            shipment: shipment.clone(),
            credited,
        })
    }
}
