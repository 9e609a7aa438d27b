//! Postgres-backed store.
//!
//! ## Atomicity
//!
//! Order placement and shipment decisions each run in one transaction. Rows
//! they read are locked with `SELECT ... FOR UPDATE` (inventory rows in id
//! order, so concurrent orders cannot deadlock), and stock is decremented with
//! a conditional `UPDATE ... WHERE quantity >= $n`.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Database` |
//! | PoolClosed / Other | N/A | `Database` |

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{instrument, warn};
use uuid::Uuid;

use grainbridge_auth::{Role, User};
use grainbridge_core::{DomainError, ItemId, OrderId, ShipmentId, UserId};
use grainbridge_inventory::{InventoryItem, ItemUpdate};
use grainbridge_purchasing::{CropType, Shipment, ShipmentStatus};
use grainbridge_sales::{plan_stock_deductions, Order, OrderLine, OrderStatus, PlaceOrder};

use super::{InventoryStore, OrderStore, ShipmentOutcome, ShipmentStore, StoreError, UserStore};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL,
        name TEXT NOT NULL,
        company_name TEXT,
        phone TEXT,
        address TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory_items (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        quantity BIGINT NOT NULL CHECK (quantity >= 0),
        price_per_bag DOUBLE PRECISION NOT NULL DEFAULT 0,
        supplier TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id UUID PRIMARY KEY,
        customer_id UUID NOT NULL,
        items JSONB NOT NULL,
        total_amount DOUBLE PRECISION NOT NULL,
        status TEXT NOT NULL,
        shipping_address TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS orders_customer_idx ON orders (customer_id, created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS shipments (
        id UUID PRIMARY KEY,
        supplier_id UUID NOT NULL,
        crop_type TEXT NOT NULL,
        quantity BIGINT NOT NULL CHECK (quantity > 0),
        expected_date TIMESTAMPTZ NOT NULL,
        status TEXT NOT NULL,
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS shipments_supplier_idx ON shipments (supplier_id, created_at)",
];

const USER_COLUMNS: &str =
    "id, email, password_hash, role, name, company_name, phone, address, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, name, category, quantity, price_per_bag, supplier, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, customer_id, items, total_amount, status, shipping_address, created_at, updated_at";
const SHIPMENT_COLUMNS: &str =
    "id, supplier_id, crop_type, quantity, expected_date, status, notes, created_at, updated_at";

/// Postgres store. Cheap to clone; all clones share one pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Connect and create the schema if it does not exist yet.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Idempotent; safe to run on every startup.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for stmt in SCHEMA {
            sqlx::query(stmt)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        self.pool.begin().await.map_err(|e| map_sqlx_error("begin_transaction", e))
    }
}

async fn rollback_with<T>(tx: Transaction<'_, Postgres>, err: StoreError) -> Result<T, StoreError> {
    tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
    Err(err)
}

async fn commit(tx: Transaction<'_, Postgres>) -> Result<(), StoreError> {
    tx.commit().await.map_err(|e| map_sqlx_error("commit_transaction", e))
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl UserStore for PostgresStore {
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        ))
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.name)
        .bind(&user.company_name)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| match map_sqlx_error("insert_user", e) {
            StoreError::Conflict(_) => StoreError::Conflict("User already exists".to_string()),
            other => other,
        })?;
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn update_user(&self, user: User) -> Result<User, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                email = $2,
                password_hash = $3,
                name = $4,
                company_name = $5,
                phone = $6,
                address = $7,
                updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.company_name)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| match map_sqlx_error("update_user", e) {
            StoreError::Conflict(_) => StoreError::Conflict("Email is already in use".to_string()),
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("User"));
        }
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;
        rows.iter().map(user_from_row).collect()
    }

    async fn first_admin(&self) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY created_at ASC LIMIT 1"
        ))
        .bind(Role::Admin.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("first_admin", e))?;
        row.as_ref().map(user_from_row).transpose()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inventory
// ─────────────────────────────────────────────────────────────────────────────

impl PostgresStore {
    async fn lock_item(
        tx: &mut Transaction<'static, Postgres>,
        id: ItemId,
        operation: &str,
    ) -> Result<Option<InventoryItem>, StoreError> {
        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = $1 FOR UPDATE"))
            .bind(id.as_uuid())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        row.as_ref().map(item_from_row).transpose()
    }

    async fn write_item(
        tx: &mut Transaction<'static, Postgres>,
        item: &InventoryItem,
        operation: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE inventory_items SET
                name = $2,
                category = $3,
                quantity = $4,
                price_per_bag = $5,
                supplier = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(&item.name)
        .bind(&item.category)
        .bind(item.quantity)
        .bind(item.price_per_bag)
        .bind(&item.supplier)
        .bind(item.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error(operation, e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl InventoryStore for PostgresStore {
    #[instrument(skip(self, item), fields(item_id = %item.id), err)]
    async fn insert_item(&self, item: InventoryItem) -> Result<InventoryItem, StoreError> {
        sqlx::query(&format!("INSERT INTO inventory_items ({ITEM_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"))
            .bind(item.id.as_uuid())
            .bind(&item.name)
            .bind(&item.category)
            .bind(item.quantity)
            .bind(item.price_per_bag)
            .bind(&item.supplier)
            .bind(item.created_at)
            .bind(item.updated_at)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_item", e))?;
        Ok(item)
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<InventoryItem>, StoreError> {
        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_item", e))?;
        row.as_ref().map(item_from_row).transpose()
    }

    async fn list_items(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM inventory_items ORDER BY created_at ASC, id ASC"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_items", e))?;
        rows.iter().map(item_from_row).collect()
    }

    #[instrument(skip(self, update), err)]
    async fn update_item(&self, id: ItemId, update: ItemUpdate, now: DateTime<Utc>) -> Result<InventoryItem, StoreError> {
        let mut tx = self.begin().await?;
        let Some(mut item) = Self::lock_item(&mut tx, id, "update_item").await? else {
            return rollback_with(tx, StoreError::NotFound("Inventory item")).await;
        };
        if let Err(e) = item.apply_update(update, now) {
            return rollback_with(tx, e.into()).await;
        }
        Self::write_item(&mut tx, &item, "update_item").await?;
        commit(tx).await?;
        Ok(item)
    }

    #[instrument(skip(self), err)]
    async fn restock_item(&self, id: ItemId, amount: i64, now: DateTime<Utc>) -> Result<InventoryItem, StoreError> {
        let mut tx = self.begin().await?;
        let Some(mut item) = Self::lock_item(&mut tx, id, "restock_item").await? else {
            return rollback_with(tx, StoreError::NotFound("Inventory item")).await;
        };
        if let Err(e) = item.restock(amount, now) {
            return rollback_with(tx, e.into()).await;
        }
        Self::write_item(&mut tx, &item, "restock_item").await?;
        commit(tx).await?;
        Ok(item)
    }

    async fn clear_inventory(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM inventory_items")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("clear_inventory", e))?;
        Ok(result.rows_affected())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Orders
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl OrderStore for PostgresStore {
    #[instrument(skip(self, request), fields(lines = request.items.len()), err)]
    async fn place_order(&self, customer: UserId, request: PlaceOrder, now: DateTime<Utc>) -> Result<Order, StoreError> {
        let mut ids: Vec<Uuid> = request.items.iter().map(|l| *l.product.as_uuid()).collect();
        ids.sort();
        ids.dedup();

        let mut tx = self.begin().await?;

        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = ANY($1) ORDER BY id FOR UPDATE"
        ))
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("lock_order_items", e))?;
        let stock: HashMap<ItemId, InventoryItem> = rows
            .iter()
            .map(|r| item_from_row(r).map(|i| (i.id, i)))
            .collect::<Result<_, _>>()?;

        let plan = match plan_stock_deductions(&request.items, |id| stock.get(id)) {
            Ok(plan) => plan,
            Err(e) => return rollback_with(tx, e.into()).await,
        };

        for d in &plan.deductions {
            let result = sqlx::query(
                "UPDATE inventory_items SET quantity = quantity - $2, updated_at = $3 WHERE id = $1 AND quantity >= $2",
            )
            .bind(d.item_id.as_uuid())
            .bind(d.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("deduct_stock", e))?;

            if result.rows_affected() != 1 {
                return rollback_with(
                    tx,
                    DomainError::validation(format!("Insufficient stock for item {}", d.item_id)).into(),
                )
                .await;
            }
        }

        let order = Order::place(customer, plan.lines, plan.total, request.shipping_address, now);
        insert_order_row(&mut tx, &order).await?;
        commit(tx).await?;

        Ok(order)
    }

    async fn insert_order(&self, order: Order) -> Result<Order, StoreError> {
        let mut tx = self.begin().await?;
        insert_order_row(&mut tx, &order).await?;
        commit(tx).await?;
        Ok(order)
    }

    async fn list_orders(&self, customer: Option<UserId>) -> Result<Vec<Order>, StoreError> {
        let rows = match customer {
            Some(c) => {
                sqlx::query(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = $1 ORDER BY created_at ASC"
                ))
                .bind(c.as_uuid())
                .fetch_all(&*self.pool)
                .await
            }
            None => {
                sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at ASC"))
                    .fetch_all(&*self.pool)
                    .await
            }
        }
        .map_err(|e| map_sqlx_error("list_orders", e))?;
        rows.iter().map(order_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn set_order_status(&self, id: OrderId, status: OrderStatus, now: DateTime<Utc>) -> Result<Order, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(now)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("set_order_status", e))?;
        match row {
            Some(r) => order_from_row(&r),
            None => Err(StoreError::NotFound("Order")),
        }
    }

    async fn clear_orders(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM orders")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("clear_orders", e))?;
        Ok(result.rows_affected())
    }
}

async fn insert_order_row(tx: &mut Transaction<'static, Postgres>, order: &Order) -> Result<(), StoreError> {
    sqlx::query(&format!("INSERT INTO orders ({ORDER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"))
        .bind(order.id.as_uuid())
        .bind(order.customer.as_uuid())
        .bind(Json(&order.items))
        .bind(order.total_amount)
        .bind(order.status.as_str())
        .bind(&order.shipping_address)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Shipments
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl ShipmentStore for PostgresStore {
    #[instrument(skip(self, shipment), fields(shipment_id = %shipment.id), err)]
    async fn insert_shipment(&self, shipment: Shipment) -> Result<Shipment, StoreError> {
        sqlx::query(&format!(
            "INSERT INTO shipments ({SHIPMENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(shipment.id.as_uuid())
        .bind(shipment.supplier.as_uuid())
        .bind(shipment.crop_type.label())
        .bind(shipment.quantity)
        .bind(shipment.expected_date)
        .bind(shipment.status.as_str())
        .bind(&shipment.notes)
        .bind(shipment.created_at)
        .bind(shipment.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_shipment", e))?;
        Ok(shipment)
    }

    async fn list_shipments(&self, supplier: Option<UserId>) -> Result<Vec<Shipment>, StoreError> {
        let rows = match supplier {
            Some(s) => {
                sqlx::query(&format!(
                    "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE supplier_id = $1 ORDER BY created_at DESC"
                ))
                .bind(s.as_uuid())
                .fetch_all(&*self.pool)
                .await
            }
            None => {
                sqlx::query(&format!("SELECT {SHIPMENT_COLUMNS} FROM shipments ORDER BY created_at DESC"))
                    .fetch_all(&*self.pool)
                    .await
            }
        }
        .map_err(|e| map_sqlx_error("list_shipments", e))?;
        rows.iter().map(shipment_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn decide_shipment(
        &self,
        id: ShipmentId,
        requested: ShipmentStatus,
        now: DateTime<Utc>,
    ) -> Result<ShipmentOutcome, StoreError> {
        let mut tx = self.begin().await?;

        let row = sqlx::query(&format!("SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE id = $1 FOR UPDATE"))
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_shipment", e))?;
        let Some(row) = row else {
            return rollback_with(tx, StoreError::NotFound("Shipment")).await;
        };
        let mut shipment = shipment_from_row(&row)?;

        let decision = match shipment.decide(requested) {
            Ok(d) => d,
            Err(e) => return rollback_with(tx, e.into()).await,
        };
        shipment.apply(&decision, now);

        sqlx::query("UPDATE shipments SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(shipment.id.as_uuid())
            .bind(shipment.status.as_str())
            .bind(shipment.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_shipment", e))?;

        let mut credited = None;
        if let Some(amount) = decision.credit {
            // Same rule as `category_matches`: case-insensitive substring.
            let row = sqlx::query(&format!(
                r#"
                SELECT {ITEM_COLUMNS} FROM inventory_items
                WHERE strpos(lower(category), lower($1)) > 0
                ORDER BY created_at ASC, id ASC
                LIMIT 1
                FOR UPDATE
                "#
            ))
            .bind(shipment.crop_type.label())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("match_inventory", e))?;

            match row {
                Some(row) => {
                    let mut item = item_from_row(&row)?;
                    if let Err(e) = item.restock(amount, now) {
                        return rollback_with(tx, e.into()).await;
                    }
                    Self::write_item(&mut tx, &item, "credit_inventory").await?;
                    credited = Some(item);
                }
                None => warn!(
                    shipment_id = %shipment.id,
                    crop = shipment.crop_type.label(),
                    "no matching inventory category found, stock not added"
                ),
            }
        }

        commit(tx).await?;
        Ok(ShipmentOutcome { shipment, credited })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row mapping
// ─────────────────────────────────────────────────────────────────────────────

fn corrupt(what: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::Database(format!("failed to deserialize {what} row: {e}"))
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let role: String = row.try_get("role").map_err(|e| corrupt("user", e))?;
    Ok(User {
        id: UserId::from_uuid(row.try_get("id").map_err(|e| corrupt("user", e))?),
        email: row.try_get("email").map_err(|e| corrupt("user", e))?,
        password_hash: row.try_get("password_hash").map_err(|e| corrupt("user", e))?,
        role: Role::from_str(&role).map_err(|e| corrupt("user", e))?,
        name: row.try_get("name").map_err(|e| corrupt("user", e))?,
        company_name: row.try_get("company_name").map_err(|e| corrupt("user", e))?,
        phone: row.try_get("phone").map_err(|e| corrupt("user", e))?,
        address: row.try_get("address").map_err(|e| corrupt("user", e))?,
        created_at: row.try_get("created_at").map_err(|e| corrupt("user", e))?,
        updated_at: row.try_get("updated_at").map_err(|e| corrupt("user", e))?,
    })
}

fn item_from_row(row: &PgRow) -> Result<InventoryItem, StoreError> {
    Ok(InventoryItem {
        id: ItemId::from_uuid(row.try_get("id").map_err(|e| corrupt("inventory", e))?),
        name: row.try_get("name").map_err(|e| corrupt("inventory", e))?,
        category: row.try_get("category").map_err(|e| corrupt("inventory", e))?,
        quantity: row.try_get("quantity").map_err(|e| corrupt("inventory", e))?,
        price_per_bag: row.try_get("price_per_bag").map_err(|e| corrupt("inventory", e))?,
        supplier: row.try_get("supplier").map_err(|e| corrupt("inventory", e))?,
        created_at: row.try_get("created_at").map_err(|e| corrupt("inventory", e))?,
        updated_at: row.try_get("updated_at").map_err(|e| corrupt("inventory", e))?,
    })
}

fn order_from_row(row: &PgRow) -> Result<Order, StoreError> {
    let status: String = row.try_get("status").map_err(|e| corrupt("order", e))?;
    let Json(items): Json<Vec<OrderLine>> = row.try_get("items").map_err(|e| corrupt("order", e))?;
    Ok(Order {
        id: OrderId::from_uuid(row.try_get("id").map_err(|e| corrupt("order", e))?),
        customer: UserId::from_uuid(row.try_get("customer_id").map_err(|e| corrupt("order", e))?),
        items,
        total_amount: row.try_get("total_amount").map_err(|e| corrupt("order", e))?,
        status: OrderStatus::parse_loose(&status).map_err(|e| corrupt("order", e))?,
        shipping_address: row.try_get("shipping_address").map_err(|e| corrupt("order", e))?,
        created_at: row.try_get("created_at").map_err(|e| corrupt("order", e))?,
        updated_at: row.try_get("updated_at").map_err(|e| corrupt("order", e))?,
    })
}

fn shipment_from_row(row: &PgRow) -> Result<Shipment, StoreError> {
    let crop: String = row.try_get("crop_type").map_err(|e| corrupt("shipment", e))?;
    let status: String = row.try_get("status").map_err(|e| corrupt("shipment", e))?;
    Ok(Shipment {
        id: ShipmentId::from_uuid(row.try_get("id").map_err(|e| corrupt("shipment", e))?),
        supplier: UserId::from_uuid(row.try_get("supplier_id").map_err(|e| corrupt("shipment", e))?),
        crop_type: CropType::parse(&crop).map_err(|e| corrupt("shipment", e))?,
        quantity: row.try_get("quantity").map_err(|e| corrupt("shipment", e))?,
        expected_date: row.try_get("expected_date").map_err(|e| corrupt("shipment", e))?,
        status: ShipmentStatus::parse(&status).map_err(|e| corrupt("shipment", e))?,
        notes: row.try_get("notes").map_err(|e| corrupt("shipment", e))?,
        created_at: row.try_get("created_at").map_err(|e| corrupt("shipment", e))?,
        updated_at: row.try_get("updated_at").map_err(|e| corrupt("shipment", e))?,
    })
}

/// Map SQLx errors to StoreError.
///
/// Unique violations become `Conflict`; everything else is `Database`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Database(format!("connection pool closed in {operation}")),
        other => StoreError::Database(format!("sqlx error in {operation}: {other}")),
    }
}
