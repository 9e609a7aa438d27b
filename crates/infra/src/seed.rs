//! Demo data: a rice catalog plus six months of order history, so the
//! dashboard charts have something to show.
//!
//! Users are never touched; orders are attributed to the first Admin.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use grainbridge_core::UserId;
use grainbridge_inventory::{InventoryItem, NewItem};
use grainbridge_sales::{Order, OrderLine, OrderStatus};

use crate::store::{Store, StoreError};

pub const DEMO_ORDER_COUNT: usize = 50;
const DEMO_MONTHS: i32 = 6;
const DEMO_PRICE_PER_BAG: f64 = 5000.0;
const DEMO_ADDRESS: &str = "123 Seeded Data St, Lahore";

/// (name, category, bags, price per bag, supplier)
const CATALOG: &[(&str, &str, i64, f64, &str)] = &[
    ("Super Basmati", "Basmati", 15_000, 5000.0, "Supplier Alpha"),
    ("Kainat 1121", "Basmati", 8_000, 4800.0, "Global Grains"),
    ("Irri-6", "Non-Basmati", 25_000, 3200.0, "Local Farmers"),
    ("Brown Rice", "Organic", 3_500, 6000.0, "Organic Farms Ltd"),
    ("Broken Rice", "Feed", 12_000, 2500.0, "Mill Output"),
    ("Jasmine Rice", "Basmati", 5_000, 5500.0, "Import Co."),
    ("Parboiled Sella", "Sella", 10_000, 4200.0, "Golden Grains"),
    ("Red Rice", "Healthy", 2_000, 7000.0, "Nature Best"),
    ("Supreme Kernel", "Basmati", 6_000, 5100.0, "Supplier Alpha"),
    ("Rice Bran", "Feed", 20_000, 1500.0, "Mill Output"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub items: usize,
    pub orders: usize,
}

/// The demo catalog, stamped with `now`.
pub fn demo_catalog(now: DateTime<Utc>) -> Vec<InventoryItem> {
    CATALOG
        .iter()
        .map(|(name, category, quantity, price, supplier)| {
            InventoryItem::create(
                NewItem {
                    name: name.to_string(),
                    category: category.to_string(),
                    quantity: *quantity,
                    price_per_bag: *price,
                    supplier: Some(supplier.to_string()),
                },
                now,
            )
        })
        .collect()
}

/// Random order history over the last six calendar months, weighted toward
/// delivered orders. Every order buys `product` at a fixed bag price.
pub fn demo_orders<R: Rng>(
    customer: UserId,
    product: &InventoryItem,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Order> {
    const MIXED: [OrderStatus; 5] = [
        OrderStatus::Delivered,
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    (0..DEMO_ORDER_COUNT)
        .map(|_| {
            let created = day_in_month(now, rng.gen_range(0..DEMO_MONTHS), rng.gen_range(1..=28));
            let amount = f64::from(rng.gen_range(50_000u32..500_000));
            let status = if rng.gen_bool(0.7) {
                OrderStatus::Delivered
            } else {
                *MIXED.choose(rng).unwrap_or(&OrderStatus::Pending)
            };

            let mut order = Order::place(
                customer,
                vec![OrderLine {
                    product: product.id,
                    quantity: (amount / DEMO_PRICE_PER_BAG).floor() as i64,
                    price_at_order: DEMO_PRICE_PER_BAG,
                }],
                amount,
                DEMO_ADDRESS.to_string(),
                created,
            );
            order.status = status;
            order
        })
        .collect()
}

/// Noon on `day` of the month `months_back` before `now`'s month, capped at `now`.
fn day_in_month(now: DateTime<Utc>, months_back: i32, day: u32) -> DateTime<Utc> {
    let index = now.year() * 12 + now.month0() as i32 - months_back;
    let (year, month) = (index.div_euclid(12), index.rem_euclid(12) as u32 + 1);
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .map(|dt| dt.and_utc().min(now))
        .unwrap_or(now)
}

/// Replace inventory and orders with demo data.
pub async fn import_demo_data(store: &dyn Store, now: DateTime<Utc>) -> Result<SeedReport, StoreError> {
    let cleared_orders = store.clear_orders().await?;
    let cleared_items = store.clear_inventory().await?;
    info!(cleared_orders, cleared_items, "cleared old demo data");

    let catalog = demo_catalog(now);
    for item in &catalog {
        store.insert_item(item.clone()).await?;
    }

    let customer = match store.first_admin().await? {
        Some(admin) => admin.id,
        None => {
            warn!("no Admin user found; demo orders use a placeholder customer id");
            UserId::new()
        }
    };

    // The thread-local RNG is not Send; build the orders before awaiting.
    let orders = {
        let mut rng = rand::thread_rng();
        match catalog.first() {
            Some(product) => demo_orders(customer, product, now, &mut rng),
            None => Vec::new(),
        }
    };
    for order in &orders {
        store.insert_order(order.clone()).await?;
    }

    info!(items = catalog.len(), orders = orders.len(), "demo data imported");
    Ok(SeedReport {
        items: catalog.len(),
        orders: orders.len(),
    })
}

/// Remove all inventory and orders. Users stay.
pub async fn destroy_demo_data(store: &dyn Store) -> Result<SeedReport, StoreError> {
    let orders = store.clear_orders().await?;
    let items = store.clear_inventory().await?;
    info!(orders, items, "demo data destroyed");
    Ok(SeedReport {
        items: items as usize,
        orders: orders as usize,
    })
}
