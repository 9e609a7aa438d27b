use serde::Serialize;

use grainbridge_core::ItemId;

use crate::InventoryItem;

/// Items with fewer bags than this are reported as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockAlert {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub quantity: i64,
}

/// Items strictly below `threshold`, in input order.
pub fn low_stock_alerts<'a>(
    items: impl IntoIterator<Item = &'a InventoryItem>,
    threshold: i64,
) -> Vec<StockAlert> {
    items
        .into_iter()
        .filter(|i| i.quantity < threshold)
        .map(|i| StockAlert {
            id: i.id,
            name: i.name.clone(),
            category: i.category.clone(),
            quantity: i.quantity,
        })
        .collect()
}
