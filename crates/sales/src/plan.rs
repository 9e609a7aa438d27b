//! Stock-check planning for order placement.
//!
//! A plan is computed against a consistent view of stock and then applied by
//! the store in the same critical section. Computing the plan never mutates.

use grainbridge_core::{DomainError, ItemId};
use grainbridge_inventory::InventoryItem;

use crate::{OrderLine, RequestedLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDeduction {
    pub item_id: ItemId,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderPlan {
    pub deductions: Vec<StockDeduction>,
    pub lines: Vec<OrderLine>,
    pub total: f64,
}

/// Check every line against `stock` and price it.
///
/// The first missing item or short line aborts the whole plan.
pub fn plan_stock_deductions<'a, F>(lines: &[RequestedLine], mut stock: F) -> Result<OrderPlan, DomainError>
where
    F: FnMut(&ItemId) -> Option<&'a InventoryItem>,
{
    let mut plan = OrderPlan {
        deductions: Vec::with_capacity(lines.len()),
        lines: Vec::with_capacity(lines.len()),
        total: 0.0,
    };

    for line in lines {
        let item = stock(&line.product)
            .ok_or_else(|| DomainError::validation(format!("Item not found: {}", line.product)))?;
        if item.quantity < line.quantity {
            return Err(DomainError::validation(format!(
                "Insufficient stock for {}: requested {}, available {}",
                item.name, line.quantity, item.quantity
            )));
        }

        plan.deductions.push(StockDeduction {
            item_id: item.id,
            quantity: line.quantity,
        });
        plan.lines.push(OrderLine {
            product: item.id,
            quantity: line.quantity,
            price_at_order: item.price_per_bag,
        });
        plan.total += item.price_per_bag * line.quantity as f64;
    }

    Ok(plan)
}
