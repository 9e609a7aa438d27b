use serde::{Deserialize, Serialize};

use grainbridge_inventory::InventoryItem;
use grainbridge_sales::Order;

/// Reported mill efficiency. There is no instrumentation behind it yet.
pub const MILLING_EFFICIENCY: f64 = 98.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryShare {
    pub name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_sales: f64,
    pub active_orders: u64,
    pub total_inventory: i64,
    pub milling_efficiency: f64,
    pub inventory_distribution: Vec<InventoryShare>,
}

pub fn dashboard_metrics<'a, 'b>(
    orders: impl IntoIterator<Item = &'a Order>,
    items: impl IntoIterator<Item = &'b InventoryItem>,
) -> DashboardMetrics {
    let mut total_sales = 0.0;
    let mut active_orders = 0;
    for order in orders {
        if order.status.is_successful() {
            total_sales += order.total_amount;
        } else if order.status.is_active() {
            active_orders += 1;
        }
    }

    let inventory_distribution: Vec<InventoryShare> = items
        .into_iter()
        .map(|i| InventoryShare {
            name: i.name.clone(),
            quantity: i.quantity,
        })
        .collect();
    let total_inventory = inventory_distribution.iter().map(|s| s.quantity).sum();

    DashboardMetrics {
        total_sales,
        active_orders,
        total_inventory,
        milling_efficiency: MILLING_EFFICIENCY,
        inventory_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use grainbridge_core::{ItemId, UserId};
    use grainbridge_sales::OrderStatus;
    use proptest::prelude::*;

    fn order(total: f64, status: OrderStatus) -> Order {
        let mut o = Order::place(UserId::new(), vec![], total, "Lahore".to_string(), Utc::now());
        o.status = status;
        o
    }

    fn item(name: &str, quantity: i64) -> InventoryItem {
        let now = Utc::now();
        InventoryItem {
            id: ItemId::new(),
            name: name.to_string(),
            category: "Basmati".to_string(),
            quantity,
            price_per_bag: 1.0,
            supplier: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn sums_by_status_group() {
        let orders = vec![
            order(100.0, OrderStatus::Delivered),
            order(50.0, OrderStatus::Shipped),
            order(7.0, OrderStatus::Pending),
            order(8.0, OrderStatus::Processing),
            order(900.0, OrderStatus::Cancelled),
        ];
        let items = vec![item("Super Basmati", 120), item("Sella", 30)];
        let m = dashboard_metrics(&orders, &items);

        assert_eq!(m.total_sales, 150.0);
        assert_eq!(m.active_orders, 2);
        assert_eq!(m.total_inventory, 150);
        assert_eq!(m.milling_efficiency, 98.5);
        assert_eq!(m.inventory_distribution[1], InventoryShare { name: "Sella".to_string(), quantity: 30 });
    }

    #[test]
    fn empty_inputs_give_zeroes() {
        let m = dashboard_metrics(&Vec::<Order>::new(), &Vec::<InventoryItem>::new());
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["totalSales"], 0.0);
        assert_eq!(json["activeOrders"], 0);
        assert_eq!(json["inventoryDistribution"], serde_json::json!([]));
    }

    proptest! {
        /// Property: total inventory equals the sum of the distribution.
        #[test]
        fn total_matches_distribution(qs in prop::collection::vec(0i64..1_000_000, 0..20)) {
            let items: Vec<InventoryItem> = qs.iter().map(|q| item("x", *q)).collect();
            let m = dashboard_metrics(&Vec::<Order>::new(), &items);
            prop_assert_eq!(m.total_inventory, qs.iter().sum::<i64>());
            prop_assert_eq!(m.inventory_distribution.len(), qs.len());
        }
    }
}
