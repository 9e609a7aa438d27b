//! Sales domain module.
//!
//! Customer orders: line validation, stock-check planning and status
//! changes. Pure deterministic logic; the store applies a plan atomically.

pub mod order;
pub mod plan;

pub use order::{validate_place_order, Order, OrderLine, OrderStatus, ParseStatusError, PlaceOrder, RequestedLine};
pub use plan::{plan_stock_deductions, OrderPlan, StockDeduction};
