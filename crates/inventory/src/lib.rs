//! Inventory domain module.
//!
//! Business rules for the mill's stock of rice bags, implemented as pure
//! deterministic logic (no IO, no HTTP, no storage).

pub mod alerts;
pub mod item;
pub mod matching;

pub use alerts::{low_stock_alerts, StockAlert, LOW_STOCK_THRESHOLD};
pub use item::{validate_new_item, InventoryItem, ItemUpdate, NewItem};
pub use matching::{category_matches, find_matching_item};
