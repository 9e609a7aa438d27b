//! `grainbridge-analytics`
//!
//! **Responsibility:** read-only sales and stock figures for the admin
//! dashboard.
//!
//! Everything here is a pure function over order and inventory snapshots:
//! - no storage access, no caching;
//! - recomputed in full on every request;
//! - never mutates domain state.

pub mod insights;
pub mod metrics;

pub use insights::{market_insights, month_windows, MarketInsights};
pub use metrics::{dashboard_metrics, DashboardMetrics, InventoryShare, MILLING_EFFICIENCY};
