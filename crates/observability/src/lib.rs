//! Logging setup shared by the HTTP server and the seed tool.

/// Subscriber installation (filters, JSON formatting).
pub mod subscriber;

pub use subscriber::{init, init_with_filter, DEFAULT_FILTER};
