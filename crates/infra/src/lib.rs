//! Infrastructure layer: configuration, persistence, external services.

pub mod config;
pub mod payments;
pub mod seed;
pub mod store;

pub use config::{AppConfig, AppConfigError};
pub use payments::{PaymentError, PaymentGateway, StripeGateway};
pub use store::{
    InMemoryStore, InventoryStore, OrderStore, PostgresStore, SharedStore, ShipmentOutcome, ShipmentStore, Store,
    StoreError, UserStore,
};
