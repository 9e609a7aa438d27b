//! Purchasing domain module.
//!
//! Supplier shipments and the one-shot approval decision that credits stock.

pub mod shipment;

pub use shipment::{
    validate_new_shipment, CropType, NewShipment, Shipment, ShipmentDecision, ShipmentStatus,
};
