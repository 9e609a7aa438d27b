use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use grainbridge_auth::{NewUser, User, UserProfile, UserSummary};
use grainbridge_core::{ItemId, OrderId, ShipmentId, UserId};
use grainbridge_inventory::{InventoryItem, StockAlert};
use grainbridge_purchasing::{CropType, Shipment, ShipmentStatus};
use grainbridge_sales::{Order, OrderStatus};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(flatten)]
    pub user: NewUser,
    #[serde(default)]
    pub admin_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub amount: f64,
}

// -------------------------
// Response DTOs
// -------------------------

/// Profile plus a fresh session token.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub count: usize,
    pub alerts: Vec<StockAlert>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub client_secret: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineView {
    pub product: ItemId,
    /// `None` once the item has been removed from inventory.
    pub product_name: Option<String>,
    pub quantity: i64,
    pub price_at_order: f64,
}

/// An order with its customer and product names resolved.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub customer: UserRef,
    pub items: Vec<OrderLineView>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A shipment with its supplier resolved.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentView {
    pub id: ShipmentId,
    pub supplier: UserRef,
    pub crop_type: CropType,
    pub quantity: i64,
    pub expected_date: DateTime<Utc>,
    pub status: ShipmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user reference: the summary when the account still exists, otherwise
/// just the id.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UserRef {
    Known(UserSummary),
    Unknown { id: UserId },
}

// -------------------------
// Mapping helpers
// -------------------------

pub fn user_ref(users: &HashMap<UserId, UserSummary>, id: UserId) -> UserRef {
    match users.get(&id) {
        Some(s) => UserRef::Known(s.clone()),
        None => UserRef::Unknown { id },
    }
}

pub fn summaries(users: &[User]) -> HashMap<UserId, UserSummary> {
    users.iter().map(|u| (u.id, u.summary())).collect()
}

pub fn order_view(
    order: Order,
    users: &HashMap<UserId, UserSummary>,
    items: &HashMap<ItemId, String>,
) -> OrderView {
    OrderView {
        id: order.id,
        customer: user_ref(users, order.customer),
        items: order
            .items
            .into_iter()
            .map(|l| OrderLineView {
                product: l.product,
                product_name: items.get(&l.product).cloned(),
                quantity: l.quantity,
                price_at_order: l.price_at_order,
            })
            .collect(),
        total_amount: order.total_amount,
        status: order.status,
        shipping_address: order.shipping_address,
        created_at: order.created_at,
        updated_at: order.updated_at,
    }
}

pub fn shipment_view(shipment: Shipment, users: &HashMap<UserId, UserSummary>) -> ShipmentView {
    ShipmentView {
        id: shipment.id,
        supplier: user_ref(users, shipment.supplier),
        crop_type: shipment.crop_type,
        quantity: shipment.quantity,
        expected_date: shipment.expected_date,
        status: shipment.status,
        notes: shipment.notes,
        created_at: shipment.created_at,
        updated_at: shipment.updated_at,
    }
}

pub fn item_names(items: &[InventoryItem]) -> HashMap<ItemId, String> {
    items.iter().map(|i| (i.id, i.name.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_reads_admin_key_alongside_user_fields() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "name": "Owner",
            "email": "owner@mill.pk",
            "password": "pw",
            "role": "Admin",
            "adminKey": "s3cret"
        }))
        .unwrap();
        assert_eq!(req.admin_key.as_deref(), Some("s3cret"));
        assert_eq!(req.user.email, "owner@mill.pk");
    }

    #[test]
    fn missing_user_serializes_as_bare_id() {
        let id = UserId::new();
        let v = serde_json::to_value(user_ref(&HashMap::new(), id)).unwrap();
        assert_eq!(v, serde_json::json!({ "id": id.to_string() }));
    }
}
