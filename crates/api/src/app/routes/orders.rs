use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use tracing::{info, warn};

use grainbridge_auth::{Principal, User};
use grainbridge_core::OrderId;
use grainbridge_sales::{validate_place_order, Order, OrderStatus, PlaceOrder};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::extract::ApiJson;
use crate::app::services::AppServices;
use crate::authz;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_orders).post(place_order))
        .route("/:id/status", put(update_status))
}

/// Totals the client computed may drift from current prices; the stored
/// total is always recomputed.
const TOTAL_TOLERANCE: f64 = 0.01;

pub async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiJson(body): ApiJson<PlaceOrder>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    authz::require(&principal, authz::CUSTOMER)?;

    let request = validate_place_order(body)?;
    let claimed = request.total_amount;
    let order = services
        .store
        .place_order(principal.user_id, request, Utc::now())
        .await?;

    if let Some(claimed) = claimed {
        if (claimed - order.total_amount).abs() > TOTAL_TOLERANCE {
            warn!(order = %order.id, claimed, computed = order.total_amount, "client total does not match computed total");
        }
    }
    info!(order = %order.id, customer = %order.customer, total = order.total_amount, "order placed");

    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<dto::OrderView>>, ApiError> {
    let scope = (!principal.is_admin()).then_some(principal.user_id);
    let orders = services.store.list_orders(scope).await?;

    let users = dto::summaries(&scoped_users(&services, &principal).await?);
    let items = dto::item_names(&services.store.list_items().await?);

    Ok(Json(
        orders
            .into_iter()
            .map(|o| dto::order_view(o, &users, &items))
            .collect(),
    ))
}

/// Admins see every customer; everyone else only needs themselves.
pub(crate) async fn scoped_users(services: &AppServices, principal: &Principal) -> Result<Vec<User>, ApiError> {
    if principal.is_admin() {
        return Ok(services.store.list_users().await?);
    }
    Ok(services.store.get_user(principal.user_id).await?.into_iter().collect())
}

pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<dto::StatusRequest>,
) -> Result<Json<Order>, ApiError> {
    authz::require(&principal, authz::ADMIN)?;
    let id: OrderId = id.parse()?;
    let status = OrderStatus::parse_loose(&body.status).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let order = services.store.set_order_status(id, status, Utc::now()).await?;
    info!(order = %order.id, status = %order.status, "order status updated");

    Ok(Json(order))
}
