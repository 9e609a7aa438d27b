use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use tracing::info;

use grainbridge_auth::Principal;
use grainbridge_core::ItemId;
use grainbridge_infra::StoreError;
use grainbridge_inventory::{
    low_stock_alerts, validate_new_item, InventoryItem, ItemUpdate, NewItem, LOW_STOCK_THRESHOLD,
};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::extract::ApiJson;
use crate::app::services::AppServices;
use crate::authz;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/alerts", get(stock_alerts))
        .route("/:id", get(get_item).put(update_item))
        .route("/:id/restock", put(restock_item))
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
    Ok(Json(services.store.list_items().await?))
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiJson(body): ApiJson<NewItem>,
) -> Result<(StatusCode, Json<InventoryItem>), ApiError> {
    authz::require(&principal, authz::ADMIN)?;

    let input = validate_new_item(body)?;
    let item = services
        .store
        .insert_item(InventoryItem::create(input, Utc::now()))
        .await?;
    info!(item = %item.id, name = %item.name, "inventory item created");

    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn stock_alerts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<dto::AlertsResponse>, ApiError> {
    authz::require(&principal, authz::ADMIN)?;

    let items = services.store.list_items().await?;
    let alerts = low_stock_alerts(&items, LOW_STOCK_THRESHOLD);

    Ok(Json(dto::AlertsResponse {
        count: alerts.len(),
        alerts,
        timestamp: Utc::now(),
    }))
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<InventoryItem>, ApiError> {
    let id: ItemId = id.parse()?;
    let item = services
        .store
        .get_item(id)
        .await?
        .ok_or(StoreError::NotFound("Inventory item"))?;
    Ok(Json(item))
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ItemUpdate>,
) -> Result<Json<InventoryItem>, ApiError> {
    authz::require(&principal, authz::ADMIN)?;
    let id: ItemId = id.parse()?;
    Ok(Json(services.store.update_item(id, body, Utc::now()).await?))
}

pub async fn restock_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<dto::RestockRequest>,
) -> Result<Json<InventoryItem>, ApiError> {
    authz::require(&principal, authz::ADMIN)?;
    let id: ItemId = id.parse()?;

    let item = services.store.restock_item(id, body.quantity, Utc::now()).await?;
    info!(item = %item.id, added = body.quantity, quantity = item.quantity, "inventory restocked");

    Ok(Json(item))
}
