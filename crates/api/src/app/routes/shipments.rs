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
use grainbridge_core::ShipmentId;
use grainbridge_purchasing::{validate_new_shipment, NewShipment, Shipment, ShipmentStatus};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::extract::ApiJson;
use crate::app::routes::orders::scoped_users;
use crate::app::services::AppServices;
use crate::authz;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_shipments).post(create_shipment))
        .route("/:id/status", put(decide_shipment))
}

pub async fn create_shipment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiJson(body): ApiJson<NewShipment>,
) -> Result<(StatusCode, Json<Shipment>), ApiError> {
    authz::require(&principal, authz::SUPPLIER)?;

    let input = validate_new_shipment(body)?;
    let shipment = services
        .store
        .insert_shipment(Shipment::create(principal.user_id, input, Utc::now()))
        .await?;
    info!(shipment = %shipment.id, crop = %shipment.crop_type, quantity = shipment.quantity, "shipment proposed");

    Ok((StatusCode::CREATED, Json(shipment)))
}

pub async fn list_shipments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<dto::ShipmentView>>, ApiError> {
    let scope = (!principal.is_admin()).then_some(principal.user_id);
    let shipments = services.store.list_shipments(scope).await?;
    let users = dto::summaries(&scoped_users(&services, &principal).await?);

    Ok(Json(
        shipments
            .into_iter()
            .map(|s| dto::shipment_view(s, &users))
            .collect(),
    ))
}

pub async fn decide_shipment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<dto::StatusRequest>,
) -> Result<Json<Shipment>, ApiError> {
    authz::require(&principal, authz::ADMIN)?;
    let id: ShipmentId = id.parse()?;
    let requested = ShipmentStatus::parse(&body.status)?;

    let outcome = services.store.decide_shipment(id, requested, Utc::now()).await?;
    match &outcome.credited {
        Some(item) => info!(
            shipment = %outcome.shipment.id,
            item = %item.id,
            quantity = item.quantity,
            "shipment approved, inventory credited"
        ),
        None => info!(shipment = %outcome.shipment.id, status = %outcome.shipment.status, "shipment decided"),
    }

    Ok(Json(outcome.shipment))
}
