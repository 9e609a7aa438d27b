use std::sync::Arc;

use axum::{extract::Extension, routing::post, Json, Router};

use grainbridge_auth::Principal;

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::extract::ApiJson;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/create-intent", post(create_intent))
}

pub async fn create_intent(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiJson(body): ApiJson<dto::PaymentRequest>,
) -> Result<Json<dto::PaymentResponse>, ApiError> {
    tracing::info!(user = %principal.user_id, amount = body.amount, "creating payment intent");
    let client_secret = services.payments.create_intent(body.amount).await?;
    Ok(Json(dto::PaymentResponse { client_secret }))
}
