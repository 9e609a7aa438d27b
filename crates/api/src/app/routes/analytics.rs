use std::sync::Arc;

use axum::{extract::Extension, routing::get, Json, Router};
use chrono::Utc;

use grainbridge_analytics::{dashboard_metrics, market_insights, DashboardMetrics, MarketInsights};
use grainbridge_auth::Principal;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;

pub fn router() -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/market-insights", get(insights))
}

pub async fn metrics(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<DashboardMetrics>, ApiError> {
    authz::require(&principal, authz::ADMIN)?;
    let orders = services.store.list_orders(None).await?;
    let items = services.store.list_items().await?;
    Ok(Json(dashboard_metrics(&orders, &items)))
}

pub async fn insights(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<MarketInsights>, ApiError> {
    authz::require(&principal, authz::ADMIN)?;
    let orders = services.store.list_orders(None).await?;
    Ok(Json(market_insights(&orders, Utc::now())))
}
