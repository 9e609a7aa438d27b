use axum::Router;

pub mod analytics;
pub mod auth;
pub mod inventory;
pub mod orders;
pub mod payment;
pub mod shipments;
pub mod system;

/// Routes reachable without a token.
pub fn public_router() -> Router {
    Router::new().nest("/api/auth", auth::public_router())
}

/// Routes behind the auth middleware.
pub fn router() -> Router {
    Router::new()
        .nest("/api/auth", auth::router())
        .nest("/api/inventory", inventory::router())
        .nest("/api/orders", orders::router())
        .nest("/api/shipments", shipments::router())
        .nest("/api/analytics", analytics::router())
        .nest("/api/payment", payment::router())
}
