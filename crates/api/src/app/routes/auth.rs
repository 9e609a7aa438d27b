use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use tracing::{info, warn};

use grainbridge_auth::{
    check_admin_gate, hash_password, validate_new_user, verify_password, Principal, ProfileUpdate,
    TokenIssuer, User, UserProfile,
};
use grainbridge_infra::StoreError;

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::extract::ApiJson;
use crate::app::services::AppServices;
use crate::authz;

const BAD_CREDENTIALS: &str = "Invalid email or password";

pub fn public_router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn router() -> Router {
    Router::new()
        .route("/profile", put(update_profile))
        .route("/users", get(list_users))
}

/// bcrypt is deliberately slow; keep it off the async workers.
async fn hash_blocking(plain: String, cost: u32) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&plain, cost))
        .await
        .map_err(|e| ApiError::internal("Password hashing failed", e))?
        .map_err(ApiError::from)
}

async fn verify_blocking(plain: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
        .await
        .map_err(|e| ApiError::internal("Password check failed", e))?
        .map_err(ApiError::from)
}

fn auth_response(services: &AppServices, user: &User) -> Result<dto::AuthResponse, ApiError> {
    let token = services.jwt.issue(user.id, user.role, Utc::now())?;
    Ok(dto::AuthResponse {
        profile: user.profile(),
        token,
    })
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<dto::RegisterRequest>,
) -> Result<(StatusCode, Json<dto::AuthResponse>), ApiError> {
    // The gate runs first: a rejected admin registration must not create anything.
    check_admin_gate(
        body.user.role,
        body.admin_key.as_deref(),
        services.config.admin_secret_key.as_deref(),
    )
    .inspect_err(|e| warn!(error = %e, "admin registration rejected"))?;

    let input = validate_new_user(body.user)?;
    if services.store.find_user_by_email(&input.email).await?.is_some() {
        return Err(StoreError::Conflict("User already exists".to_string()).into());
    }

    let hash = hash_blocking(input.password.clone(), services.config.bcrypt_cost).await?;
    let user = services.store.insert_user(User::create(input, hash, Utc::now())).await?;
    info!(user = %user.id, role = %user.role, "user registered");

    Ok((StatusCode::CREATED, Json(auth_response(&services, &user)?)))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<dto::LoginRequest>,
) -> Result<Json<dto::AuthResponse>, ApiError> {
    let email = body.email.trim().to_lowercase();
    let Some(user) = services.store.find_user_by_email(&email).await? else {
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS));
    };

    if !verify_blocking(body.password, user.password_hash.clone()).await? {
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS));
    }

    Ok(Json(auth_response(&services, &user)?))
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiJson(body): ApiJson<ProfileUpdate>,
) -> Result<Json<dto::AuthResponse>, ApiError> {
    let mut user = services
        .store
        .get_user(principal.user_id)
        .await?
        .ok_or(StoreError::NotFound("User"))?;

    let new_hash = match body.password.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(p) => Some(hash_blocking(p.to_string(), services.config.bcrypt_cost).await?),
        None => None,
    };

    user.apply_update(body, new_hash, Utc::now())?;
    let user = services.store.update_user(user).await?;

    Ok(Json(auth_response(&services, &user)?))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    authz::require(&principal, authz::ADMIN)?;
    let users = services.store.list_users().await?;
    Ok(Json(users.iter().map(User::profile).collect()))
}
