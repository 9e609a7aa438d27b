use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use grainbridge_auth::{AuthzError, PasswordError, RegistrationGateError, TokenError};
use grainbridge_core::DomainError;
use grainbridge_infra::{PaymentError, StoreError};

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Every failure a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error(transparent)]
    Gate(#[from] RegistrationGateError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    BadRequest(String),

    /// Unexpected failure. `message` is shown to the caller; `source` only
    /// outside production.
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn internal(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        ApiError::Internal {
            message: message.into(),
            source: source.into(),
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Domain(e) => domain_status(e),
            ApiError::Store(StoreError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Store(StoreError::Domain(e)) => domain_status(e),
            ApiError::Store(StoreError::Conflict(_)) => (StatusCode::BAD_REQUEST, "conflict"),
            ApiError::Store(StoreError::Database(_)) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::Gate(RegistrationGateError::InvalidKey) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::Gate(RegistrationGateError::MissingSecret) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            ApiError::Payment(PaymentError::InvalidAmount) => (StatusCode::BAD_REQUEST, "validation_error"),
            ApiError::Payment(PaymentError::NotConfigured) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            ApiError::Payment(PaymentError::Provider(_) | PaymentError::Transport(_)) => {
                (StatusCode::BAD_GATEWAY, "payment_provider_error")
            }
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

fn domain_status(e: &DomainError) -> (StatusCode, &'static str) {
    match e {
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        DomainError::InvariantViolation(_) => (StatusCode::BAD_REQUEST, "invariant_violation"),
        DomainError::InvalidId(_) => (StatusCode::BAD_REQUEST, "invalid_id"),
        DomainError::Conflict(_) => (StatusCode::BAD_REQUEST, "conflict"),
        DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        DomainError::Unauthorized => (StatusCode::FORBIDDEN, "forbidden"),
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Encoding(_) => ApiError::internal("Failed to issue token", e),
            _ => ApiError::Unauthorized("Not authorized, token failed"),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(e: PasswordError) -> Self {
        ApiError::internal("Password hashing failed", e)
    }
}

/// Full error chain of a 5xx response, kept out of the body until
/// [`expose_error_detail`] decides the deployment may see it.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    code: &'static str,
    message: String,
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.to_string();

        if !status.is_server_error() {
            return json_error(status, code, message);
        }

        let detail = format!("{:#}", anyhow::Error::new(self));
        error!(status = status.as_u16(), error = %detail, "request failed");

        let mut response = json_error(status, code, message.clone());
        response.extensions_mut().insert(ErrorDetail { code, message, detail });
        response
    }
}

/// Middleware for non-production deployments: adds a `detail` field with the
/// error chain to server error bodies.
pub async fn expose_error_detail(req: Request<Body>, next: Next) -> Response {
    let response = next.run(req).await;
    let Some(d) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };
    (
        response.status(),
        axum::Json(json!({
            "error": d.code,
            "message": d.message,
            "detail": d.detail,
        })),
    )
        .into_response()
}
