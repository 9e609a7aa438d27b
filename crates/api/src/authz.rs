//! Route-level role guard.
//!
//! Handlers call [`require`] before touching the store, so a forbidden caller
//! never causes a write.

use grainbridge_auth::{authorize, Principal, Role};

use crate::app::errors::ApiError;

pub const ADMIN: &[Role] = &[Role::Admin];
pub const CUSTOMER: &[Role] = &[Role::Customer];
pub const SUPPLIER: &[Role] = &[Role::Supplier];

pub fn require(principal: &Principal, allowed: &[Role]) -> Result<(), ApiError> {
    authorize(principal, allowed).map_err(|e| {
        tracing::info!(user = %principal.user_id, role = %principal.role, "role not allowed on route");
        ApiError::from(e)
    })
}
