//! Shared-secret gate for privileged registrations.

use thiserror::Error;

use crate::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationGateError {
    /// The server has no admin secret configured; nobody can register as Admin.
    #[error("Server Configuration Error: Admin Secret Key is missing.")]
    MissingSecret,

    #[error("SECURITY ALERT: Invalid Admin Secret Key! Access Denied.")]
    InvalidKey,
}

/// Only Admin registrations are gated; other roles pass unconditionally.
pub fn check_admin_gate(
    role: Role,
    supplied_key: Option<&str>,
    configured_secret: Option<&str>,
) -> Result<(), RegistrationGateError> {
    if role != Role::Admin {
        return Ok(());
    }

    let secret = match configured_secret {
        Some(s) if !s.is_empty() => s,
        _ => {
            tracing::error!("admin registration attempted but ADMIN_SECRET_KEY is not configured");
            return Err(RegistrationGateError::MissingSecret);
        }
    };

    match supplied_key {
        Some(key) if key == secret => Ok(()),
        _ => Err(RegistrationGateError::InvalidKey),
    }
}
