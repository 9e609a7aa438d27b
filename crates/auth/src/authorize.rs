use thiserror::Error;

use crate::{Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("User role {0} is not authorized to access this route.")]
    Forbidden(Role),
}

/// Authorize a principal against the set of roles a route admits.
///
/// - No IO
/// - No panics
/// - Pure policy check on the token's role claim
pub fn authorize(principal: &Principal, allowed: &[Role]) -> Result<(), AuthzError> {
    if allowed.contains(&principal.role) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(principal.role))
    }
}
