//! `grainbridge-auth`: authentication/authorization boundary.
//!
//! Password hashing, session tokens, role checks and user records. This crate
//! is decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod principal;
pub mod registration;
pub mod roles;
pub mod token;
pub mod user;

pub use authorize::{authorize, AuthzError};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use password::{hash_password, verify_password, PasswordError, DEFAULT_COST};
pub use principal::Principal;
pub use registration::{check_admin_gate, RegistrationGateError};
pub use roles::{ParseRoleError, Role};
pub use token::{Hs256Jwt, JwtValidator, TokenError, TokenIssuer};
pub use user::{validate_new_user, NewUser, ProfileUpdate, User, UserProfile, UserSummary};
