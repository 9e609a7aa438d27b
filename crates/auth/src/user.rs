//! User records for identity management.
//!
//! Users are created at registration and never deleted. The role is fixed at
//! creation; profile fields and the password can change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use grainbridge_core::{DomainError, Entity, UserId};

use crate::Role;

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// A registered account.
///
/// # Invariants
/// - `email` is trimmed, lowercased and unique across all users.
/// - `company_name` is present when the role is Customer or Supplier.
/// - `role` never changes after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub name: String,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl User {
    /// Build a new account from validated input and an already-computed hash.
    pub fn create(input: NewUser, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            email: input.email,
            password_hash,
            role: input.role,
            name: input.name,
            company_name: input.company_name,
            phone: input.phone,
            address: input.address,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            company_name: self.company_name.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            created_at: self.created_at,
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            company_name: self.company_name.clone(),
        }
    }

    /// Apply a partial profile update.
    ///
    /// Blank values leave the stored field untouched. The caller hashes a new
    /// password (if any) and passes it as `new_password_hash`.
    pub fn apply_update(
        &mut self,
        update: ProfileUpdate,
        new_password_hash: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if let Some(email) = non_blank(update.email) {
            self.email = normalize_email(&email)?;
        }
        if let Some(name) = non_blank(update.name) {
            self.name = name;
        }
        if let Some(phone) = non_blank(update.phone) {
            self.phone = Some(phone);
        }
        if let Some(address) = non_blank(update.address) {
            self.address = Some(address);
        }
        if let Some(company) = non_blank(update.company_name) {
            self.company_name = Some(company);
        }
        if let Some(hash) = new_password_hash {
            self.password_hash = hash;
        }
        self.updated_at = now;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Views
// ─────────────────────────────────────────────────────────────────────────────

/// Public view of a user (never includes the password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Compact reference embedded in orders and shipments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub company_name: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Inputs
// ─────────────────────────────────────────────────────────────────────────────

/// Registration input (password still in plain text).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Partial profile update; absent or blank fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company_name: Option<String>,
}

/// Validate and normalize a registration.
pub fn validate_new_user(input: NewUser) -> Result<NewUser, DomainError> {
    let name = non_blank(Some(input.name))
        .ok_or_else(|| DomainError::validation("name is required"))?;
    let email = normalize_email(&input.email)?;
    if input.password.trim().is_empty() {
        return Err(DomainError::validation("password is required"));
    }

    let company_name = non_blank(input.company_name);
    if input.role.requires_company() && company_name.is_none() {
        return Err(DomainError::validation(format!(
            "companyName is required for {} accounts",
            input.role
        )));
    }

    Ok(NewUser {
        name,
        email,
        password: input.password,
        role: input.role,
        company_name,
        phone: non_blank(input.phone),
        address: non_blank(input.address),
    })
}

fn normalize_email(raw: &str) -> Result<String, DomainError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation("a valid email is required"));
    }
    Ok(email)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(role: Role) -> NewUser {
        NewUser {
            name: "  Ayesha Khan ".to_string(),
            email: " Ayesha@RiceTraders.PK ".to_string(),
            password: "hunter22".to_string(),
            role,
            company_name: Some("Rice Traders".to_string()),
            phone: Some("".to_string()),
            address: None,
        }
    }

    #[test]
    fn registration_is_normalized() {
        let input = validate_new_user(registration(Role::Customer)).unwrap();
        assert_eq!(input.email, "ayesha@ricetraders.pk");
        assert_eq!(input.name, "Ayesha Khan");
        assert_eq!(input.phone, None);
    }

    #[test]
    fn company_required_for_customers_and_suppliers() {
        for role in [Role::Customer, Role::Supplier] {
            let mut input = registration(role);
            input.company_name = Some("   ".to_string());
            let err = validate_new_user(input).unwrap_err();
            assert!(matches!(err, DomainError::Validation(msg) if msg.contains("companyName")));
        }
    }

    #[test]
    fn admin_may_omit_company() {
        let mut input = registration(Role::Admin);
        input.company_name = None;
        assert!(validate_new_user(input).is_ok());
    }

    #[test]
    fn rejects_missing_password_and_bad_email() {
        let mut input = registration(Role::Customer);
        input.password = " ".to_string();
        assert!(validate_new_user(input).is_err());

        let mut input = registration(Role::Customer);
        input.email = "no-at-sign".to_string();
        assert!(validate_new_user(input).is_err());
    }

    #[test]
    fn profile_update_keeps_blank_fields() {
        let now = Utc::now();
        let input = validate_new_user(registration(Role::Supplier)).unwrap();
        let mut user = User::create(input, "hash-1".to_string(), now);

        let update = ProfileUpdate {
            name: Some("".to_string()),
            phone: Some("0300-1234567".to_string()),
            email: Some("NEW@ricetraders.pk".to_string()),
            ..Default::default()
        };
        user.apply_update(update, Some("hash-2".to_string()), now).unwrap();

        assert_eq!(user.name, "Ayesha Khan");
        assert_eq!(user.phone.as_deref(), Some("0300-1234567"));
        assert_eq!(user.email, "new@ricetraders.pk");
        assert_eq!(user.password_hash, "hash-2");
        assert_eq!(user.role, Role::Supplier);
    }

    #[test]
    fn profile_never_exposes_hash() {
        let input = validate_new_user(registration(Role::Customer)).unwrap();
        let user = User::create(input, "secret-hash".to_string(), Utc::now());
        let json = serde_json::to_string(&user.profile()).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("companyName"));
    }
}
