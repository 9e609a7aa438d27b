//! Process configuration.
//!
//! Read once at startup. Sources, lowest to highest precedence:
//! built-in defaults, a `.env` file (if present), the process environment.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";
const PRODUCTION: &str = "production";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    /// Postgres URL; `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub admin_secret_key: Option<String>,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub environment: String,
    pub stripe_secret_key: Option<String>,
    pub stripe_api_base: String,
    pub seed_demo_data: bool,
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("JWT_SECRET is required but not configured")]
    MissingJwtSecret,

    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl AppConfig {
    /// Load from `.env` + process environment.
    pub fn load() -> Result<Self, AppConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => info!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(AppConfigError::Validation(format!("unreadable .env file: {e}"))),
        }
        Self::from_environment(Environment::default())
    }

    /// Load from an explicit environment source (tests pass a fixed map).
    pub fn from_environment(env: Environment) -> Result<Self, AppConfigError> {
        let config = Config::builder()
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("token_ttl_hours", 168)?
            .set_default("bcrypt_cost", i64::from(grainbridge_auth::DEFAULT_COST))?
            .set_default("environment", "development")?
            .set_default("stripe_api_base", DEFAULT_STRIPE_API_BASE)?
            .set_default("seed_demo_data", false)?
            .add_source(env.try_parsing(true).ignore_empty(true))
            .build()?;

        // Checked before deserializing so the error names the variable.
        if config.get_string("jwt_secret").map(|s| s.is_empty()).unwrap_or(true) {
            error!("JWT_SECRET is not configured; refusing to start");
            return Err(AppConfigError::MissingJwtSecret);
        }

        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    fn validate(&self) -> Result<(), AppConfigError> {
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(AppConfigError::Validation(format!(
                "BCRYPT_COST must be between 4 and 31, got {}",
                self.bcrypt_cost
            )));
        }
        if self.token_ttl_hours <= 0 {
            return Err(AppConfigError::Validation("TOKEN_TTL_HOURS must be positive".to_string()));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case(PRODUCTION)
    }

    /// Settings for tests and local tooling: in-memory store, cheap hashing.
    pub fn for_tests(jwt_secret: impl Into<String>) -> Self {
        Self {
            port: 0,
            database_url: None,
            jwt_secret: jwt_secret.into(),
            admin_secret_key: None,
            token_ttl_hours: 168,
            bcrypt_cost: 4,
            environment: "test".to_string(),
            stripe_secret_key: None,
            stripe_api_base: DEFAULT_STRIPE_API_BASE.to_string(),
            seed_demo_data: false,
        }
    }
}
