//! Card payment provider client.

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, instrument};

/// Orders are priced in Pakistani rupees.
pub const CURRENCY: &str = "pkr";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment provider is not configured")]
    NotConfigured,

    #[error("amount must be a positive number")]
    InvalidAmount,

    /// The provider answered with an error.
    #[error("{0}")]
    Provider(String),

    #[error("payment provider unreachable: {0}")]
    Transport(String),
}

#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a card payment intent for `amount` rupees and return the client
    /// secret the browser needs to confirm it.
    async fn create_intent(&self, amount: f64) -> Result<String, PaymentError>;
}

/// Stripe's PaymentIntents API over plain HTTPS.
#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: Option<String>,
}

impl StripeGateway {
    pub fn new(api_base: impl Into<String>, secret_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.filter(|k| !k.is_empty()),
        }
    }
}

impl std::fmt::Debug for StripeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeGateway")
            .field("api_base", &self.api_base)
            .field("configured", &self.secret_key.is_some())
            .finish()
    }
}

#[derive(Deserialize)]
struct IntentResponse {
    client_secret: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Rupees to paisa.
fn minor_units(amount: f64) -> Result<i64, PaymentError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(PaymentError::InvalidAmount);
    }
    let minor = (amount * 100.0).round();
    if minor < 1.0 || minor > i64::MAX as f64 {
        return Err(PaymentError::InvalidAmount);
    }
    Ok(minor as i64)
}

#[async_trait::async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self), err)]
    async fn create_intent(&self, amount: f64) -> Result<String, PaymentError> {
        let minor = minor_units(amount)?;
        let Some(key) = self.secret_key.as_deref() else {
            error!("STRIPE_SECRET_KEY is not configured");
            return Err(PaymentError::NotConfigured);
        };

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(key)
            .form(&[
                ("amount", minor.to_string()),
                ("currency", CURRENCY.to_string()),
                ("payment_method_types[]", "card".to_string()),
            ])
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body: IntentResponse = response
                .json()
                .await
                .map_err(|e| PaymentError::Provider(format!("unexpected response: {e}")))?;
            return Ok(body.client_secret);
        }

        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error.message,
            Err(_) => format!("payment provider returned {status}"),
        };
        Err(PaymentError::Provider(message))
    }
}
