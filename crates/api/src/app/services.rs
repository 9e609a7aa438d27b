use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use tracing::info;

use grainbridge_auth::Hs256Jwt;
use grainbridge_infra::{
    seed, AppConfig, InMemoryStore, PaymentGateway, PostgresStore, SharedStore, StripeGateway,
};

/// Process-wide handles shared by every handler.
#[derive(Clone)]
pub struct AppServices {
    pub store: SharedStore,
    pub jwt: Arc<Hs256Jwt>,
    pub payments: Arc<dyn PaymentGateway>,
    pub config: Arc<AppConfig>,
}

impl AppServices {
    /// Wire services from explicit parts (tests swap the store or gateway).
    pub fn new(config: AppConfig, store: SharedStore, payments: Arc<dyn PaymentGateway>) -> Self {
        let jwt = Hs256Jwt::new(config.jwt_secret.as_bytes())
            .with_ttl(Duration::hours(config.token_ttl_hours));
        Self {
            store,
            jwt: Arc::new(jwt),
            payments,
            config: Arc::new(config),
        }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        let payments = stripe_from(&config);
        Self::new(config, Arc::new(InMemoryStore::new()), payments)
    }
}

fn stripe_from(config: &AppConfig) -> Arc<dyn PaymentGateway> {
    Arc::new(StripeGateway::new(
        config.stripe_api_base.clone(),
        config.stripe_secret_key.clone(),
    ))
}

/// Pick the store from configuration: Postgres when `DATABASE_URL` is set,
/// otherwise an in-memory store (optionally seeded with demo data).
pub async fn build_services(config: AppConfig) -> anyhow::Result<AppServices> {
    let payments = stripe_from(&config);

    let store: SharedStore = match config.database_url.as_deref() {
        Some(url) => {
            let pg = PostgresStore::connect(url)
                .await
                .context("failed to connect to Postgres")?;
            info!("using Postgres store");
            Arc::new(pg)
        }
        None => {
            let mem = InMemoryStore::new();
            if config.seed_demo_data {
                let report = seed::import_demo_data(&mem, Utc::now())
                    .await
                    .context("failed to seed demo data")?;
                info!(items = report.items, orders = report.orders, "seeded in-memory store");
            }
            info!("using in-memory store");
            Arc::new(mem)
        }
    };

    Ok(AppServices::new(config, store, payments))
}
