use anyhow::Context;

use grainbridge_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    grainbridge_observability::init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let port = config.port;
    let app = grainbridge_api::app::build_app(config).await?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind 0.0.0.0:{port}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
