use std::sync::Arc;

use anyhow::Context;

use storeadmin_api::app::{build_app, services::AppServices};
use storeadmin_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storeadmin_observability::init();

    let config = AppConfig::from_env()?;
    let services = AppServices::from_config(&config)
        .await
        .context("failed to initialize storage")?;

    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
