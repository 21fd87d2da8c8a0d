use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use finance_tracker_backend::config::AppConfig;
use finance_tracker_backend::{create_router, initialize_backend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state, &config.cors_allowed_origin)?;

    let listener = tokio::net::TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!("Listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
