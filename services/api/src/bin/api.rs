//! services/api/src/bin/api.rs
//!
//! Entry point of the Flame API server.

use flame_api::{build_catalog, build_state, config::Config, error::ApiError, router};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Load the Catalog ---
    let catalog = build_catalog(&config)?;
    info!("Catalog ready with {} stories", catalog.len());

    // --- 3. Build the Shared AppState and Router ---
    let bind_address = config.bind_address;
    let app = router(build_state(config, catalog))?;

    // --- 4. Start the Server ---
    info!("Starting server on {}", bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", bind_address);
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
