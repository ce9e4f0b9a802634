use anyhow::Result;
use tracing::info;

use site_content_api::api::{create_router, AppState};
use site_content_api::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("site_content_api=info".parse()?),
        )
        .init();

    info!("Starting site content API");

    // Load configuration from environment; missing backends degrade, they
    // never abort startup
    let config = Config::from_env();
    config.log_backend_status();
    let port = config.port;

    let state = AppState::from_config(config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening on port {}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
