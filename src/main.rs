//! demo-microservice binary.

use demo_microservice::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServiceConfig::from_env()?;

    tracing::info!("Starting {} ({})", config.service_name, config.app_version);
    tracing::info!("Try: curl http://localhost:{}/demo/monetary", config.port);
    tracing::info!("Health check: curl http://localhost:{}/demo/health", config.port);

    DemoServer::new(config).run().await?;

    tracing::info!("Server stopped");
    Ok(())
}
