//! API Server binary entrypoint.

use api_server::{ApiServer, ServerConfig};
use risk_core::config::CoreConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api_server=debug,risk_governance=debug,tower_http=debug,axum=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // TRADING_MODE must be set and valid; refusing to start is the primary
    // safeguard against unintended live trading.
    let core_config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "fatal configuration error, refusing to serve");
            return Err(e.into());
        }
    };

    let config = ServerConfig::from_env();
    let server = ApiServer::new(config, core_config)?;
    server.run().await?;

    Ok(())
}
