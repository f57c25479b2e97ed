//! API Server
//!
//! HTTP boundary for the riskgate risk-governance service.
//!
//! # Features
//!
//! - **REST API**: pre-trade risk checks, stress tests, streak tracking,
//!   and the emergency shutdown lifecycle
//! - **OpenAPI**: auto-generated Swagger documentation at `/docs`
//! - **Regime monitor**: background task recomputing the circuit breaker
//!   from the market feed
//!
//! # Example
//!
//! ```ignore
//! use api_server::{ApiServer, ServerConfig};
//! use risk_core::config::CoreConfig;
//!
//! let core_config = CoreConfig::from_env()?;
//! let server = ApiServer::new(ServerConfig::from_env(), core_config)?;
//! server.run().await?;
//! ```

pub mod error;
pub mod handlers;
pub mod monitor;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use monitor::spawn_regime_monitor;
pub use routes::create_router;
pub use state::AppState;

use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

use risk_core::config::CoreConfig;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Enable CORS for all origins (development only).
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_permissive: true,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .or_else(|_| std::env::var("API_PORT"))
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            cors_permissive: std::env::var("CORS_PERMISSIVE")
                .map(|v| v == "true")
                .unwrap_or(true),
        }
    }

    /// Get the socket address.
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address")
    }
}

/// The API server.
pub struct ApiServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server around freshly wired state.
    pub fn new(config: ServerConfig, core_config: CoreConfig) -> anyhow::Result<Self> {
        let state = Arc::new(AppState::new(core_config)?);
        Ok(Self { config, state })
    }

    /// Shared state handle, for hosts that seed the portfolio or book.
    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Run the server until ctrl-c.
    pub async fn run(self) -> anyhow::Result<()> {
        let state = self.state;

        let router = create_router(state.clone());
        let router = router
            .layer(
                TraceLayer::new_for_http()
                    .on_request(|request: &Request<_>, _span: &tracing::Span| {
                        tracing::info!(
                            method = %request.method(),
                            uri = %request.uri(),
                            "Incoming request"
                        );
                    })
                    .on_response(DefaultOnResponse::new().level(Level::DEBUG))
                    .on_failure(
                        |error: tower_http::classify::ServerErrorsFailureClass,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::error!(
                                error = %error,
                                latency_ms = latency.as_millis(),
                                "Request failed"
                            );
                        },
                    ),
            )
            .layer(DefaultBodyLimit::max(256 * 1024)) // 256 KB
            .layer(if self.config.cors_permissive {
                CorsLayer::permissive()
            } else {
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any)
            });

        // Background regime monitor
        spawn_regime_monitor(
            state.breaker.clone(),
            state.market_feed_dyn(),
            state.config.regime_poll_secs,
        );

        let addr = self.config.socket_addr();
        info!(
            address = %addr,
            trading_mode = %state.config.trading_mode,
            "Starting riskgate API server"
        );

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("shutdown signal received, draining connections");
            })
            .await?;

        Ok(())
    }
}
