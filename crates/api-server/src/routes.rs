//! API route definitions.

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{emergency, health, risk};
use crate::state::AppState;

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Riskgate API",
        version = "1.0.0",
        description = "Risk-governance service: pre-trade checks, circuit breaker, \
                       stress testing, and the emergency shutdown lifecycle"
    ),
    paths(
        health::health_check,
        risk::check,
        risk::circuit_breaker,
        risk::stress_test,
        risk::constants,
        risk::consecutive_loss,
        risk::record_trade_result,
        risk::resume_entries,
        emergency::shutdown,
        emergency::resume,
        emergency::status,
        emergency::history,
        emergency::cancel_all_orders,
        emergency::force_paper_mode,
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            health::HealthResponse,
            risk::TradeResultRequest,
            risk::ResumeEntriesRequest,
            emergency::ShutdownRequest,
            emergency::ResumeRequest,
            emergency::ForcePaperRequest,
            emergency::ForcePaperResponse,
            emergency::CancelAllResponse,
            risk_core::constants::RiskConstants,
            risk_core::types::Sector,
            risk_core::types::CancelledOrder,
            risk_core::types::CancelFailure,
            risk_core::types::CancelReport,
            risk_governance::Verdict,
            risk_governance::RiskReason,
            risk_governance::CircuitBreakerState,
            risk_governance::MarketRegime,
            risk_governance::StressResult,
            risk_governance::ConsecutiveLossState,
            risk_governance::ShutdownState,
            risk_governance::ShutdownOutcome,
            risk_governance::ShutdownEvent,
            risk_governance::ShutdownEventKind,
            risk_governance::ShutdownStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "risk", description = "Pre-trade risk evaluation and monitoring"),
        (name = "emergency", description = "Emergency shutdown lifecycle"),
    )
)]
pub struct ApiDoc;

/// Create the main router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        // Risk endpoints
        .route("/api/v1/risk/check", get(risk::check))
        .route("/api/v1/risk/circuit-breaker", get(risk::circuit_breaker))
        .route("/api/v1/risk/stress-test", get(risk::stress_test))
        .route("/api/v1/risk/constants", get(risk::constants))
        .route("/api/v1/risk/consecutive-loss", get(risk::consecutive_loss))
        .route("/api/v1/risk/trade-result", post(risk::record_trade_result))
        .route(
            "/api/v1/risk/consecutive-loss/resume",
            post(risk::resume_entries),
        )
        // Emergency endpoints
        .route("/api/v1/emergency/shutdown", post(emergency::shutdown))
        .route("/api/v1/emergency/resume", post(emergency::resume))
        .route("/api/v1/emergency/status", get(emergency::status))
        .route("/api/v1/emergency/history", get(emergency::history))
        .route(
            "/api/v1/emergency/cancel-all-orders",
            post(emergency::cancel_all_orders),
        )
        .route(
            "/api/v1/emergency/force-paper-mode",
            post(emergency::force_paper_mode),
        )
        // Swagger UI
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add state
        .with_state(state)
}
