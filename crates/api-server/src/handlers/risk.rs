//! Risk evaluation handlers.

use axum::extract::{Query, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use risk_core::constants::RiskConstants;
use risk_core::portfolio::PortfolioSource;
use risk_governance::{CircuitBreakerState, ConsecutiveLossState, RiskCheck, StressResult, Verdict};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Query parameters for a pre-trade risk check.
#[derive(Debug, Deserialize, IntoParams)]
pub struct RiskCheckParams {
    /// Ticker of the proposed trade.
    pub ticker: String,
    /// Proposed position as a fraction of portfolio value (0.05 = 5%).
    pub position_pct: Decimal,
    /// Upstream model-disagreement fraction, when known.
    pub model_disagreement: Option<Decimal>,
    /// Order size in shares, for the slippage estimate.
    pub order_quantity: Option<Decimal>,
    /// Limit or reference price, for the slippage estimate.
    pub price: Option<Decimal>,
    /// Average daily volume, for the slippage estimate.
    pub avg_daily_volume: Option<Decimal>,
}

/// Evaluate a proposed trade against every risk gate.
#[utoipa::path(
    get,
    path = "/api/v1/risk/check",
    tag = "risk",
    params(RiskCheckParams),
    responses(
        (status = 200, description = "Verdict for the proposed trade", body = Verdict),
        (status = 400, description = "Malformed proposal", body = crate::error::ErrorResponse),
        (status = 502, description = "Portfolio collaborator failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn check(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RiskCheckParams>,
) -> ApiResult<Json<Verdict>> {
    if params.ticker.trim().is_empty() {
        return Err(ApiError::BadRequest("ticker must not be empty".to_string()));
    }
    if params.position_pct < Decimal::ZERO {
        return Err(ApiError::BadRequest(
            "position_pct must not be negative".to_string(),
        ));
    }

    let check = RiskCheck {
        ticker: params.ticker,
        proposed_position_pct: params.position_pct,
        model_disagreement: params.model_disagreement,
        order_quantity: params.order_quantity,
        price: params.price,
        avg_daily_volume: params.avg_daily_volume,
    };
    let verdict = state.evaluator.evaluate(&check).await?;
    Ok(Json(verdict))
}

/// Current market-regime classification.
#[utoipa::path(
    get,
    path = "/api/v1/risk/circuit-breaker",
    tag = "risk",
    responses(
        (status = 200, description = "Circuit breaker state", body = CircuitBreakerState)
    )
)]
pub async fn circuit_breaker(
    State(state): State<Arc<AppState>>,
) -> Json<CircuitBreakerState> {
    Json(state.breaker.state().await)
}

/// Run the crash-scenario battery against the current book.
#[utoipa::path(
    get,
    path = "/api/v1/risk/stress-test",
    tag = "risk",
    responses(
        (status = 200, description = "Per-scenario results", body = [StressResult]),
        (status = 502, description = "Portfolio collaborator failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn stress_test(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<StressResult>>> {
    let snapshot = state.portfolio.snapshot().await?;
    Ok(Json(state.stress.run(&snapshot)))
}

/// The immutable threshold bag. There is no write path.
#[utoipa::path(
    get,
    path = "/api/v1/risk/constants",
    tag = "risk",
    responses(
        (status = 200, description = "Risk constants", body = RiskConstants)
    )
)]
pub async fn constants(State(state): State<Arc<AppState>>) -> Json<RiskConstants> {
    Json((*state.constants).clone())
}

/// Current consecutive-loss streak state.
#[utoipa::path(
    get,
    path = "/api/v1/risk/consecutive-loss",
    tag = "risk",
    responses(
        (status = 200, description = "Streak state", body = ConsecutiveLossState)
    )
)]
pub async fn consecutive_loss(
    State(state): State<Arc<AppState>>,
) -> Json<ConsecutiveLossState> {
    Json(state.tracker.state().await)
}

/// A closed trade reported by the trade-close pipeline.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TradeResultRequest {
    pub ticker: String,
    pub is_win: bool,
}

/// Record a trade close into the streak machine.
#[utoipa::path(
    post,
    path = "/api/v1/risk/trade-result",
    tag = "risk",
    request_body = TradeResultRequest,
    responses(
        (status = 200, description = "New streak state", body = ConsecutiveLossState),
        (status = 400, description = "Malformed result", body = crate::error::ErrorResponse)
    )
)]
pub async fn record_trade_result(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TradeResultRequest>,
) -> ApiResult<Json<ConsecutiveLossState>> {
    if request.ticker.trim().is_empty() {
        return Err(ApiError::BadRequest("ticker must not be empty".to_string()));
    }

    let new_state = state
        .tracker
        .record_result(&request.ticker, request.is_win)
        .await;
    Ok(Json(new_state))
}

/// Human approval to lift the consecutive-loss entry pause.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResumeEntriesRequest {
    pub approved_by: String,
}

/// Lift the entry pause after a human decision.
#[utoipa::path(
    post,
    path = "/api/v1/risk/consecutive-loss/resume",
    tag = "risk",
    request_body = ResumeEntriesRequest,
    responses(
        (status = 200, description = "New streak state", body = ConsecutiveLossState),
        (status = 400, description = "Missing approver", body = crate::error::ErrorResponse)
    )
)]
pub async fn resume_entries(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResumeEntriesRequest>,
) -> ApiResult<Json<ConsecutiveLossState>> {
    if request.approved_by.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "approved_by must not be empty".to_string(),
        ));
    }

    let new_state = state
        .tracker
        .resume_after_human_decision(&request.approved_by)
        .await;
    Ok(Json(new_state))
}
