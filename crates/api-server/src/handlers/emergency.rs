//! Emergency shutdown handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use risk_core::types::{CancelFailure, CancelledOrder};
use risk_governance::{ShutdownEvent, ShutdownOutcome, ShutdownState};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Request to halt all trading.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ShutdownRequest {
    pub initiated_by: String,
    pub reason: String,
}

/// Halt all trading and cancel every open order.
#[utoipa::path(
    post,
    path = "/api/v1/emergency/shutdown",
    tag = "emergency",
    request_body = ShutdownRequest,
    responses(
        (status = 200, description = "Trading halted", body = ShutdownOutcome),
        (status = 400, description = "Missing initiator or reason", body = crate::error::ErrorResponse)
    )
)]
pub async fn shutdown(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ShutdownRequest>,
) -> ApiResult<Json<ShutdownOutcome>> {
    if request.initiated_by.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "initiated_by must not be empty".to_string(),
        ));
    }
    if request.reason.trim().is_empty() {
        return Err(ApiError::BadRequest("reason must not be empty".to_string()));
    }

    let outcome = state
        .shutdown
        .emergency_shutdown(&request.initiated_by, &request.reason)
        .await;
    Ok(Json(outcome))
}

/// Human approval to resume trading.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResumeRequest {
    pub approved_by: String,
}

/// Resume trading after a shutdown.
#[utoipa::path(
    post,
    path = "/api/v1/emergency/resume",
    tag = "emergency",
    request_body = ResumeRequest,
    responses(
        (status = 200, description = "Trading resumed", body = ShutdownState),
        (status = 400, description = "Missing approver", body = crate::error::ErrorResponse),
        (status = 409, description = "Not currently shut down", body = crate::error::ErrorResponse)
    )
)]
pub async fn resume(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResumeRequest>,
) -> ApiResult<Json<ShutdownState>> {
    if request.approved_by.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "approved_by must not be empty".to_string(),
        ));
    }

    let new_state = state.shutdown.resume_trading(&request.approved_by).await?;
    Ok(Json(new_state))
}

/// Current lifecycle status with history.
#[utoipa::path(
    get,
    path = "/api/v1/emergency/status",
    tag = "emergency",
    responses(
        (status = 200, description = "Lifecycle status", body = ShutdownState)
    )
)]
pub async fn status(State(state): State<Arc<AppState>>) -> Json<ShutdownState> {
    Json(state.shutdown.status().await)
}

/// The append-only audit history.
#[utoipa::path(
    get,
    path = "/api/v1/emergency/history",
    tag = "emergency",
    responses(
        (status = 200, description = "Lifecycle events in order", body = [ShutdownEvent])
    )
)]
pub async fn history(State(state): State<Arc<AppState>>) -> Json<Vec<ShutdownEvent>> {
    Json(state.shutdown.history().await)
}

/// Outcome of a cancel-all pass.
#[derive(Debug, Serialize, ToSchema)]
pub struct CancelAllResponse {
    pub cancelled_count: usize,
    pub details: Vec<CancelledOrder>,
    pub failed: Vec<CancelFailure>,
}

/// Cancel every open order without changing the lifecycle status.
#[utoipa::path(
    post,
    path = "/api/v1/emergency/cancel-all-orders",
    tag = "emergency",
    responses(
        (status = 200, description = "Cancellation report", body = CancelAllResponse)
    )
)]
pub async fn cancel_all_orders(
    State(state): State<Arc<AppState>>,
) -> Json<CancelAllResponse> {
    let report = state.shutdown.cancel_all_orders().await;
    Json(CancelAllResponse {
        cancelled_count: report.cancelled_count(),
        details: report.cancelled,
        failed: report.failed,
    })
}

/// Acknowledgement of a paper-mode request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ForcePaperResponse {
    pub acknowledged: bool,
    /// Mode the process is currently running in; unchanged until restart.
    pub current_mode: String,
}

/// Request to force paper-trading mode.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ForcePaperRequest {
    pub requested_by: String,
}

/// Record a request to force paper mode. Advisory: the running mode only
/// changes on an operator restart.
#[utoipa::path(
    post,
    path = "/api/v1/emergency/force-paper-mode",
    tag = "emergency",
    request_body = ForcePaperRequest,
    responses(
        (status = 200, description = "Request recorded", body = ForcePaperResponse),
        (status = 400, description = "Missing requester", body = crate::error::ErrorResponse)
    )
)]
pub async fn force_paper_mode(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ForcePaperRequest>,
) -> ApiResult<Json<ForcePaperResponse>> {
    if request.requested_by.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "requested_by must not be empty".to_string(),
        ));
    }

    state.shutdown.force_paper_mode(&request.requested_by).await;
    Ok(Json(ForcePaperResponse {
        acknowledged: true,
        current_mode: state.config.trading_mode.to_string(),
    }))
}
