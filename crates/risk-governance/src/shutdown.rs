//! Emergency shutdown lifecycle.
//!
//! A system-wide halt that supersedes every per-trade verdict. The state
//! machine has two statuses and an append-only history; all transitions
//! serialize under one write lock so concurrent callers can never leave it
//! half-applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use risk_core::orders::OrderCanceller;
use risk_core::types::CancelReport;
use risk_core::{Error, Result};

/// Trading lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownStatus {
    Active,
    Shutdown,
}

impl ShutdownStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShutdownStatus::Active => "active",
            ShutdownStatus::Shutdown => "shutdown",
        }
    }
}

/// Kind of lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownEventKind {
    EmergencyShutdown,
    ResumeTrading,
    ForcePaperMode,
}

/// One entry in the append-only history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShutdownEvent {
    pub kind: ShutdownEventKind,
    /// Who initiated or approved the operation.
    pub actor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Status plus the full audit history.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShutdownState {
    pub status: ShutdownStatus,
    pub history: Vec<ShutdownEvent>,
}

/// Result of an emergency shutdown: the new state and what happened to the
/// open orders. Partial cancellation failures ride along, never dropped.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShutdownOutcome {
    pub state: ShutdownState,
    pub cancellation: CancelReport,
}

struct Inner {
    status: ShutdownStatus,
    history: Vec<ShutdownEvent>,
}

/// Halt/resume state machine, one instance per process.
pub struct EmergencyShutdownManager {
    canceller: Arc<dyn OrderCanceller>,
    inner: RwLock<Inner>,
    /// Fast path flag for callers that only need "are we halted".
    is_shutdown: AtomicBool,
    cancel_timeout: Duration,
}

impl EmergencyShutdownManager {
    pub fn new(canceller: Arc<dyn OrderCanceller>, cancel_timeout: Duration) -> Self {
        Self {
            canceller,
            inner: RwLock::new(Inner {
                status: ShutdownStatus::Active,
                history: Vec::new(),
            }),
            is_shutdown: AtomicBool::new(false),
            cancel_timeout,
        }
    }

    /// Whether trading is currently halted (fast path).
    pub fn is_shutdown(&self) -> bool {
        self.is_shutdown.load(Ordering::SeqCst)
    }

    /// Current status with the full history.
    pub async fn status(&self) -> ShutdownState {
        let inner = self.inner.read().await;
        ShutdownState {
            status: inner.status,
            history: inner.history.clone(),
        }
    }

    /// The audit history alone.
    pub async fn history(&self) -> Vec<ShutdownEvent> {
        self.inner.read().await.history.clone()
    }

    /// Halt all trading and cancel every open order.
    ///
    /// Idempotent in effect: while already shut down this re-cancels and
    /// appends another event without erroring. The status transition is
    /// recorded before the collaborator call, so a cancellation failure can
    /// never lose the halt.
    pub async fn emergency_shutdown(&self, initiated_by: &str, reason: &str) -> ShutdownOutcome {
        let mut inner = self.inner.write().await;

        let already = inner.status == ShutdownStatus::Shutdown;
        inner.status = ShutdownStatus::Shutdown;
        self.is_shutdown.store(true, Ordering::SeqCst);
        inner.history.push(ShutdownEvent {
            kind: ShutdownEventKind::EmergencyShutdown,
            actor: initiated_by.to_string(),
            reason: Some(reason.to_string()),
            timestamp: Utc::now(),
        });

        error!(
            initiated_by = %initiated_by,
            reason = %reason,
            repeated = already,
            "EMERGENCY SHUTDOWN: halting all trading activity"
        );

        // Lock stays held so concurrent shutdown/resume calls serialize
        let cancellation = self.cancel_with_timeout().await;
        if !cancellation.is_clean() {
            warn!(
                cancelled = cancellation.cancelled_count(),
                failed = cancellation.failed_count(),
                "shutdown recorded, but some orders were not confirmed cancelled"
            );
        } else {
            info!(
                cancelled = cancellation.cancelled_count(),
                "all open orders cancelled"
            );
        }

        ShutdownOutcome {
            state: ShutdownState {
                status: inner.status,
                history: inner.history.clone(),
            },
            cancellation,
        }
    }

    /// Resume trading after a human-approved decision.
    ///
    /// Fails with an invalid-state error when not shut down; nothing is
    /// appended to the history on failure.
    pub async fn resume_trading(&self, approved_by: &str) -> Result<ShutdownState> {
        let mut inner = self.inner.write().await;

        if inner.status != ShutdownStatus::Shutdown {
            return Err(Error::InvalidState {
                operation: "resume_trading",
                current: inner.status.as_str().to_string(),
            });
        }

        inner.status = ShutdownStatus::Active;
        self.is_shutdown.store(false, Ordering::SeqCst);
        inner.history.push(ShutdownEvent {
            kind: ShutdownEventKind::ResumeTrading,
            actor: approved_by.to_string(),
            reason: None,
            timestamp: Utc::now(),
        });

        info!(approved_by = %approved_by, "trading resumed");
        Ok(ShutdownState {
            status: inner.status,
            history: inner.history.clone(),
        })
    }

    /// Cancel every open order without touching the lifecycle status.
    ///
    /// No history entry: history records lifecycle transitions and operator
    /// intents, and this is neither.
    pub async fn cancel_all_orders(&self) -> CancelReport {
        // Write lock so a concurrent shutdown's cancellation pass serializes
        let _inner = self.inner.write().await;
        let report = self.cancel_with_timeout().await;
        info!(
            cancelled = report.cancelled_count(),
            failed = report.failed_count(),
            "cancel-all-orders pass finished"
        );
        report
    }

    /// Record a request to force paper-trading mode.
    ///
    /// Advisory only: the trading-mode flag is fixed at startup and changing
    /// it takes an operator restart. The request lands in the history so the
    /// operator can act on it.
    pub async fn force_paper_mode(&self, requested_by: &str) -> ShutdownState {
        let mut inner = self.inner.write().await;
        inner.history.push(ShutdownEvent {
            kind: ShutdownEventKind::ForcePaperMode,
            actor: requested_by.to_string(),
            reason: None,
            timestamp: Utc::now(),
        });

        warn!(
            requested_by = %requested_by,
            "paper mode requested; takes effect on the next operator restart"
        );
        ShutdownState {
            status: inner.status,
            history: inner.history.clone(),
        }
    }

    /// Run the collaborator cancellation under the bounded timeout. A
    /// timeout or error becomes an unconfirmed report, never a hang.
    async fn cancel_with_timeout(&self) -> CancelReport {
        match timeout(self.cancel_timeout, self.canceller.cancel_all()).await {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                error!(error = %e, "order-cancellation collaborator failed");
                CancelReport::unconfirmed(format!("cancellation failed: {e}"))
            }
            Err(_) => {
                error!(
                    timeout_secs = self.cancel_timeout.as_secs(),
                    "order-cancellation collaborator timed out"
                );
                CancelReport::unconfirmed(format!(
                    "cancellation timed out after {}s",
                    self.cancel_timeout.as_secs()
                ))
            }
        }
    }
}
