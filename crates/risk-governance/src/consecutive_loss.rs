//! Consecutive-loss streak tracking.
//!
//! Every trade-close event feeds this machine. A long enough losing run
//! latches an entry pause that only a human-approved resume can lift; the
//! warning flag itself clears only when a win resets the streak.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use utoipa::ToSchema;

use risk_core::constants::RiskConstants;

/// Current streak state.
///
/// `current_streak` is signed: magnitude is the run length, sign is the
/// outcome (wins positive, losses negative).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConsecutiveLossState {
    pub current_streak: i32,
    /// Tickers of the current run, in close order.
    pub streak_tickers: Vec<String>,
    pub last_result_date: Option<DateTime<Utc>>,
    /// Losing run reached the warning length. Cleared only by a win.
    pub warning_active: bool,
    /// New entries are refused. Cleared only by human approval or a win.
    pub entries_paused: bool,
    pub paused_at: Option<DateTime<Utc>>,
    pub resumed_by: Option<String>,
    pub resumed_at: Option<DateTime<Utc>>,
}

impl Default for ConsecutiveLossState {
    fn default() -> Self {
        Self {
            current_streak: 0,
            streak_tickers: Vec::new(),
            last_result_date: None,
            warning_active: false,
            entries_paused: false,
            paused_at: None,
            resumed_by: None,
            resumed_at: None,
        }
    }
}

/// Win/loss streak machine. One instance per process, shared behind `Arc`.
pub struct ConsecutiveLossTracker {
    constants: Arc<RiskConstants>,
    state: RwLock<ConsecutiveLossState>,
    /// Fast path flag for the evaluator's pre-trade check.
    entries_paused: AtomicBool,
}

impl ConsecutiveLossTracker {
    pub fn new(constants: Arc<RiskConstants>) -> Self {
        Self {
            constants,
            state: RwLock::new(ConsecutiveLossState::default()),
            entries_paused: AtomicBool::new(false),
        }
    }

    /// Whether new entries are currently refused (fast path).
    pub fn is_paused(&self) -> bool {
        self.entries_paused.load(Ordering::SeqCst)
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> ConsecutiveLossState {
        self.state.read().await.clone()
    }

    /// Record a closed trade and return the new state.
    ///
    /// A win after a losing run resets the streak and clears both the
    /// warning and the pause. A loss extends or starts a losing run; once
    /// the run reaches the warning length the pause latches.
    pub async fn record_result(&self, ticker: &str, is_win: bool) -> ConsecutiveLossState {
        let mut state = self.state.write().await;
        let now = Utc::now();

        if is_win {
            if state.current_streak < 0 {
                // Sign flip: the losing run is over
                state.current_streak = 1;
                state.streak_tickers = vec![ticker.to_string()];
                if state.warning_active || state.entries_paused {
                    info!(
                        ticker = %ticker,
                        "win ended the losing run, clearing warning and entry pause"
                    );
                }
                state.warning_active = false;
                state.entries_paused = false;
                self.entries_paused.store(false, Ordering::SeqCst);
            } else {
                state.current_streak += 1;
                state.streak_tickers.push(ticker.to_string());
            }
        } else if state.current_streak > 0 {
            // Sign flip: the winning run is over
            state.current_streak = -1;
            state.streak_tickers = vec![ticker.to_string()];
        } else {
            state.current_streak -= 1;
            state.streak_tickers.push(ticker.to_string());

            let run_length = state.current_streak.unsigned_abs();
            if run_length >= self.constants.consecutive_loss_warning && !state.entries_paused {
                state.warning_active = true;
                state.entries_paused = true;
                state.paused_at = Some(now);
                self.entries_paused.store(true, Ordering::SeqCst);
                warn!(
                    consecutive_losses = run_length,
                    threshold = self.constants.consecutive_loss_warning,
                    "losing run reached the warning length, pausing new entries"
                );
            }
        }

        state.last_result_date = Some(now);
        state.clone()
    }

    /// Lift the entry pause after a human decision.
    ///
    /// A logged no-op when not paused. Lifting the pause does not clear the
    /// warning or reset the streak; only a subsequent win does that.
    pub async fn resume_after_human_decision(&self, approved_by: &str) -> ConsecutiveLossState {
        let mut state = self.state.write().await;

        if !state.entries_paused {
            info!(
                approved_by = %approved_by,
                "resume requested but entries are not paused, nothing to do"
            );
            return state.clone();
        }

        state.entries_paused = false;
        state.resumed_by = Some(approved_by.to_string());
        state.resumed_at = Some(Utc::now());
        self.entries_paused.store(false, Ordering::SeqCst);

        info!(
            approved_by = %approved_by,
            current_streak = state.current_streak,
            "entry pause lifted by human decision, warning stays active"
        );
        state.clone()
    }
}
