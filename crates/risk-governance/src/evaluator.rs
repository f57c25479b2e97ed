//! Pre-trade risk evaluation.
//!
//! One entry point composes the tracker, the circuit breaker, the stress
//! battery, and the slippage model into a single verdict. Business-rule
//! blocks are verdict outcomes, never errors; only collaborator failures
//! propagate as `Err`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

use risk_core::constants::RiskConstants;
use risk_core::portfolio::PortfolioSource;
use risk_core::slippage::SlippageModel;
use risk_core::types::Sector;
use risk_core::Result;

use crate::circuit_breaker::CircuitBreaker;
use crate::consecutive_loss::ConsecutiveLossTracker;
use crate::stress_test::StressTestEngine;

/// A proposed trade to evaluate.
///
/// Portfolio value and cash are resolved from the portfolio source, not
/// supplied by the caller. Order context is optional; without it no
/// slippage figure is attached.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RiskCheck {
    pub ticker: String,
    /// Proposed position as a fraction of portfolio value.
    pub proposed_position_pct: Decimal,
    /// Upstream model-disagreement fraction, when known.
    pub model_disagreement: Option<Decimal>,
    pub order_quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub avg_daily_volume: Option<Decimal>,
}

/// Why a verdict blocked, clamped, or warned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum RiskReason {
    /// Entries are paused by the consecutive-loss tracker. Hard block.
    EntriesPaused { consecutive_losses: u32 },
    /// Proposal exceeds the per-trade risk budget outright. Hard block.
    RiskBudgetExceeded {
        proposed_pct: Decimal,
        max_pct: Decimal,
    },
    /// Proposal clamped down to the position-size cap.
    ClampedToPositionCap {
        proposed_pct: Decimal,
        cap_pct: Decimal,
    },
    /// The trade would breach the minimum cash reserve. Hard block.
    CashReserveBreached {
        cash_after: Decimal,
        required: Decimal,
    },
    /// Too many positions already in the ticker's correlation bucket. Hard block.
    CorrelationLimitReached {
        sector: Sector,
        held: usize,
        max: usize,
    },
    /// Defensive regime reduced the adjusted size.
    DefensiveRegime {
        reduction: Decimal,
        cash_target: Decimal,
    },
    /// Upstream models disagree beyond the threshold. Informational.
    HighModelDisagreement {
        disagreement: Decimal,
        threshold: Decimal,
    },
    /// The current book fails a stress scenario. Informational.
    StressScenarioFailed {
        scenario: String,
        projected_loss: Decimal,
    },
}

/// Outcome of a pre-trade evaluation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Verdict {
    pub allowed: bool,
    pub reasons: Vec<RiskReason>,
    /// Size the trade may proceed at; zero when blocked.
    pub adjusted_size_pct: Decimal,
    /// Estimated execution cost, when order context was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_slippage: Option<Decimal>,
    pub evaluated_at: DateTime<Utc>,
}

impl Verdict {
    fn blocked(reasons: Vec<RiskReason>) -> Self {
        Self {
            allowed: false,
            reasons,
            adjusted_size_pct: Decimal::ZERO,
            estimated_slippage: None,
            evaluated_at: Utc::now(),
        }
    }
}

/// Composes the risk components into one pass/fail/adjust decision.
pub struct RiskEvaluator {
    constants: Arc<RiskConstants>,
    tracker: Arc<ConsecutiveLossTracker>,
    breaker: Arc<CircuitBreaker>,
    stress: StressTestEngine,
    slippage: SlippageModel,
    portfolio: Arc<dyn PortfolioSource>,
}

impl RiskEvaluator {
    pub fn new(
        constants: Arc<RiskConstants>,
        tracker: Arc<ConsecutiveLossTracker>,
        breaker: Arc<CircuitBreaker>,
        portfolio: Arc<dyn PortfolioSource>,
    ) -> Self {
        Self {
            stress: StressTestEngine::new(constants.clone()),
            slippage: SlippageModel::new(constants.clone()),
            constants,
            tracker,
            breaker,
            portfolio,
        }
    }

    /// Evaluate a proposed trade.
    ///
    /// Checks run in a fixed order, short-circuiting on the first hard
    /// failure while accumulating soft reasons. `Err` means a collaborator
    /// failed, never a business rule.
    pub async fn evaluate(&self, check: &RiskCheck) -> Result<Verdict> {
        let mut reasons = Vec::new();

        // 1. Entry pause
        if self.tracker.is_paused() {
            let state = self.tracker.state().await;
            return Ok(Verdict::blocked(vec![RiskReason::EntriesPaused {
                consecutive_losses: state.current_streak.unsigned_abs(),
            }]));
        }

        let snapshot = self.portfolio.snapshot().await?;

        // 2a. Per-trade risk budget: worst-case loss proxy is the position
        // taking the full circuit-breaker index drop in one session
        let risk_bound =
            self.constants.risk_per_trade_pct / self.constants.circuit_breaker_index_drop;
        if check.proposed_position_pct > risk_bound {
            reasons.push(RiskReason::RiskBudgetExceeded {
                proposed_pct: check.proposed_position_pct,
                max_pct: risk_bound,
            });
            return Ok(Verdict::blocked(reasons));
        }

        // 2b. Position-size cap clamps rather than blocks
        let mut adjusted = check.proposed_position_pct;
        if adjusted > self.constants.max_position_pct {
            reasons.push(RiskReason::ClampedToPositionCap {
                proposed_pct: adjusted,
                cap_pct: self.constants.max_position_pct,
            });
            adjusted = self.constants.max_position_pct;
        }

        // 3. Minimum cash reserve after the adjusted trade
        let cash_after = snapshot.cash_balance - adjusted * snapshot.portfolio_value;
        let required = snapshot.portfolio_value * self.constants.min_cash_reserve_pct;
        if cash_after < required {
            reasons.push(RiskReason::CashReserveBreached {
                cash_after: cash_after.round_dp(2),
                required: required.round_dp(2),
            });
            return Ok(Verdict::blocked(reasons));
        }

        // 4. Correlation-bucket count; an unheld ticker forms its own bucket
        if let Some(sector) = snapshot.sector_of(&check.ticker) {
            let held = snapshot.positions_in_sector(sector);
            if held >= self.constants.max_correlated_positions {
                reasons.push(RiskReason::CorrelationLimitReached {
                    sector,
                    held,
                    max: self.constants.max_correlated_positions,
                });
                return Ok(Verdict::blocked(reasons));
            }
        }

        // 5. Defensive regime halves the adjusted size
        if self.breaker.is_defensive() {
            adjusted *= Decimal::ONE - self.constants.defensive_position_reduction;
            reasons.push(RiskReason::DefensiveRegime {
                reduction: self.constants.defensive_position_reduction,
                cash_target: self.constants.defensive_cash_target,
            });
        }

        // 6. Model disagreement is informational only
        if let Some(disagreement) = check.model_disagreement {
            if disagreement > self.constants.high_model_disagreement {
                reasons.push(RiskReason::HighModelDisagreement {
                    disagreement,
                    threshold: self.constants.high_model_disagreement,
                });
            }
        }

        // Failing stress scenarios for the current book, informational
        for result in self.stress.run(&snapshot) {
            if !result.passed {
                reasons.push(RiskReason::StressScenarioFailed {
                    scenario: result.scenario,
                    projected_loss: result.projected_loss,
                });
            }
        }

        let estimated_slippage = match (check.order_quantity, check.price, check.avg_daily_volume)
        {
            (Some(quantity), Some(price), Some(adv)) => {
                Some(self.slippage.estimate(quantity, price, adv))
            }
            _ => None,
        };

        debug!(
            ticker = %check.ticker,
            proposed_pct = %check.proposed_position_pct,
            adjusted_pct = %adjusted,
            reasons = reasons.len(),
            "trade proposal evaluated"
        );

        Ok(Verdict {
            allowed: true,
            reasons,
            adjusted_size_pct: adjusted,
            estimated_slippage,
            evaluated_at: Utc::now(),
        })
    }
}
