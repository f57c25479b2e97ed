//! Market-regime circuit breaker.
//!
//! Classifies the market as normal or defensive from a broad-market
//! drawdown signal. In a defensive regime downstream sizing must honor the
//! recommended position reduction and cash target.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use utoipa::ToSchema;

use risk_core::constants::RiskConstants;

/// Market regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MarketRegime {
    Normal,
    Defensive,
}

impl MarketRegime {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketRegime::Normal => "normal",
            MarketRegime::Defensive => "defensive",
        }
    }
}

/// Current regime classification with the sizing guidance it implies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CircuitBreakerState {
    pub regime: MarketRegime,
    /// Reference-index drop the classification was computed from.
    pub index_drawdown: Decimal,
    /// Index drop at or above which the regime flips defensive.
    pub trip_threshold: Decimal,
    /// Recommended position-size reduction, defensive regime only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_reduction: Option<Decimal>,
    /// Target cash allocation, defensive regime only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_target: Option<Decimal>,
    pub evaluated_at: DateTime<Utc>,
}

/// Regime monitor. Read-mostly; the state changes only when `recompute` is
/// called with a fresh drawdown figure from the market feed.
pub struct CircuitBreaker {
    constants: Arc<RiskConstants>,
    state: RwLock<CircuitBreakerState>,
    /// Fast path flag for the evaluator's sizing clamp.
    is_defensive: AtomicBool,
}

impl CircuitBreaker {
    /// Start in the normal regime with a flat drawdown.
    pub fn new(constants: Arc<RiskConstants>) -> Self {
        let initial = CircuitBreakerState {
            regime: MarketRegime::Normal,
            index_drawdown: Decimal::ZERO,
            trip_threshold: constants.circuit_breaker_index_drop,
            position_reduction: None,
            cash_target: None,
            evaluated_at: Utc::now(),
        };
        Self {
            constants,
            state: RwLock::new(initial),
            is_defensive: AtomicBool::new(false),
        }
    }

    /// Whether the regime is currently defensive (fast path).
    pub fn is_defensive(&self) -> bool {
        self.is_defensive.load(Ordering::SeqCst)
    }

    /// Snapshot of the current classification.
    pub async fn state(&self) -> CircuitBreakerState {
        self.state.read().await.clone()
    }

    /// Reclassify against a fresh index drawdown and return the new state.
    pub async fn recompute(&self, index_drawdown: Decimal) -> CircuitBreakerState {
        let mut state = self.state.write().await;
        let was_defensive = state.regime == MarketRegime::Defensive;
        let defensive = index_drawdown >= self.constants.circuit_breaker_index_drop;

        if defensive {
            state.regime = MarketRegime::Defensive;
            state.position_reduction = Some(self.constants.defensive_position_reduction);
            state.cash_target = Some(self.constants.defensive_cash_target);
        } else {
            state.regime = MarketRegime::Normal;
            state.position_reduction = None;
            state.cash_target = None;
        }
        state.index_drawdown = index_drawdown;
        state.evaluated_at = Utc::now();
        self.is_defensive.store(defensive, Ordering::SeqCst);

        if defensive && !was_defensive {
            warn!(
                index_drawdown = %index_drawdown,
                threshold = %self.constants.circuit_breaker_index_drop,
                "index drawdown tripped the circuit breaker, regime is defensive"
            );
        } else if !defensive && was_defensive {
            info!(
                index_drawdown = %index_drawdown,
                "index recovered, regime back to normal"
            );
        }

        state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(Arc::new(RiskConstants::default()))
    }

    #[tokio::test]
    async fn test_starts_normal() {
        let breaker = breaker();
        assert!(!breaker.is_defensive());

        let state = breaker.state().await;
        assert_eq!(state.regime, MarketRegime::Normal);
        assert!(state.position_reduction.is_none());
        assert!(state.cash_target.is_none());
    }

    #[tokio::test]
    async fn test_trips_at_exact_threshold() {
        let breaker = breaker();

        // 4.99% stays normal
        let state = breaker.recompute(Decimal::new(499, 4)).await;
        assert_eq!(state.regime, MarketRegime::Normal);
        assert!(!breaker.is_defensive());

        // Exactly 5% trips
        let state = breaker.recompute(Decimal::new(5, 2)).await;
        assert_eq!(state.regime, MarketRegime::Defensive);
        assert!(breaker.is_defensive());
        assert_eq!(state.position_reduction, Some(Decimal::new(50, 2)));
        assert_eq!(state.cash_target, Some(Decimal::new(40, 2)));
    }

    #[tokio::test]
    async fn test_recovers_when_drawdown_fades() {
        let breaker = breaker();
        breaker.recompute(Decimal::new(8, 2)).await;
        assert!(breaker.is_defensive());

        let state = breaker.recompute(Decimal::new(2, 2)).await;
        assert_eq!(state.regime, MarketRegime::Normal);
        assert!(!breaker.is_defensive());
        assert!(state.position_reduction.is_none());
    }

    #[tokio::test]
    async fn test_negative_drawdown_is_normal() {
        let breaker = breaker();
        // Index above its peak
        let state = breaker.recompute(Decimal::new(-3, 2)).await;
        assert_eq!(state.regime, MarketRegime::Normal);
    }
}
