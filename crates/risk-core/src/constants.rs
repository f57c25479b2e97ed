//! Fixed risk thresholds.
//!
//! The bag is read once at startup (environment overrides included) and is
//! immutable for the life of the process. Changing a threshold means a
//! redeploy; there is no API write path.

use rust_decimal::Decimal;
use serde::Serialize;
use std::env;
use utoipa::ToSchema;

/// Named numeric thresholds governing every risk decision.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RiskConstants {
    /// Version tag reported by the read-only constants endpoint.
    pub version: String,
    /// Largest single position as a fraction of portfolio value.
    pub max_position_pct: Decimal,
    /// Worst-case loss budget for one trade as a fraction of portfolio value.
    pub risk_per_trade_pct: Decimal,
    /// Cash floor that must survive any new entry.
    pub min_cash_reserve_pct: Decimal,
    /// Same-bucket positions allowed before a new entry is refused.
    pub max_correlated_positions: usize,
    /// Pairwise correlation above which two positions count as one bucket.
    pub correlation_threshold: Decimal,
    /// Tolerable stress-scenario loss as a fraction of portfolio value.
    pub stress_correlation_threshold: Decimal,
    /// Reference-index drop that flips the regime to defensive.
    pub circuit_breaker_index_drop: Decimal,
    /// Position-size reduction recommended in a defensive regime.
    pub defensive_position_reduction: Decimal,
    /// Target cash allocation in a defensive regime.
    pub defensive_cash_target: Decimal,
    /// Upstream model-disagreement fraction that flags a warning.
    pub high_model_disagreement: Decimal,
    /// Order size as a fraction of ADV below which slippage is negligible.
    pub slippage_adv_threshold: Decimal,
    /// Slippage cost per one threshold-unit of ADV consumed.
    pub slippage_per_adv_pct: Decimal,
    /// Losing-streak length that pauses new entries.
    pub consecutive_loss_warning: u32,
}

impl Default for RiskConstants {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            max_position_pct: Decimal::new(20, 2), // 20% of portfolio per name
            risk_per_trade_pct: Decimal::new(2, 2), // 2% worst-case loss per trade
            min_cash_reserve_pct: Decimal::new(10, 2), // keep 10% in cash
            max_correlated_positions: 3,
            correlation_threshold: Decimal::new(70, 2), // 0.70 pairwise correlation
            stress_correlation_threshold: Decimal::new(25, 2), // survive losing 25% of the book
            circuit_breaker_index_drop: Decimal::new(5, 2), // 5% index drop
            defensive_position_reduction: Decimal::new(50, 2), // halve new positions
            defensive_cash_target: Decimal::new(40, 2), // 40% cash when defensive
            high_model_disagreement: Decimal::new(30, 2), // 30% disagreement
            slippage_adv_threshold: Decimal::new(1, 2), // orders under 1% of ADV are free
            slippage_per_adv_pct: Decimal::new(1, 3), // 0.1% of notional per 1% of ADV
            consecutive_loss_warning: 7,
        }
    }
}

impl RiskConstants {
    /// Defaults with startup-time environment overrides applied.
    pub fn from_env() -> Self {
        let mut constants = Self::default();
        if let Some(v) = decimal_var("RISK_MAX_POSITION_PCT") {
            constants.max_position_pct = v;
        }
        if let Some(v) = decimal_var("RISK_PER_TRADE_PCT") {
            constants.risk_per_trade_pct = v;
        }
        if let Some(v) = decimal_var("RISK_MIN_CASH_RESERVE_PCT") {
            constants.min_cash_reserve_pct = v;
        }
        if let Some(v) = parsed_var::<usize>("RISK_MAX_CORRELATED_POSITIONS") {
            constants.max_correlated_positions = v;
        }
        if let Some(v) = decimal_var("RISK_CORRELATION_THRESHOLD") {
            constants.correlation_threshold = v;
        }
        if let Some(v) = decimal_var("RISK_STRESS_CORRELATION_THRESHOLD") {
            constants.stress_correlation_threshold = v;
        }
        if let Some(v) = decimal_var("RISK_CIRCUIT_BREAKER_INDEX_DROP") {
            constants.circuit_breaker_index_drop = v;
        }
        if let Some(v) = decimal_var("RISK_DEFENSIVE_POSITION_REDUCTION") {
            constants.defensive_position_reduction = v;
        }
        if let Some(v) = decimal_var("RISK_DEFENSIVE_CASH_TARGET") {
            constants.defensive_cash_target = v;
        }
        if let Some(v) = decimal_var("RISK_HIGH_MODEL_DISAGREEMENT") {
            constants.high_model_disagreement = v;
        }
        if let Some(v) = decimal_var("RISK_SLIPPAGE_ADV_THRESHOLD") {
            constants.slippage_adv_threshold = v;
        }
        if let Some(v) = decimal_var("RISK_SLIPPAGE_PER_ADV_PCT") {
            constants.slippage_per_adv_pct = v;
        }
        if let Some(v) = parsed_var::<u32>("RISK_CONSECUTIVE_LOSS_WARNING") {
            constants.consecutive_loss_warning = v;
        }
        constants
    }
}

fn decimal_var(key: &str) -> Option<Decimal> {
    parsed_var::<Decimal>(key)
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let constants = RiskConstants::default();

        assert_eq!(constants.max_position_pct, Decimal::new(20, 2));
        assert_eq!(constants.risk_per_trade_pct, Decimal::new(2, 2));
        assert_eq!(constants.min_cash_reserve_pct, Decimal::new(10, 2));
        assert_eq!(constants.max_correlated_positions, 3);
        assert_eq!(constants.correlation_threshold, Decimal::new(70, 2));
        assert_eq!(constants.stress_correlation_threshold, Decimal::new(25, 2));
        assert_eq!(constants.circuit_breaker_index_drop, Decimal::new(5, 2));
        assert_eq!(
            constants.defensive_position_reduction,
            Decimal::new(50, 2)
        );
        assert_eq!(constants.defensive_cash_target, Decimal::new(40, 2));
        assert_eq!(constants.high_model_disagreement, Decimal::new(30, 2));
        assert_eq!(constants.slippage_adv_threshold, Decimal::new(1, 2));
        assert_eq!(constants.slippage_per_adv_pct, Decimal::new(1, 3));
        assert_eq!(constants.consecutive_loss_warning, 7);
    }

    #[test]
    fn test_constants_serialize_with_version() {
        let constants = RiskConstants::default();
        let json = serde_json::to_value(&constants).unwrap();

        assert_eq!(json["version"], "1.0");
        assert_eq!(json["max_correlated_positions"], 3);
        // Decimals serialize as numeric strings
        assert_eq!(json["max_position_pct"], "0.20");
    }
}
