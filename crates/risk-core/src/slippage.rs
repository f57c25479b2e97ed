//! Liquidity-aware execution-cost model.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::warn;

use crate::constants::RiskConstants;

/// Estimates the dollar cost of demanding liquidity: orders consuming more
/// than a threshold fraction of average daily volume pay linearly for it.
#[derive(Debug, Clone)]
pub struct SlippageModel {
    constants: Arc<RiskConstants>,
}

impl SlippageModel {
    pub fn new(constants: Arc<RiskConstants>) -> Self {
        Self { constants }
    }

    /// Estimated slippage in dollars, rounded to cents. Never negative.
    ///
    /// A non-positive ADV is a data-quality problem, not an error: the
    /// estimate degrades to zero and the gap is logged.
    pub fn estimate(
        &self,
        order_quantity: Decimal,
        price: Decimal,
        avg_daily_volume: Decimal,
    ) -> Decimal {
        if avg_daily_volume <= Decimal::ZERO {
            warn!(
                order_quantity = %order_quantity,
                avg_daily_volume = %avg_daily_volume,
                "cannot estimate slippage without positive average daily volume"
            );
            return Decimal::ZERO;
        }

        let adv_fraction = order_quantity / avg_daily_volume;
        if adv_fraction <= self.constants.slippage_adv_threshold {
            // Small orders are assumed frictionless
            return Decimal::ZERO;
        }

        let slippage_pct = adv_fraction
            * (self.constants.slippage_per_adv_pct / self.constants.slippage_adv_threshold);
        (order_quantity * price * slippage_pct).round_dp(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> SlippageModel {
        SlippageModel::new(Arc::new(RiskConstants::default()))
    }

    #[test]
    fn test_small_order_is_frictionless() {
        // 500 / 100_000 = 0.5% of ADV, under the 1% threshold
        let estimate = model().estimate(
            Decimal::new(500, 0),
            Decimal::new(50, 0),
            Decimal::new(100_000, 0),
        );
        assert_eq!(estimate, Decimal::ZERO);
    }

    #[test]
    fn test_large_order_pays_linearly() {
        // 2000 / 100_000 = 2% of ADV -> slippage_pct = 0.02 * 0.1 = 0.002
        // dollars = 2000 * 100 * 0.002 = 400.00
        let estimate = model().estimate(
            Decimal::new(2000, 0),
            Decimal::new(100, 0),
            Decimal::new(100_000, 0),
        );
        assert_eq!(estimate, Decimal::new(40_000, 2));
    }

    #[test]
    fn test_threshold_boundary_is_free() {
        // Exactly 1% of ADV still counts as small
        let estimate = model().estimate(
            Decimal::new(1000, 0),
            Decimal::new(100, 0),
            Decimal::new(100_000, 0),
        );
        assert_eq!(estimate, Decimal::ZERO);
    }

    #[test]
    fn test_zero_adv_degrades_to_zero() {
        let estimate = model().estimate(
            Decimal::new(2000, 0),
            Decimal::new(100, 0),
            Decimal::ZERO,
        );
        assert_eq!(estimate, Decimal::ZERO);

        let estimate = model().estimate(
            Decimal::new(2000, 0),
            Decimal::new(100, 0),
            Decimal::new(-1, 0),
        );
        assert_eq!(estimate, Decimal::ZERO);
    }

    #[test]
    fn test_estimate_rounds_to_cents() {
        // 1111 / 100_000 = 1.111% -> slippage_pct = 0.001111
        // dollars = 1111 * 3.33 * 0.001111 = 4.11028... -> 4.11
        let estimate = model().estimate(
            Decimal::new(1111, 0),
            Decimal::new(333, 2),
            Decimal::new(100_000, 0),
        );
        assert_eq!(estimate, Decimal::new(411, 2));
    }
}
