//! Background regime monitor.
//!
//! Polls the market-data collaborator at a fixed interval and recomputes
//! the circuit breaker from the fresh drawdown figure. A feed failure skips
//! the cycle; the breaker keeps its last classification.

use std::sync::Arc;
use tokio::time;
use tracing::{debug, info, warn};

use risk_core::market::MarketDataFeed;
use risk_governance::CircuitBreaker;

/// Spawn the regime-monitor loop.
pub fn spawn_regime_monitor(
    breaker: Arc<CircuitBreaker>,
    feed: Arc<dyn MarketDataFeed>,
    poll_secs: u64,
) {
    tokio::spawn(async move {
        info!(poll_secs, "regime monitor started");
        let mut interval = time::interval(time::Duration::from_secs(poll_secs));
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match feed.index_drawdown().await {
                Ok(drawdown) => {
                    let state = breaker.recompute(drawdown).await;
                    debug!(
                        index_drawdown = %drawdown,
                        regime = state.regime.as_str(),
                        "regime recomputed"
                    );
                }
                Err(e) => {
                    warn!(error = %e, "market feed unavailable, keeping last regime");
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_core::constants::RiskConstants;
    use risk_core::market::StaticMarketFeed;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_monitor_recomputes_from_the_feed() {
        let constants = Arc::new(RiskConstants::default());
        let breaker = Arc::new(CircuitBreaker::new(constants));
        let feed = Arc::new(StaticMarketFeed::flat());
        feed.set_drawdown(Decimal::new(6, 2)).await;

        spawn_regime_monitor(breaker.clone(), feed, 1);

        // First tick fires immediately
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert!(breaker.is_defensive());
    }
}
