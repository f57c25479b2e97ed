//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use risk_core::config::CoreConfig;
use risk_core::constants::RiskConstants;
use risk_core::market::{MarketDataFeed, StaticMarketFeed};
use risk_core::orders::PaperOrderBook;
use risk_core::portfolio::{portfolio_source_from_config, PortfolioSource};
use risk_governance::{
    CircuitBreaker, ConsecutiveLossTracker, EmergencyShutdownManager, RiskEvaluator,
    StressTestEngine,
};

/// Shared application state.
///
/// Every stateful risk component is constructed exactly once here and
/// shared by reference; there are no ambient globals. Which collaborator
/// implementations back the capability traits is decided at startup from
/// the configuration and never branched on again.
pub struct AppState {
    /// Core configuration, read once at startup.
    pub config: CoreConfig,
    /// Immutable threshold bag.
    pub constants: Arc<RiskConstants>,
    /// Consecutive-loss streak machine.
    pub tracker: Arc<ConsecutiveLossTracker>,
    /// Market-regime circuit breaker.
    pub breaker: Arc<CircuitBreaker>,
    /// Crash-scenario battery.
    pub stress: StressTestEngine,
    /// Pre-trade verdict composer.
    pub evaluator: RiskEvaluator,
    /// Emergency halt/resume lifecycle.
    pub shutdown: Arc<EmergencyShutdownManager>,
    /// Portfolio snapshot collaborator.
    pub portfolio: Arc<dyn PortfolioSource>,
    /// Market drawdown collaborator feeding the regime monitor.
    pub market_feed: Arc<StaticMarketFeed>,
    /// In-process paper order book, doubles as the cancellation collaborator.
    pub order_book: Arc<PaperOrderBook>,
}

impl AppState {
    /// Wire up all components from configuration.
    pub fn new(config: CoreConfig) -> anyhow::Result<Self> {
        let constants = Arc::new(RiskConstants::from_env());
        let tracker = Arc::new(ConsecutiveLossTracker::new(constants.clone()));
        let breaker = Arc::new(CircuitBreaker::new(constants.clone()));
        let stress = StressTestEngine::new(constants.clone());
        let portfolio = portfolio_source_from_config(&config)?;
        let market_feed = Arc::new(StaticMarketFeed::flat());

        let order_book = Arc::new(PaperOrderBook::new());
        let shutdown = Arc::new(EmergencyShutdownManager::new(
            order_book.clone(),
            Duration::from_secs(config.cancel_timeout_secs),
        ));

        let evaluator = RiskEvaluator::new(
            constants.clone(),
            tracker.clone(),
            breaker.clone(),
            portfolio.clone(),
        );

        Ok(Self {
            config,
            constants,
            tracker,
            breaker,
            stress,
            evaluator,
            shutdown,
            portfolio,
            market_feed,
            order_book,
        })
    }

    /// The regime feed as the capability trait object.
    pub fn market_feed_dyn(&self) -> Arc<dyn MarketDataFeed> {
        self.market_feed.clone()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use risk_core::config::PortfolioBackend;
    use risk_core::types::TradingMode;

    pub(crate) fn test_state() -> Arc<AppState> {
        let config = CoreConfig {
            trading_mode: TradingMode::Paper,
            portfolio_backend: PortfolioBackend::Memory,
            portfolio_snapshot_path: None,
            cancel_timeout_secs: 1,
            regime_poll_secs: 1,
        };
        Arc::new(AppState::new(config).unwrap())
    }

    #[tokio::test]
    async fn test_state_wires_one_instance_of_everything() {
        let state = test_state();
        assert!(!state.tracker.is_paused());
        assert!(!state.breaker.is_defensive());
        assert!(!state.shutdown.is_shutdown());
        assert_eq!(state.order_book.open_count(), 0);
    }
}
