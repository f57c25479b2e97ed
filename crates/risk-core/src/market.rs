//! Market-regime feed access.
//!
//! The circuit breaker never talks to a market-data vendor directly; it
//! reads the current reference-index drawdown through the `MarketDataFeed`
//! capability. Which implementation backs it is wired once at startup.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::Result;

/// Supplies the broad-market drawdown the regime classifier runs on.
#[async_trait]
pub trait MarketDataFeed: Send + Sync {
    /// Current reference-index drop from its recent peak, as a fraction
    /// (0.05 = 5% down). Negative values mean the index is above its peak.
    async fn index_drawdown(&self) -> Result<Decimal>;
}

/// Feed with an externally settable drawdown figure.
///
/// Backs paper deployments and tests; a host wiring in a real vendor feed
/// keeps this as the fallback when the vendor is unreachable.
pub struct StaticMarketFeed {
    drawdown: RwLock<Decimal>,
}

impl StaticMarketFeed {
    pub fn new(drawdown: Decimal) -> Self {
        Self {
            drawdown: RwLock::new(drawdown),
        }
    }

    pub fn flat() -> Self {
        Self::new(Decimal::ZERO)
    }

    /// Overwrite the reported drawdown.
    pub async fn set_drawdown(&self, drawdown: Decimal) {
        let mut current = self.drawdown.write().await;
        *current = drawdown;
    }
}

impl Default for StaticMarketFeed {
    fn default() -> Self {
        Self::flat()
    }
}

#[async_trait]
impl MarketDataFeed for StaticMarketFeed {
    async fn index_drawdown(&self) -> Result<Decimal> {
        Ok(*self.drawdown.read().await)
    }
}
