//! Configuration for the risk-governance service.
//!
//! Everything is environment-driven and read once at startup. The trading
//! mode is the one setting that refuses to default: an unset or invalid
//! `TRADING_MODE` must abort the process before any trading-relevant
//! traffic is served.

use std::env;

use crate::types::TradingMode;
use crate::{Error, Result};

/// Which portfolio backing store serves snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortfolioBackend {
    /// In-process store, seeded and updated by the host application.
    Memory,
    /// JSON snapshot file exported by the portfolio pipeline.
    SnapshotFile,
}

/// Core service configuration.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub trading_mode: TradingMode,
    pub portfolio_backend: PortfolioBackend,
    /// Required when `portfolio_backend` is `SnapshotFile`.
    pub portfolio_snapshot_path: Option<String>,
    /// Upper bound on one order-cancellation collaborator call.
    pub cancel_timeout_secs: u64,
    /// How often the regime monitor polls the market feed.
    pub regime_poll_secs: u64,
}

impl CoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let trading_mode = env::var("TRADING_MODE")
            .map_err(|_| Error::Config {
                message: "TRADING_MODE environment variable not set (expected 'paper' or 'live')"
                    .to_string(),
            })?
            .parse::<TradingMode>()?;

        let portfolio_backend = match env::var("PORTFOLIO_SOURCE") {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "memory" => PortfolioBackend::Memory,
                "file" => PortfolioBackend::SnapshotFile,
                other => {
                    return Err(Error::Config {
                        message: format!(
                            "unknown PORTFOLIO_SOURCE '{other}' (expected 'memory' or 'file')"
                        ),
                    })
                }
            },
            Err(_) => PortfolioBackend::Memory,
        };

        let portfolio_snapshot_path = env::var("PORTFOLIO_SNAPSHOT_PATH").ok();
        if portfolio_backend == PortfolioBackend::SnapshotFile
            && portfolio_snapshot_path.is_none()
        {
            return Err(Error::Config {
                message: "PORTFOLIO_SNAPSHOT_PATH must be set when PORTFOLIO_SOURCE=file"
                    .to_string(),
            });
        }

        Ok(Self {
            trading_mode,
            portfolio_backend,
            portfolio_snapshot_path,
            cancel_timeout_secs: env::var("CANCEL_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            regime_poll_secs: env::var("REGIME_POLL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
        })
    }

    /// Configuration for testing (paper mode, in-memory portfolio).
    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            trading_mode: TradingMode::Paper,
            portfolio_backend: PortfolioBackend::Memory,
            portfolio_snapshot_path: None,
            cancel_timeout_secs: 1,
            regime_poll_secs: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_config_is_paper() {
        let config = CoreConfig::test_config();
        assert_eq!(config.trading_mode, TradingMode::Paper);
        assert_eq!(config.portfolio_backend, PortfolioBackend::Memory);
        assert!(config.portfolio_snapshot_path.is_none());
    }
}
