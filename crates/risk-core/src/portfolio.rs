//! Portfolio snapshot access.
//!
//! The risk core never reads a database. It sees the book through the
//! `PortfolioSource` capability, and which implementation backs it is
//! decided exactly once, at startup. Core logic stays oblivious.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::{CoreConfig, PortfolioBackend};
use crate::types::{PortfolioPosition, PortfolioSnapshot};
use crate::{Error, Result};

/// Supplies the current portfolio snapshot: positions, total value, cash.
#[async_trait]
pub trait PortfolioSource: Send + Sync {
    async fn snapshot(&self) -> Result<PortfolioSnapshot>;
}

/// In-process store, replaced wholesale by whoever owns position keeping.
pub struct InMemoryPortfolioSource {
    inner: RwLock<PortfolioSnapshot>,
}

impl InMemoryPortfolioSource {
    pub fn new(positions: Vec<PortfolioPosition>, cash_balance: Decimal) -> Self {
        Self {
            inner: RwLock::new(PortfolioSnapshot::new(positions, cash_balance)),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Decimal::ZERO)
    }

    /// Swap in a new book state, stamped now.
    pub async fn replace(&self, positions: Vec<PortfolioPosition>, cash_balance: Decimal) {
        let mut inner = self.inner.write().await;
        *inner = PortfolioSnapshot::new(positions, cash_balance);
    }
}

#[async_trait]
impl PortfolioSource for InMemoryPortfolioSource {
    async fn snapshot(&self) -> Result<PortfolioSnapshot> {
        Ok(self.inner.read().await.clone())
    }
}

/// On-disk layout of an exported snapshot. The total is derived on load,
/// never trusted from the file.
#[derive(Debug, Deserialize)]
struct SnapshotFile {
    positions: Vec<PortfolioPosition>,
    cash_balance: Decimal,
    #[serde(default)]
    as_of: Option<DateTime<Utc>>,
}

/// Reads the snapshot file the portfolio pipeline exports. Each call
/// re-reads the file, so a refreshed export is picked up immediately.
pub struct SnapshotFilePortfolioSource {
    path: PathBuf,
}

impl SnapshotFilePortfolioSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl PortfolioSource for SnapshotFilePortfolioSource {
    async fn snapshot(&self) -> Result<PortfolioSnapshot> {
        let bytes = tokio::fs::read(&self.path).await?;
        let file: SnapshotFile = serde_json::from_slice(&bytes)?;
        let as_of = file.as_of.unwrap_or_else(Utc::now);
        Ok(PortfolioSnapshot::as_of(
            file.positions,
            file.cash_balance,
            as_of,
        ))
    }
}

/// Build the portfolio source the configuration names.
pub fn portfolio_source_from_config(config: &CoreConfig) -> Result<Arc<dyn PortfolioSource>> {
    match config.portfolio_backend {
        PortfolioBackend::Memory => Ok(Arc::new(InMemoryPortfolioSource::empty())),
        PortfolioBackend::SnapshotFile => {
            let path = config.portfolio_snapshot_path.as_ref().ok_or_else(|| {
                Error::Config {
                    message: "portfolio snapshot path missing for file backend".to_string(),
                }
            })?;
            Ok(Arc::new(SnapshotFilePortfolioSource::new(path)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sector;
    use tokio_test::assert_ok;

    fn tech_position(ticker: &str, value: i64) -> PortfolioPosition {
        PortfolioPosition {
            ticker: ticker.to_string(),
            sector: Sector::Technology,
            current_value: Decimal::new(value, 0),
        }
    }

    #[tokio::test]
    async fn test_in_memory_source_replace() {
        let source = InMemoryPortfolioSource::empty();
        let snapshot = assert_ok!(source.snapshot().await);
        assert!(snapshot.positions.is_empty());
        assert_eq!(snapshot.portfolio_value, Decimal::ZERO);

        source
            .replace(
                vec![tech_position("AAPL", 25_000)],
                Decimal::new(75_000, 0),
            )
            .await;

        let snapshot = assert_ok!(source.snapshot().await);
        assert_eq!(snapshot.positions.len(), 1);
        assert_eq!(snapshot.portfolio_value, Decimal::new(100_000, 0));
        assert_eq!(snapshot.cash_balance, Decimal::new(75_000, 0));
    }

    #[tokio::test]
    async fn test_snapshot_file_source_reads_export() {
        let path = std::env::temp_dir().join("riskgate_snapshot_test.json");
        let body = r#"{
            "positions": [
                {"ticker": "NVDA", "sector": "technology", "current_value": "30000"},
                {"ticker": "JPM", "sector": "financials", "current_value": "20000"}
            ],
            "cash_balance": "50000"
        }"#;
        std::fs::write(&path, body).unwrap();

        let source = SnapshotFilePortfolioSource::new(&path);
        let snapshot = assert_ok!(source.snapshot().await);
        assert_eq!(snapshot.positions.len(), 2);
        assert_eq!(snapshot.portfolio_value, Decimal::new(100_000, 0));
        assert_eq!(snapshot.positions_in_sector(Sector::Financials), 1);

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_snapshot_file_source_missing_file() {
        let source = SnapshotFilePortfolioSource::new("/nonexistent/riskgate_book.json");
        let result = source.snapshot().await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
