//! Shared domain types for the risk-governance service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::Error;

/// Process-wide trading mode, fixed at startup.
///
/// The risk core only ever reads this flag. Switching modes requires an
/// operator restart; an unset or unparseable value aborts startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TradingMode {
    /// Simulated fills against an in-process order book.
    Paper,
    /// Real capital deployed through the execution collaborator.
    Live,
}

impl TradingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradingMode::Paper => "paper",
            TradingMode::Live => "live",
        }
    }
}

impl std::str::FromStr for TradingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paper" => Ok(TradingMode::Paper),
            "live" => Ok(TradingMode::Live),
            other => Err(Error::Config {
                message: format!("invalid trading mode '{other}' (expected 'paper' or 'live')"),
            }),
        }
    }
}

impl std::fmt::Display for TradingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Market sector. Positions in the same sector are treated as one
/// correlation bucket by the stress engine and the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    Technology,
    CommunicationServices,
    Financials,
    RealEstate,
    Energy,
    Healthcare,
    Utilities,
    ConsumerStaples,
    ConsumerDiscretionary,
    Industrials,
    Materials,
    #[serde(other)]
    Unknown,
}

impl Sector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::Technology => "technology",
            Sector::CommunicationServices => "communication_services",
            Sector::Financials => "financials",
            Sector::RealEstate => "real_estate",
            Sector::Energy => "energy",
            Sector::Healthcare => "healthcare",
            Sector::Utilities => "utilities",
            Sector::ConsumerStaples => "consumer_staples",
            Sector::ConsumerDiscretionary => "consumer_discretionary",
            Sector::Industrials => "industrials",
            Sector::Materials => "materials",
            Sector::Unknown => "unknown",
        }
    }
}

/// One holding in the portfolio snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PortfolioPosition {
    pub ticker: String,
    pub sector: Sector,
    /// Marked-to-market value of the holding.
    pub current_value: Decimal,
}

/// Read-only view of the book supplied by the portfolio collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PortfolioSnapshot {
    pub positions: Vec<PortfolioPosition>,
    /// Positions plus cash.
    pub portfolio_value: Decimal,
    pub cash_balance: Decimal,
    pub as_of: DateTime<Utc>,
}

impl PortfolioSnapshot {
    /// Build a snapshot stamped now; total value is derived, not trusted.
    pub fn new(positions: Vec<PortfolioPosition>, cash_balance: Decimal) -> Self {
        Self::as_of(positions, cash_balance, Utc::now())
    }

    pub fn as_of(
        positions: Vec<PortfolioPosition>,
        cash_balance: Decimal,
        as_of: DateTime<Utc>,
    ) -> Self {
        let invested: Decimal = positions.iter().map(|p| p.current_value).sum();
        Self {
            positions,
            portfolio_value: invested + cash_balance,
            cash_balance,
            as_of,
        }
    }

    /// Sector of a ticker already held, if any.
    pub fn sector_of(&self, ticker: &str) -> Option<Sector> {
        self.positions
            .iter()
            .find(|p| p.ticker.eq_ignore_ascii_case(ticker))
            .map(|p| p.sector)
    }

    /// Number of distinct held tickers in the given sector.
    pub fn positions_in_sector(&self, sector: Sector) -> usize {
        self.positions.iter().filter(|p| p.sector == sector).count()
    }
}

/// Side of a resting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderSide {
    Buy,
    Sell,
}

/// An order resting at the venue, cancellable by the shutdown path.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OpenOrder {
    pub id: Uuid,
    pub ticker: String,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub limit_price: Decimal,
    pub placed_at: DateTime<Utc>,
}

/// A single confirmed cancellation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CancelledOrder {
    pub order_id: Uuid,
    pub ticker: String,
    pub quantity: Decimal,
    pub cancelled_at: DateTime<Utc>,
}

/// A cancellation that could not be confirmed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CancelFailure {
    /// Unknown when the whole collaborator call failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Uuid>,
    pub reason: String,
}

/// Outcome of a cancel-all pass. Partial failures are first-class:
/// the report always says what was confirmed and what was not.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CancelReport {
    pub cancelled: Vec<CancelledOrder>,
    pub failed: Vec<CancelFailure>,
}

impl CancelReport {
    /// Report for a collaborator call that failed outright.
    pub fn unconfirmed(reason: impl Into<String>) -> Self {
        Self {
            cancelled: Vec::new(),
            failed: vec![CancelFailure {
                order_id: None,
                reason: reason.into(),
            }],
        }
    }

    pub fn cancelled_count(&self) -> usize {
        self.cancelled.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
