//! Open-order cancellation.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::types::{CancelReport, CancelledOrder, OpenOrder, OrderSide};
use crate::Result;

/// Cancels every order resting at the venue.
///
/// Implementations own the I/O; callers wrap the future in a timeout and
/// treat an error or timeout as an unconfirmed cancellation, never as a
/// reason to abandon a shutdown.
#[async_trait]
pub trait OrderCanceller: Send + Sync {
    async fn cancel_all(&self) -> Result<CancelReport>;
}

/// In-process order book backing paper mode.
#[derive(Default)]
pub struct PaperOrderBook {
    orders: DashMap<Uuid, OpenOrder>,
}

impl PaperOrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resting paper order.
    pub fn place(
        &self,
        ticker: &str,
        side: OrderSide,
        quantity: Decimal,
        limit_price: Decimal,
    ) -> OpenOrder {
        let order = OpenOrder {
            id: Uuid::new_v4(),
            ticker: ticker.to_string(),
            side,
            quantity,
            limit_price,
            placed_at: Utc::now(),
        };
        self.orders.insert(order.id, order.clone());
        order
    }

    pub fn open_count(&self) -> usize {
        self.orders.len()
    }
}

#[async_trait]
impl OrderCanceller for PaperOrderBook {
    async fn cancel_all(&self) -> Result<CancelReport> {
        let ids: Vec<Uuid> = self.orders.iter().map(|entry| *entry.key()).collect();
        let mut cancelled = Vec::with_capacity(ids.len());
        let now = Utc::now();

        for id in ids {
            if let Some((_, order)) = self.orders.remove(&id) {
                cancelled.push(CancelledOrder {
                    order_id: order.id,
                    ticker: order.ticker,
                    quantity: order.quantity,
                    cancelled_at: now,
                });
            }
        }

        info!(cancelled = cancelled.len(), "paper order book cleared");
        Ok(CancelReport {
            cancelled,
            failed: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_cancel_all_drains_the_book() {
        let book = PaperOrderBook::new();
        book.place("AAPL", OrderSide::Buy, Decimal::new(100, 0), Decimal::new(18950, 2));
        book.place("MSFT", OrderSide::Sell, Decimal::new(50, 0), Decimal::new(41200, 2));
        assert_eq!(book.open_count(), 2);

        let report = assert_ok!(book.cancel_all().await);
        assert_eq!(report.cancelled_count(), 2);
        assert!(report.is_clean());
        assert_eq!(book.open_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_all_on_empty_book() {
        let book = PaperOrderBook::new();
        let report = assert_ok!(book.cancel_all().await);
        assert_eq!(report.cancelled_count(), 0);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_cancel_all_is_repeatable() {
        let book = PaperOrderBook::new();
        book.place("TSLA", OrderSide::Buy, Decimal::new(10, 0), Decimal::new(24000, 2));

        let first = assert_ok!(book.cancel_all().await);
        assert_eq!(first.cancelled_count(), 1);

        let second = assert_ok!(book.cancel_all().await);
        assert_eq!(second.cancelled_count(), 0);
        assert!(second.is_clean());
    }
}
