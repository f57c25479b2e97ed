//! Integration tests for component interactions.
//!
//! These tests wire the risk components together the way the server does
//! and verify the cross-crate contracts.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use risk_core::constants::RiskConstants;
use risk_core::orders::PaperOrderBook;
use risk_core::portfolio::{InMemoryPortfolioSource, PortfolioSource};
use risk_core::types::{OrderSide, PortfolioPosition, Sector};
use risk_governance::{
    CircuitBreaker, ConsecutiveLossTracker, EmergencyShutdownManager, MarketRegime, RiskCheck,
    RiskEvaluator, RiskReason, ShutdownStatus, StressTestEngine,
};

fn position(ticker: &str, sector: Sector, value: i64) -> PortfolioPosition {
    PortfolioPosition {
        ticker: ticker.to_string(),
        sector,
        current_value: Decimal::new(value, 0),
    }
}

fn evaluator_with_book() -> (Arc<ConsecutiveLossTracker>, Arc<CircuitBreaker>, RiskEvaluator) {
    let constants = Arc::new(RiskConstants::default());
    let tracker = Arc::new(ConsecutiveLossTracker::new(constants.clone()));
    let breaker = Arc::new(CircuitBreaker::new(constants.clone()));
    let portfolio = Arc::new(InMemoryPortfolioSource::new(
        vec![
            position("AAPL", Sector::Technology, 20_000),
            position("JPM", Sector::Financials, 20_000),
        ],
        Decimal::new(60_000, 0),
    ));
    let evaluator = RiskEvaluator::new(constants, tracker.clone(), breaker.clone(), portfolio);
    (tracker, breaker, evaluator)
}

fn check(ticker: &str, pct: Decimal) -> RiskCheck {
    RiskCheck {
        ticker: ticker.to_string(),
        proposed_position_pct: pct,
        model_disagreement: None,
        order_quantity: None,
        price: None,
        avg_daily_volume: None,
    }
}

/// A losing run flows from trade closes through the tracker into a blocked
/// evaluator verdict, and a human resume unblocks it.
#[tokio::test]
async fn test_losing_run_pauses_entries_end_to_end() {
    let (tracker, _breaker, evaluator) = evaluator_with_book();

    for i in 0..7 {
        tracker.record_result(&format!("T{i}"), false).await;
    }

    let verdict = evaluator.evaluate(&check("MRK", Decimal::new(5, 2))).await.unwrap();
    assert!(!verdict.allowed);
    assert!(matches!(
        verdict.reasons[0],
        RiskReason::EntriesPaused { consecutive_losses: 7 }
    ));

    tracker.resume_after_human_decision("Joe").await;
    let verdict = evaluator.evaluate(&check("MRK", Decimal::new(5, 2))).await.unwrap();
    assert!(verdict.allowed);
}

/// A regime flip propagates from the breaker into evaluator sizing.
#[tokio::test]
async fn test_defensive_regime_flows_into_verdicts() {
    let (_tracker, breaker, evaluator) = evaluator_with_book();

    let state = breaker.recompute(Decimal::new(5, 2)).await;
    assert_eq!(state.regime, MarketRegime::Defensive);

    let verdict = evaluator.evaluate(&check("MRK", Decimal::new(10, 2))).await.unwrap();
    assert!(verdict.allowed);
    assert_eq!(verdict.adjusted_size_pct, Decimal::new(5, 2));

    breaker.recompute(Decimal::new(1, 2)).await;
    let verdict = evaluator.evaluate(&check("MRK", Decimal::new(10, 2))).await.unwrap();
    assert_eq!(verdict.adjusted_size_pct, Decimal::new(10, 2));
}

/// The shutdown manager drains a real paper book and round-trips state.
#[tokio::test]
async fn test_shutdown_lifecycle_with_paper_book() {
    let book = Arc::new(PaperOrderBook::new());
    book.place("AAPL", OrderSide::Buy, Decimal::new(100, 0), Decimal::new(190, 0));
    book.place("MSFT", OrderSide::Sell, Decimal::new(50, 0), Decimal::new(410, 0));

    let manager = EmergencyShutdownManager::new(book.clone(), Duration::from_secs(5));

    let outcome = manager.emergency_shutdown("Jared", "crash").await;
    assert_eq!(outcome.state.status, ShutdownStatus::Shutdown);
    assert_eq!(outcome.cancellation.cancelled_count(), 2);
    assert_eq!(book.open_count(), 0);

    let state = manager.resume_trading("Joe").await.unwrap();
    assert_eq!(state.status, ShutdownStatus::Active);
    assert_eq!(state.history.len(), 2);

    // Resume again while active: rejected, history untouched
    assert!(manager.resume_trading("Joe").await.is_err());
    assert_eq!(manager.history().await.len(), 2);
}

/// Concurrent shutdowns from separate tasks serialize cleanly.
#[tokio::test]
async fn test_concurrent_shutdowns_serialize() {
    let book = Arc::new(PaperOrderBook::new());
    let manager = Arc::new(EmergencyShutdownManager::new(book, Duration::from_secs(5)));

    let mut handles = Vec::new();
    for i in 0..4 {
        let m = manager.clone();
        handles.push(tokio::spawn(async move {
            m.emergency_shutdown(&format!("caller-{i}"), "crash").await
        }));
    }
    for handle in handles {
        let outcome = handle.await.unwrap();
        assert_eq!(outcome.state.status, ShutdownStatus::Shutdown);
    }

    let state = manager.status().await;
    assert_eq!(state.status, ShutdownStatus::Shutdown);
    assert_eq!(state.history.len(), 4);
}

/// Stress results feed the evaluator's soft reasons for the same book.
#[tokio::test]
async fn test_stress_engine_and_evaluator_agree() {
    let constants = Arc::new(RiskConstants::default());
    let portfolio = Arc::new(InMemoryPortfolioSource::new(
        vec![
            position("JPM", Sector::Financials, 35_000),
            position("GS", Sector::Financials, 35_000),
        ],
        Decimal::new(30_000, 0),
    ));
    let engine = StressTestEngine::new(constants.clone());
    let snapshot = portfolio.snapshot().await.unwrap();

    let failing: Vec<String> = engine
        .run(&snapshot)
        .into_iter()
        .filter(|r| !r.passed)
        .map(|r| r.scenario)
        .collect();
    assert!(failing.contains(&"Global Financial Crisis 2008".to_string()));

    let tracker = Arc::new(ConsecutiveLossTracker::new(constants.clone()));
    let breaker = Arc::new(CircuitBreaker::new(constants.clone()));
    let evaluator = RiskEvaluator::new(constants, tracker, breaker, portfolio);
    let verdict = evaluator.evaluate(&check("MRK", Decimal::new(5, 2))).await.unwrap();

    let verdict_failures: Vec<&String> = verdict
        .reasons
        .iter()
        .filter_map(|r| match r {
            RiskReason::StressScenarioFailed { scenario, .. } => Some(scenario),
            _ => None,
        })
        .collect();
    assert_eq!(verdict_failures.len(), failing.len());
}

/// Verdicts serialize into the wire shape the dashboard consumes.
#[tokio::test]
async fn test_verdict_wire_shape() {
    let (_tracker, _breaker, evaluator) = evaluator_with_book();

    let mut trade = check("MRK", Decimal::new(5, 2));
    trade.order_quantity = Some(Decimal::new(2000, 0));
    trade.price = Some(Decimal::new(100, 0));
    trade.avg_daily_volume = Some(Decimal::new(100_000, 0));

    let verdict = evaluator.evaluate(&trade).await.unwrap();
    let json = serde_json::to_value(&verdict).unwrap();
    assert_eq!(json["allowed"], true);
    assert_eq!(json["estimated_slippage"], "400.00");
}
