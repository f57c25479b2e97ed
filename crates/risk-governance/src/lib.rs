//! Risk Governance
//!
//! The safety-critical core of the riskgate service: the state machines and
//! numeric models that decide whether trading activity may continue.
//!
//! - `consecutive_loss`: win/loss streak machine with a latched entry pause
//! - `circuit_breaker`: market-regime classifier (normal vs defensive)
//! - `stress_test`: crash-scenario battery over the portfolio snapshot
//! - `evaluator`: composes the above into one pass/fail/adjust verdict
//! - `shutdown`: emergency halt/resume lifecycle with append-only history

pub mod circuit_breaker;
pub mod consecutive_loss;
pub mod evaluator;
pub mod shutdown;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerState, MarketRegime};
pub use consecutive_loss::{ConsecutiveLossState, ConsecutiveLossTracker};
pub use evaluator::{RiskCheck, RiskEvaluator, RiskReason, Verdict};
pub use shutdown::{
    EmergencyShutdownManager, ShutdownEvent, ShutdownEventKind, ShutdownOutcome, ShutdownState,
    ShutdownStatus,
};
pub use stress_test::{StressResult, StressScenario, StressTestEngine};
