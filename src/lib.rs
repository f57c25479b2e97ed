//! Riskgate: risk-governance service for a trading dashboard backend.
//!
//! This is the root crate that provides benchmark access to the internal modules.
//! For actual functionality, use the individual crates directly:
//!
//! - `risk-core`: thresholds, freshness grading, slippage model, shared
//!   types, collaborator interfaces
//! - `risk-governance`: consecutive-loss tracker, circuit breaker, stress
//!   engine, evaluator, emergency shutdown manager
//! - `api-server`: REST API boundary

// Re-export for benchmarks
pub use risk_core as core;
pub use risk_governance as governance;
