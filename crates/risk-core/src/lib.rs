//! Risk Core Library
//!
//! Shared types, fixed thresholds, pure risk models, and collaborator
//! interfaces for the riskgate risk-governance service.

pub mod config;
pub mod constants;
pub mod error;
pub mod freshness;
pub mod market;
pub mod orders;
pub mod portfolio;
pub mod slippage;
pub mod types;

pub use error::{Error, Result};
