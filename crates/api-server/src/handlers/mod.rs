//! API request handlers.

pub mod emergency;
pub mod health;
pub mod risk;
