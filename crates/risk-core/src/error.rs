//! Error types for the risk-governance service.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{operation} rejected: state is {current}")]
    InvalidState {
        operation: &'static str,
        current: String,
    },

    #[error("{service} collaborator failed: {message}")]
    Collaborator {
        service: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
