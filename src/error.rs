// File: src/error.rs
use thiserror::Error;

/// Errors from the message store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid community id: {0:?}")]
    InvalidCommunityId(String),

    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Errors from setting up link validation.
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}
