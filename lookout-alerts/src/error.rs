use rust_decimal::Decimal;
use thiserror::Error;

/// Result alias for rule-book operations.
pub type AlertResult<T> = Result<T, AlertError>;

/// Result alias for repository operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error surfaced by alert creation, removal, and evaluation.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("threshold must be positive, got {0}")]
    InvalidThreshold(Decimal),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Error surfaced by durable rule storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Error surfaced by notification transports.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("delivery timed out")]
    Timeout,
}
