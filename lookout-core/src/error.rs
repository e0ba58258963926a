use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Error surfaced when a price update is rejected at the boundary.
#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    #[error("price must be positive, got {0}")]
    NonPositivePrice(Decimal),
    #[error("timestamp {new} is not after the last recorded {last}")]
    NonMonotonicTimestamp {
        new: DateTime<Utc>,
        last: DateTime<Utc>,
    },
}
