use thiserror::Error;

/// Failure fetching a price from an external source.
///
/// All variants are treated as transient by the engine: the affected
/// symbol's cycle is skipped and retried on the next poll.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response status: {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("no feed mapping for instrument {0}")]
    UnknownInstrument(String),
    #[error("all feeds failed for instrument {0}")]
    Exhausted(String),
}
