use async_trait::async_trait;
use lookout_core::{PricePoint, Symbol};
use tracing::debug;

use crate::FeedError;

/// A source of validated price observations.
///
/// Implementations own the conversion from their wire format into
/// [`PricePoint`]; nothing loosely typed crosses this boundary.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Human-readable source name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch the current price for `symbol`.
    async fn fetch(&self, symbol: &Symbol) -> Result<PricePoint, FeedError>;
}

/// Tries each feed in order and returns the first success.
pub struct FallbackFeed {
    feeds: Vec<Box<dyn PriceFeed>>,
}

impl FallbackFeed {
    pub fn new(feeds: Vec<Box<dyn PriceFeed>>) -> Self {
        Self { feeds }
    }
}

#[async_trait]
impl PriceFeed for FallbackFeed {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn fetch(&self, symbol: &Symbol) -> Result<PricePoint, FeedError> {
        for feed in &self.feeds {
            match feed.fetch(symbol).await {
                Ok(point) => return Ok(point),
                Err(err) => {
                    debug!(feed = feed.name(), %symbol, error = %err, "feed failed, trying next");
                }
            }
        }
        Err(FeedError::Exhausted(symbol.to_string()))
    }
}
