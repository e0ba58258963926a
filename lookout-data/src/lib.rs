//! Market data feeds and the validation boundary in front of them.

mod binance;
mod coingecko;
mod error;
mod feed;

pub use binance::BinanceFeed;
pub use coingecko::CoinGeckoFeed;
pub use error::FeedError;
pub use feed::{FallbackFeed, PriceFeed};
