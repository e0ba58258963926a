use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use lookout_core::{PricePoint, Symbol};
use once_cell::sync::Lazy;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{FeedError, PriceFeed};

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com";

/// Ticker symbol to CoinGecko coin id. Symbols outside this map are reported
/// as unknown rather than guessed.
static COIN_IDS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("BTC", "bitcoin"),
        ("ETH", "ethereum"),
        ("BNB", "binancecoin"),
        ("ADA", "cardano"),
        ("XRP", "ripple"),
        ("SOL", "solana"),
        ("DOT", "polkadot"),
        ("DOGE", "dogecoin"),
        ("AVAX", "avalanche-2"),
        ("MATIC", "matic-network"),
    ])
});

/// USD simple-price feed backed by the CoinGecko public API.
pub struct CoinGeckoFeed {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    usd: Decimal,
}

impl CoinGeckoFeed {
    pub fn new(timeout: Duration) -> Result<Self, FeedError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn coin_id(symbol: &Symbol) -> Result<&'static str, FeedError> {
        COIN_IDS
            .get(symbol.as_str())
            .copied()
            .ok_or_else(|| FeedError::UnknownInstrument(symbol.to_string()))
    }

    fn parse(
        symbol: &Symbol,
        coin_id: &str,
        mut payload: HashMap<String, QuoteResponse>,
    ) -> Result<PricePoint, FeedError> {
        let quote = payload
            .remove(coin_id)
            .ok_or_else(|| FeedError::Malformed(format!("no quote for {coin_id}")))?;
        Ok(PricePoint::new(symbol.clone(), quote.usd, Utc::now()))
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoFeed {
    fn name(&self) -> &'static str {
        "coingecko"
    }

    async fn fetch(&self, symbol: &Symbol) -> Result<PricePoint, FeedError> {
        let coin_id = Self::coin_id(symbol)?;
        let url = format!(
            "{}/api/v3/simple/price?ids={coin_id}&vs_currencies=usd",
            self.base_url
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::Status(response.status()));
        }
        let payload: HashMap<String, QuoteResponse> = response
            .json()
            .await
            .map_err(|err| FeedError::Malformed(err.to_string()))?;
        Self::parse(symbol, coin_id, payload)
    }
}
