use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use lookout_core::{PricePoint, Symbol};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{FeedError, PriceFeed};

const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Spot ticker feed backed by the Binance public REST API.
///
/// Instruments are quoted against USDT, so `BTC` maps to the `BTCUSDT`
/// ticker.
pub struct BinanceFeed {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    #[allow(dead_code)]
    symbol: String,
    price: String,
}

impl BinanceFeed {
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

    fn parse(symbol: &Symbol, response: TickerResponse) -> Result<PricePoint, FeedError> {
        let price = Decimal::from_str(&response.price)
            .map_err(|err| FeedError::Malformed(format!("price {:?}: {err}", response.price)))?;
        Ok(PricePoint::new(symbol.clone(), price, Utc::now()))
    }
}

#[async_trait]
impl PriceFeed for BinanceFeed {
    fn name(&self) -> &'static str {
        "binance"
    }

    async fn fetch(&self, symbol: &Symbol) -> Result<PricePoint, FeedError> {
        let url = format!(
            "{}/api/v3/ticker/price?symbol={}USDT",
            self.base_url, symbol
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::Status(response.status()));
        }
        let payload: TickerResponse = response
            .json()
            .await
            .map_err(|err| FeedError::Malformed(err.to_string()))?;
        Self::parse(symbol, payload)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn well_formed_ticker_becomes_a_price_point() {
        let payload: TickerResponse =
            serde_json::from_str(r#"{"symbol":"BTCUSDT","price":"50123.42000000"}"#).unwrap();
        let point = BinanceFeed::parse(&Symbol::from("BTC"), payload).unwrap();
        assert_eq!(point.price, dec!(50123.42000000));
        assert_eq!(point.symbol, Symbol::from("BTC"));
    }

    #[test]
    fn unparsable_price_is_malformed() {
        let payload = TickerResponse {
            symbol: "BTCUSDT".into(),
            price: "fifty thousand".into(),
        };
        let err = BinanceFeed::parse(&Symbol::from("BTC"), payload).unwrap_err();
        assert!(matches!(err, FeedError::Malformed(_)));
    }

    #[test]
    fn missing_price_field_fails_deserialization() {
        let result: Result<TickerResponse, _> =
            serde_json::from_str(r#"{"symbol":"BTCUSDT"}"#);
        assert!(result.is_err());
    }
}
