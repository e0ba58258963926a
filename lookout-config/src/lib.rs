//! Typed settings and configuration loading for Lookout components.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use lookout_indicators::IndicatorConfig;
use serde::{Deserialize, Serialize};

/// Top-level engine settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Ticker symbols polled each cycle.
    pub instruments: Vec<String>,
    /// Seconds between polling cycles.
    pub poll_interval_secs: u64,
    /// Maximum observations retained per instrument.
    pub series_capacity: usize,
    /// SQLite file for alert rules; `None` keeps rules in memory.
    pub database_path: Option<PathBuf>,
    /// Hours a fired rule is retained before pruning.
    pub fired_retention_hours: i64,
    pub feed: FeedSettings,
    pub delivery: DeliverySettings,
    pub indicators: IndicatorSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            instruments: vec!["BTC".into(), "ETH".into(), "SOL".into()],
            poll_interval_secs: 60,
            series_capacity: 500,
            database_path: Some(PathBuf::from("lookout.db")),
            fired_retention_hours: 24,
            feed: FeedSettings::default(),
            delivery: DeliverySettings::default(),
            indicators: IndicatorSettings::default(),
        }
    }
}

/// Endpoints and timeout shared by the REST feeds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub binance_base_url: String,
    pub coingecko_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            binance_base_url: "https://api.binance.com".into(),
            coingecko_base_url: "https://api.coingecko.com".into(),
            request_timeout_secs: 10,
        }
    }
}

/// Bounded retry schedule for outbound notifications.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliverySettings {
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 500,
        }
    }
}

/// Indicator lookbacks, mirrored into [`IndicatorConfig`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub sma_windows: Vec<usize>,
    pub trend_short: usize,
    pub trend_long: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        let defaults = IndicatorConfig::default();
        Self {
            rsi_period: defaults.rsi_period,
            macd_fast: defaults.macd_fast,
            macd_slow: defaults.macd_slow,
            macd_signal: defaults.macd_signal,
            sma_windows: defaults.sma_windows,
            trend_short: defaults.trend_windows.0,
            trend_long: defaults.trend_windows.1,
        }
    }
}

impl IndicatorSettings {
    /// Convert into the analysis crate's configuration type.
    pub fn to_indicator_config(&self) -> IndicatorConfig {
        IndicatorConfig {
            rsi_period: self.rsi_period,
            macd_fast: self.macd_fast,
            macd_slow: self.macd_slow,
            macd_signal: self.macd_signal,
            sma_windows: self.sma_windows.clone(),
            trend_windows: (self.trend_short, self.trend_long),
        }
    }
}

impl Settings {
    /// Load settings, layering defaults, an optional TOML file, and
    /// `LOOKOUT_*` environment overrides (e.g. `LOOKOUT_POLL_INTERVAL_SECS`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let loaded = builder
            .add_source(Environment::with_prefix("LOOKOUT").separator("__"))
            .build()
            .context("building configuration")?;
        loaded
            .try_deserialize()
            .context("deserializing configuration")
    }
}
