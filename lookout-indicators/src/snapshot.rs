//! On-demand analysis of a price snapshot.
//!
//! [`analyze`] is a pure function: it replays the streaming indicators over
//! a chronological slice of prices and reports whatever is defined given the
//! available history. Missing history yields `None` fields, never an error.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::Indicator;
use crate::indicators::{Macd, MacdOutput, Rsi, Sma};

/// Lookback configuration for snapshot analysis.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndicatorConfig {
    /// RSI delta period.
    pub rsi_period: usize,
    /// MACD fast EMA period.
    pub macd_fast: usize,
    /// MACD slow EMA period.
    pub macd_slow: usize,
    /// MACD signal EMA period.
    pub macd_signal: usize,
    /// SMA windows reported in the snapshot.
    pub sma_windows: Vec<usize>,
    /// Short and long SMA windows compared for the trend reading.
    pub trend_windows: (usize, usize),
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            sma_windows: vec![7, 25, 50],
            trend_windows: (50, 200),
        }
    }
}

/// Market sentiment derived from RSI bands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    /// RSI below 30.
    Oversold,
    /// RSI in `[30, 50)`.
    MildlyBearish,
    /// RSI exactly 50.
    Neutral,
    /// RSI in `(50, 70]`.
    MildlyBullish,
    /// RSI above 70.
    Overbought,
}

impl Sentiment {
    /// Classify an RSI reading into a sentiment band.
    pub fn from_rsi(rsi: Decimal) -> Self {
        if rsi > Decimal::from(70) {
            Self::Overbought
        } else if rsi < Decimal::from(30) {
            Self::Oversold
        } else if rsi > Decimal::from(50) {
            Self::MildlyBullish
        } else if rsi < Decimal::from(50) {
            Self::MildlyBearish
        } else {
            Self::Neutral
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Oversold => "oversold",
            Self::MildlyBearish => "mildly bearish",
            Self::Neutral => "neutral",
            Self::MildlyBullish => "mildly bullish",
            Self::Overbought => "overbought",
        };
        f.write_str(label)
    }
}

/// Trend reading from comparing a short and a long moving average.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Short SMA above the long SMA.
    Up,
    /// Short SMA below the long SMA.
    Down,
    /// The two averages coincide.
    Sideways,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Up => "uptrend",
            Self::Down => "downtrend",
            Self::Sideways => "sideways",
        };
        f.write_str(label)
    }
}

/// Derived view over a price snapshot; recomputed per request, never stored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    /// Wilder RSI, when at least `rsi_period + 1` prices exist.
    pub rsi: Option<Decimal>,
    /// Latest MACD reading, when the signal line has warmed up.
    pub macd: Option<MacdOutput>,
    /// Simple moving averages keyed by window length; windows with
    /// insufficient history are absent.
    pub sma: BTreeMap<usize, Decimal>,
    /// Sentiment band for the RSI reading, when defined.
    pub sentiment: Option<Sentiment>,
    /// Short-vs-long SMA trend, when both averages are defined.
    pub trend: Option<Trend>,
}

/// Compute an [`IndicatorSnapshot`] from a chronological price slice.
pub fn analyze(prices: &[Decimal], config: &IndicatorConfig) -> IndicatorSnapshot {
    let rsi = last_output(Rsi::new(config.rsi_period), prices);
    let macd = last_output(
        Macd::new(config.macd_fast, config.macd_slow, config.macd_signal),
        prices,
    );

    let mut sma = BTreeMap::new();
    for &window in &config.sma_windows {
        if let Some(value) = last_output(Sma::new(window), prices) {
            sma.insert(window, value);
        }
    }

    let (short, long) = config.trend_windows;
    let trend = match (
        last_output(Sma::new(short), prices),
        last_output(Sma::new(long), prices),
    ) {
        (Some(short_ma), Some(long_ma)) if short_ma > long_ma => Some(Trend::Up),
        (Some(short_ma), Some(long_ma)) if short_ma < long_ma => Some(Trend::Down),
        (Some(_), Some(_)) => Some(Trend::Sideways),
        _ => None,
    };

    IndicatorSnapshot {
        rsi,
        macd,
        sma,
        sentiment: rsi.map(Sentiment::from_rsi),
        trend,
    }
}

fn last_output<T: Indicator>(
    indicator: Result<T, crate::IndicatorError>,
    prices: &[Decimal],
) -> Option<T::Output> {
    let mut indicator = indicator.ok()?;
    prices.iter().fold(None, |last, &price| {
        indicator.next(price).or(last)
    })
}
