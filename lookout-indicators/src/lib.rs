#![deny(missing_docs)]

//! Deterministic technical indicators built on decimal arithmetic.
//!
//! Each indicator is a small streaming state machine: feed it prices through
//! [`Indicator::next`] and it emits `None` until enough history has been
//! observed, then a value for every subsequent input. Identical input
//! sequences always produce identical output.

/// Foundational trait and error type shared by every indicator.
pub mod core;
/// Built-in indicator implementations.
pub mod indicators;
/// On-demand snapshot analysis over a slice of prices.
pub mod snapshot;

pub use crate::core::{Indicator, IndicatorError};
pub use crate::indicators::{Ema, Macd, MacdOutput, Rsi, Sma};
pub use crate::snapshot::{analyze, IndicatorConfig, IndicatorSnapshot, Sentiment, Trend};
