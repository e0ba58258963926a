//! Built-in indicator implementations.

/// Exponential moving average.
pub mod ema;
/// Moving average convergence divergence.
pub mod macd;
/// Relative strength index.
pub mod rsi;
/// Simple moving average.
pub mod sma;

pub use ema::Ema;
pub use macd::{Macd, MacdOutput};
pub use rsi::Rsi;
pub use sma::Sma;
