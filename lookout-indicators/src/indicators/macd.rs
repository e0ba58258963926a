//! Moving Average Convergence Divergence.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{Indicator, IndicatorError};
use crate::indicators::ema::Ema;

/// One MACD reading: line, signal line, and their difference.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    /// Fast EMA minus slow EMA.
    pub macd: Decimal,
    /// EMA of the MACD line.
    pub signal: Decimal,
    /// `macd - signal`, exactly.
    pub histogram: Decimal,
}

/// MACD over fast/slow price EMAs with an EMA signal line.
///
/// Emits nothing until the slow EMA and then the signal EMA have both been
/// seeded, so the first output arrives once `slow + signal - 1` prices have
/// been observed.
#[derive(Clone, Debug)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
}

impl Macd {
    /// Create a MACD with the given fast, slow, and signal periods.
    pub fn new(fast: usize, slow: usize, signal: usize) -> Result<Self, IndicatorError> {
        for period in [fast, slow, signal] {
            if period == 0 {
                return Err(IndicatorError::invalid_period("MACD", period));
            }
        }
        Ok(Self {
            fast: Ema::new(fast)?,
            slow: Ema::new(slow)?,
            signal: Ema::new(signal)?,
        })
    }
}

impl Indicator for Macd {
    type Output = MacdOutput;

    fn next(&mut self, input: Decimal) -> Option<Self::Output> {
        let fast = self.fast.next(input);
        let slow = self.slow.next(input)?;
        // The fast EMA warms up before the slow one, so it is Some here.
        let macd = fast? - slow;
        let signal = self.signal.next(macd)?;
        Some(MacdOutput {
            macd,
            signal,
            histogram: macd - signal,
        })
    }

    fn reset(&mut self) {
        self.fast.reset();
        self.slow.reset();
        self.signal.reset();
    }
}
