//! Simple Moving Average.

use std::collections::VecDeque;

use rust_decimal::Decimal;

use crate::core::{decimal_from_usize, Indicator, IndicatorError};

/// Arithmetic mean over a rolling window of exactly `period` prices.
///
/// The running sum is updated in constant time as the window slides.
#[derive(Clone, Debug)]
pub struct Sma {
    period: usize,
    divisor: Decimal,
    sum: Decimal,
    window: VecDeque<Decimal>,
}

impl Sma {
    /// Create an SMA over the given lookback period.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::invalid_period("SMA", period));
        }
        Ok(Self {
            period,
            divisor: decimal_from_usize(period),
            sum: Decimal::ZERO,
            window: VecDeque::with_capacity(period),
        })
    }

    /// Configured lookback period.
    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    type Output = Decimal;

    fn next(&mut self, input: Decimal) -> Option<Self::Output> {
        self.window.push_back(input);
        self.sum += input;
        if self.window.len() > self.period {
            if let Some(evicted) = self.window.pop_front() {
                self.sum -= evicted;
            }
        }
        (self.window.len() == self.period).then(|| self.sum / self.divisor)
    }

    fn reset(&mut self) {
        self.sum = Decimal::ZERO;
        self.window.clear();
    }
}
