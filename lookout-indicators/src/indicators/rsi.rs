//! Relative Strength Index.

use rust_decimal::Decimal;

use crate::core::{decimal_from_usize, Indicator, IndicatorError};

/// Wilder's RSI oscillator, bounded to `[0, 100]`.
///
/// The first value is emitted after `period` price deltas have been seen,
/// i.e. on the `period + 1`-th input. Average gain and loss are seeded with
/// plain means over the warmup window, then smoothed with Wilder's decay.
#[derive(Clone, Debug)]
pub struct Rsi {
    period: usize,
    divisor: Decimal,
    decay: Decimal,
    prev_price: Option<Decimal>,
    averages: Option<(Decimal, Decimal)>,
    warmup_count: usize,
    gain_sum: Decimal,
    loss_sum: Decimal,
}

impl Rsi {
    /// Create an RSI over the given delta period.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::invalid_period("RSI", period));
        }
        Ok(Self {
            period,
            divisor: decimal_from_usize(period),
            decay: decimal_from_usize(period.saturating_sub(1)),
            prev_price: None,
            averages: None,
            warmup_count: 0,
            gain_sum: Decimal::ZERO,
            loss_sum: Decimal::ZERO,
        })
    }

    fn scale(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
        if avg_loss.is_zero() {
            // All-gain window; by convention RS is unbounded and RSI pegs at 100.
            Decimal::ONE_HUNDRED
        } else if avg_gain.is_zero() {
            Decimal::ZERO
        } else {
            let rs = avg_gain / avg_loss;
            Decimal::ONE_HUNDRED - Decimal::ONE_HUNDRED / (rs + Decimal::ONE)
        }
    }
}

impl Indicator for Rsi {
    type Output = Decimal;

    fn next(&mut self, input: Decimal) -> Option<Self::Output> {
        let prev = match self.prev_price.replace(input) {
            Some(prev) => prev,
            None => return None,
        };

        let change = input - prev;
        let (gain, loss) = if change >= Decimal::ZERO {
            (change, Decimal::ZERO)
        } else {
            (Decimal::ZERO, -change)
        };

        let (avg_gain, avg_loss) = match self.averages {
            None => {
                self.warmup_count += 1;
                self.gain_sum += gain;
                self.loss_sum += loss;
                if self.warmup_count < self.period {
                    return None;
                }
                (self.gain_sum / self.divisor, self.loss_sum / self.divisor)
            }
            Some(_) if self.period == 1 => (gain, loss),
            Some((avg_gain, avg_loss)) => (
                (avg_gain * self.decay + gain) / self.divisor,
                (avg_loss * self.decay + loss) / self.divisor,
            ),
        };

        self.averages = Some((avg_gain, avg_loss));
        Some(Self::scale(avg_gain, avg_loss))
    }

    fn reset(&mut self) {
        self.prev_price = None;
        self.averages = None;
        self.warmup_count = 0;
        self.gain_sum = Decimal::ZERO;
        self.loss_sum = Decimal::ZERO;
    }
}
