//! Exponential Moving Average.

use rust_decimal::Decimal;

use crate::core::{decimal_from_usize, Indicator, IndicatorError};

/// Exponentially-weighted moving average with smoothing `2 / (period + 1)`.
///
/// Seeded with the simple average of the first `period` inputs, the
/// conventional definition.
#[derive(Clone, Debug)]
pub struct Ema {
    period: usize,
    alpha: Decimal,
    divisor: Decimal,
    state: Option<Decimal>,
    warmup_sum: Decimal,
    warmup_count: usize,
}

impl Ema {
    /// Create an EMA over the given lookback period.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::invalid_period("EMA", period));
        }
        Ok(Self {
            period,
            alpha: Decimal::TWO / decimal_from_usize(period + 1),
            divisor: decimal_from_usize(period),
            state: None,
            warmup_sum: Decimal::ZERO,
            warmup_count: 0,
        })
    }

    /// Current value, if the seed window has been filled.
    pub fn value(&self) -> Option<Decimal> {
        self.state
    }
}

impl Indicator for Ema {
    type Output = Decimal;

    fn next(&mut self, input: Decimal) -> Option<Self::Output> {
        match self.state {
            None => {
                self.warmup_sum += input;
                self.warmup_count += 1;
                if self.warmup_count < self.period {
                    return None;
                }
                let seed = self.warmup_sum / self.divisor;
                self.state = Some(seed);
                Some(seed)
            }
            Some(current) => {
                let next = (input - current) * self.alpha + current;
                self.state = Some(next);
                Some(next)
            }
        }
    }

    fn reset(&mut self) {
        self.state = None;
        self.warmup_sum = Decimal::ZERO;
        self.warmup_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn seeds_with_simple_average() {
        let mut ema = Ema::new(3).unwrap();
        assert_eq!(ema.next(dec!(1)), None);
        assert_eq!(ema.next(dec!(2)), None);
        assert_eq!(ema.next(dec!(3)), Some(dec!(2)));
        assert_eq!(ema.value(), Some(dec!(2)));
    }

    #[test]
    fn smooths_after_seeding() {
        let mut ema = Ema::new(3).unwrap();
        for price in [dec!(1), dec!(2), dec!(3)] {
            ema.next(price);
        }
        // Alpha is 0.5 for period 3: 0.5 * (4 - 2) + 2 = 3.
        assert_eq!(ema.next(dec!(4)), Some(dec!(3)));
    }

    #[test]
    fn reset_restores_warmup() {
        let mut ema = Ema::new(2).unwrap();
        ema.next(dec!(1));
        assert!(ema.next(dec!(2)).is_some());
        ema.reset();
        assert_eq!(ema.next(dec!(4)), None);
        assert_eq!(ema.value(), None);
    }
}
