//! Shared indicator trait and error type.

use rust_decimal::Decimal;
use thiserror::Error;

/// A streaming computation over a price sequence.
///
/// `next` returns `None` while the indicator is still warming up and a value
/// for every input thereafter. `reset` restores the freshly-constructed
/// state so an instance can be replayed over a new sequence.
pub trait Indicator {
    /// Value type produced once the warmup window has been filled.
    type Output;

    /// Observe the next price and produce an output when one is defined.
    fn next(&mut self, input: Decimal) -> Option<Self::Output>;

    /// Discard all accumulated state.
    fn reset(&mut self);
}

/// Error raised when an indicator is constructed with unusable parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndicatorError {
    /// A lookback period of zero was supplied.
    #[error("{indicator}: period must be greater than zero, got {period}")]
    InvalidPeriod {
        /// Name of the indicator rejecting the parameter.
        indicator: &'static str,
        /// The rejected period.
        period: usize,
    },
}

impl IndicatorError {
    /// Convenience constructor used by indicator `new` functions.
    pub fn invalid_period(indicator: &'static str, period: usize) -> Self {
        Self::InvalidPeriod { indicator, period }
    }
}

pub(crate) fn decimal_from_usize(value: usize) -> Decimal {
    Decimal::from(value as u64)
}
