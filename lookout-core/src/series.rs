use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::PriceError;

/// Bounded, append-only price history for a single instrument.
///
/// Timestamps are strictly increasing and prices strictly positive; invalid
/// updates are rejected rather than clamped. When the buffer is full the
/// oldest observation is evicted.
#[derive(Clone, Debug)]
pub struct PriceSeries {
    capacity: usize,
    points: VecDeque<(DateTime<Utc>, Decimal)>,
}

impl PriceSeries {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            points: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    /// Append an observation, evicting the oldest entry once full.
    pub fn push(&mut self, timestamp: DateTime<Utc>, price: Decimal) -> Result<(), PriceError> {
        if price <= Decimal::ZERO {
            return Err(PriceError::NonPositivePrice(price));
        }
        if let Some(&(last, _)) = self.points.back() {
            if timestamp <= last {
                return Err(PriceError::NonMonotonicTimestamp {
                    new: timestamp,
                    last,
                });
            }
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back((timestamp, price));
        Ok(())
    }

    /// Copy of the last `window` prices in chronological order, fewer when
    /// the history is shorter.
    pub fn snapshot(&self, window: usize) -> Vec<Decimal> {
        let skip = self.points.len().saturating_sub(window);
        self.points.iter().skip(skip).map(|&(_, p)| p).collect()
    }

    /// Most recent observation, if any.
    pub fn latest(&self) -> Option<(DateTime<Utc>, Decimal)> {
        self.points.back().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
