use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::{PriceError, PricePoint, PriceSeries, Symbol};

/// Owner of every tracked instrument's [`PriceSeries`].
///
/// The registry is created once at startup and injected wherever market
/// state is needed; nothing in the workspace reaches for ambient globals.
/// Each series is independent, so updating one symbol can never disturb
/// another's history.
#[derive(Debug)]
pub struct MarketRegistry {
    capacity: usize,
    series: RwLock<HashMap<Symbol, PriceSeries>>,
}

impl MarketRegistry {
    /// Create a registry whose series each hold at most `capacity` points.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            series: RwLock::new(HashMap::new()),
        }
    }

    /// Record a validated observation, creating the series on first sight.
    pub fn apply(&self, point: &PricePoint) -> Result<(), PriceError> {
        let mut guard = self.series.write();
        guard
            .entry(point.symbol.clone())
            .or_insert_with(|| PriceSeries::new(self.capacity))
            .push(point.timestamp, point.price)
    }

    /// Consistent copy of the last `window` prices for `symbol`.
    pub fn snapshot(&self, symbol: &Symbol, window: usize) -> Vec<Decimal> {
        self.series
            .read()
            .get(symbol)
            .map(|s| s.snapshot(window))
            .unwrap_or_default()
    }

    /// Latest observation for `symbol`, if the series exists and is non-empty.
    pub fn latest(&self, symbol: &Symbol) -> Option<(DateTime<Utc>, Decimal)> {
        self.series.read().get(symbol).and_then(PriceSeries::latest)
    }

    /// Symbols with at least one recorded observation.
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<_> = self.series.read().keys().cloned().collect();
        symbols.sort();
        symbols
    }
}
