//! Core domain types and market state for the Lookout alert engine.

mod error;
mod ids;
mod price;
mod registry;
mod series;

pub use error::PriceError;
pub use ids::{RuleId, Symbol, UserId};
pub use price::PricePoint;
pub use registry::MarketRegistry;
pub use series::PriceSeries;
