//! Alert rules, threshold evaluation, and notification delivery.

mod book;
mod error;
mod repository;
mod rule;
mod sequencer;
mod sink;

pub use book::AlertBook;
pub use error::{AlertError, AlertResult, DeliveryError, StoreError, StoreResult};
pub use repository::AlertRepository;
pub use rule::{AlertRule, Direction, FiredAlert, RuleState};
pub use sequencer::RuleSequencer;
pub use sink::{deliver_with_retry, NotificationSink, RetryPolicy};
