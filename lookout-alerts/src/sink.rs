use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{DeliveryError, FiredAlert};

/// Outbound transport for fired alerts.
///
/// The messaging integration (a chat bot, a webhook) lives behind this
/// trait; the engine only knows that delivery can fail.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one alert to its owner.
    async fn deliver(&self, alert: &FiredAlert) -> Result<(), DeliveryError>;
}

/// Bounded retry schedule for alert delivery.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Attempt delivery up to `policy.max_attempts` times with a fixed delay.
///
/// Exhausting the attempts drops the alert with a warning; the caller moves
/// on to the next alert regardless, so one dead transport never stalls
/// evaluation.
pub async fn deliver_with_retry(
    sink: &dyn NotificationSink,
    alert: &FiredAlert,
    policy: RetryPolicy,
) -> bool {
    for attempt in 1..=policy.max_attempts.max(1) {
        match sink.deliver(alert).await {
            Ok(()) => {
                debug!(rule_id = %alert.rule_id, attempt, "alert delivered");
                return true;
            }
            Err(err) if attempt < policy.max_attempts => {
                debug!(rule_id = %alert.rule_id, attempt, error = %err, "delivery failed, retrying");
                tokio::time::sleep(policy.retry_delay).await;
            }
            Err(err) => {
                warn!(rule_id = %alert.rule_id, error = %err, "alert dropped after retries");
            }
        }
    }
    false
}
