use async_trait::async_trait;
use lookout_alerts::{DeliveryError, FiredAlert, NotificationSink};
use tracing::info;

/// Sink that renders alerts as log lines.
///
/// Stands in for a real messaging transport; a chat-bot integration would
/// implement [`NotificationSink`] the same way and deliver over its API.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, alert: &FiredAlert) -> Result<(), DeliveryError> {
        info!(
            user = %alert.user_id,
            rule = %alert.rule_id,
            "price alert: {} is now {} your target of {} (current price {})",
            alert.symbol,
            alert.direction,
            alert.threshold,
            alert.observed_price,
        );
        Ok(())
    }
}
