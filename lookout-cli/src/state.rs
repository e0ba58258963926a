use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use lookout_alerts::{AlertBook, AlertRepository, RetryPolicy};
use lookout_config::Settings;
use lookout_core::MarketRegistry;
use lookout_data::{BinanceFeed, CoinGeckoFeed, FallbackFeed, PriceFeed};
use lookout_events::EventBus;
use lookout_store::{MemoryAlertRepository, SqliteAlertRepository};
use tracing::info;

/// Everything the runtime needs, wired once at startup and injected into
/// whatever runs next. No component reaches for globals.
pub struct EngineState {
    pub settings: Settings,
    pub registry: Arc<MarketRegistry>,
    pub book: Arc<AlertBook>,
    pub bus: Arc<EventBus>,
    pub feed: Arc<dyn PriceFeed>,
}

impl EngineState {
    /// Build the full wiring from settings: storage backend, rule book,
    /// market registry, event bus, and the feed fallback chain.
    pub fn build(settings: Settings) -> Result<Self> {
        let repo: Arc<dyn AlertRepository> = match &settings.database_path {
            Some(path) => {
                info!(path = %path.display(), "opening alert store");
                Arc::new(SqliteAlertRepository::new(path).context("opening alert store")?)
            }
            None => {
                info!("running with in-memory alert store");
                Arc::new(MemoryAlertRepository::default())
            }
        };
        let book = Arc::new(AlertBook::open(repo).context("loading alert rules")?);

        let timeout = Duration::from_secs(settings.feed.request_timeout_secs);
        let feed = FallbackFeed::new(vec![
            Box::new(
                CoinGeckoFeed::with_base_url(settings.feed.coingecko_base_url.clone(), timeout)
                    .context("building coingecko feed")?,
            ),
            Box::new(
                BinanceFeed::with_base_url(settings.feed.binance_base_url.clone(), timeout)
                    .context("building binance feed")?,
            ),
        ]);

        Ok(Self {
            registry: Arc::new(MarketRegistry::new(settings.series_capacity)),
            book,
            bus: Arc::new(EventBus::new(256)),
            feed: Arc::new(feed),
            settings,
        })
    }

    /// Delivery retry schedule from the settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.settings.delivery.max_attempts,
            retry_delay: Duration::from_millis(self.settings.delivery.retry_delay_ms),
        }
    }
}
