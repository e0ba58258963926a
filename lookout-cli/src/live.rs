use std::time::Duration;

use anyhow::Result;
use chrono::Duration as ChronoDuration;
use lookout_alerts::{deliver_with_retry, NotificationSink, RetryPolicy};
use lookout_core::Symbol;
use lookout_events::{AlertFiredEvent, Event, PriceEvent};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::state::EngineState;

/// Cooperative stop flag shared between the runtime and signal handlers.
///
/// The loop checks it between cycles, so a stop never interrupts the
/// evaluation of a single symbol's rule set.
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: watch::Sender<bool>,
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self { sender, receiver }
    }

    /// Request a stop; idempotent.
    pub fn trigger(&self) {
        let _ = self.sender.send(true);
    }

    /// Resolve once a stop has been requested.
    pub async fn wait(&self) {
        let mut receiver = self.receiver.clone();
        while !*receiver.borrow() {
            if receiver.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the polling engine until the shutdown signal fires.
pub async fn run(
    state: EngineState,
    sink: &dyn NotificationSink,
    shutdown: ShutdownSignal,
) -> Result<()> {
    let policy = state.retry_policy();
    let retention = ChronoDuration::hours(state.settings.fired_retention_hours);
    let mut ticker = tokio::time::interval(Duration::from_secs(state.settings.poll_interval_secs));
    info!(
        instruments = state.settings.instruments.len(),
        interval_secs = state.settings.poll_interval_secs,
        "engine started"
    );

    loop {
        tokio::select! {
            _ = shutdown.wait() => {
                info!("engine stopping");
                return Ok(());
            }
            _ = ticker.tick() => {
                run_cycle(&state, sink, policy).await;
                let pruned = state.book.prune_fired(retention);
                if pruned > 0 {
                    debug!(pruned, "pruned stale fired rules");
                }
            }
        }
    }
}

/// One polling cycle over every configured instrument.
///
/// Failures are isolated per symbol: a feed error, a rejected price, or a
/// dead notification transport affects only the instrument (or alert) it
/// belongs to.
pub async fn run_cycle(state: &EngineState, sink: &dyn NotificationSink, policy: RetryPolicy) {
    for ticker in &state.settings.instruments {
        let symbol = Symbol::from(ticker.as_str());
        let point = match state.feed.fetch(&symbol).await {
            Ok(point) => point,
            Err(err) => {
                warn!(%symbol, error = %err, "fetch failed, skipping this cycle");
                continue;
            }
        };

        if let Err(err) = state.registry.apply(&point) {
            warn!(%symbol, error = %err, "price rejected at the boundary");
            continue;
        }
        state.bus.publish(Event::Price(PriceEvent {
            point: point.clone(),
        }));

        let fired = state.book.evaluate(&symbol, point.price);
        for alert in fired {
            state.bus.publish(Event::AlertFired(AlertFiredEvent {
                alert: alert.clone(),
            }));
            deliver_with_retry(sink, &alert, policy).await;
        }
    }
}
