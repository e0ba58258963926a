use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use lookout_alerts::{
    AlertBook, DeliveryError, Direction, FiredAlert, NotificationSink, RetryPolicy,
};
use lookout_cli::live;
use lookout_cli::state::EngineState;
use lookout_config::Settings;
use lookout_core::{MarketRegistry, PricePoint, Symbol, UserId};
use lookout_data::{FeedError, PriceFeed};
use lookout_events::EventBus;
use lookout_store::MemoryAlertRepository;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Replays a fixed price tape per symbol; exhausted or missing symbols fail
/// like a flaky upstream would.
struct ScriptedFeed {
    tapes: Mutex<std::collections::HashMap<Symbol, Vec<Decimal>>>,
    clock: AtomicI64,
}

impl ScriptedFeed {
    fn new(tapes: &[(&str, &[Decimal])]) -> Self {
        let map = tapes
            .iter()
            .map(|(symbol, prices)| {
                let mut prices = prices.to_vec();
                prices.reverse();
                (Symbol::from(*symbol), prices)
            })
            .collect();
        Self {
            tapes: Mutex::new(map),
            clock: AtomicI64::new(0),
        }
    }
}

#[async_trait]
impl PriceFeed for ScriptedFeed {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch(&self, symbol: &Symbol) -> Result<PricePoint, FeedError> {
        let price = self
            .tapes
            .lock()
            .unwrap()
            .get_mut(symbol)
            .and_then(Vec::pop)
            .ok_or_else(|| FeedError::UnknownInstrument(symbol.to_string()))?;
        let offset = self.clock.fetch_add(1, Ordering::SeqCst);
        Ok(PricePoint::new(
            symbol.clone(),
            price,
            Utc::now() + Duration::seconds(offset),
        ))
    }
}

#[derive(Default)]
struct RecordingSink {
    delivered: Mutex<Vec<FiredAlert>>,
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, alert: &FiredAlert) -> Result<(), DeliveryError> {
        self.delivered.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

fn engine_state(instruments: &[&str], feed: ScriptedFeed) -> EngineState {
    let mut settings = Settings::default();
    settings.instruments = instruments.iter().map(|s| s.to_string()).collect();
    settings.database_path = None;

    EngineState {
        settings,
        registry: Arc::new(MarketRegistry::new(64)),
        book: Arc::new(AlertBook::open(Arc::new(MemoryAlertRepository::default())).unwrap()),
        bus: Arc::new(EventBus::new(32)),
        feed: Arc::new(feed),
    }
}

fn policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 1,
        retry_delay: std::time::Duration::from_millis(1),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn rule_fires_once_across_cycles() {
    let feed = ScriptedFeed::new(&[("BTC", &[dec!(108), dec!(112), dec!(115)])]);
    let state = engine_state(&["BTC"], feed);
    let sink = RecordingSink::default();

    state
        .book
        .create(UserId(1), "BTC".into(), Direction::Above, dec!(110))
        .unwrap();

    // Cycle 1: 108, below the threshold.
    live::run_cycle(&state, &sink, policy()).await;
    assert!(sink.delivered.lock().unwrap().is_empty());

    // Cycle 2: 112 crosses and fires exactly once.
    live::run_cycle(&state, &sink, policy()).await;
    {
        let delivered = sink.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].observed_price, dec!(112));
    }

    // Cycle 3: 115 stays above, but the fired rule is terminal.
    live::run_cycle(&state, &sink, policy()).await;
    assert_eq!(sink.delivered.lock().unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_symbol_does_not_stall_the_others() {
    // ETH has no tape: every fetch for it fails.
    let feed = ScriptedFeed::new(&[("BTC", &[dec!(100), dec!(120)])]);
    let state = engine_state(&["ETH", "BTC"], feed);
    let sink = RecordingSink::default();

    state
        .book
        .create(UserId(1), "BTC".into(), Direction::Above, dec!(110))
        .unwrap();
    state
        .book
        .create(UserId(1), "ETH".into(), Direction::Above, dec!(1))
        .unwrap();

    live::run_cycle(&state, &sink, policy()).await;
    live::run_cycle(&state, &sink, policy()).await;

    let delivered = sink.delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].symbol, Symbol::from("BTC"));
    // BTC history accumulated despite ETH failing every cycle.
    assert_eq!(state.registry.snapshot(&Symbol::from("BTC"), 10).len(), 2);
    assert!(state.registry.snapshot(&Symbol::from("ETH"), 10).is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn events_are_published_for_prices_and_alerts() {
    let feed = ScriptedFeed::new(&[("BTC", &[dec!(112)])]);
    let state = engine_state(&["BTC"], feed);
    let sink = RecordingSink::default();
    let mut stream = state.bus.subscribe();

    state
        .book
        .create(UserId(1), "BTC".into(), Direction::Above, dec!(110))
        .unwrap();
    live::run_cycle(&state, &sink, policy()).await;

    match stream.recv().await.unwrap() {
        lookout_events::Event::Price(event) => assert_eq!(event.point.price, dec!(112)),
        other => panic!("expected price event, got {other:?}"),
    }
    match stream.recv().await.unwrap() {
        lookout_events::Event::AlertFired(event) => {
            assert_eq!(event.alert.threshold, dec!(110));
        }
        other => panic!("expected alert event, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_stops_the_loop() {
    let feed = ScriptedFeed::new(&[]);
    let mut state = engine_state(&[], feed);
    state.settings.poll_interval_secs = 1;
    let shutdown = live::ShutdownSignal::new();

    shutdown.trigger();
    // Returns promptly instead of ticking forever.
    live::run(state, &RecordingSink::default(), shutdown)
        .await
        .unwrap();
}
