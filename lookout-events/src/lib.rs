//! Runtime events and the broadcast bus that distributes them.

use lookout_alerts::FiredAlert;
use lookout_core::PricePoint;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A validated price observation was recorded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PriceEvent {
    pub point: PricePoint,
}

/// An alert rule transitioned to fired.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AlertFiredEvent {
    pub alert: FiredAlert,
}

/// Union of everything published on the bus.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Event {
    Price(PriceEvent),
    AlertFired(AlertFiredEvent),
}

/// Fan-out bus over a tokio broadcast channel.
///
/// Publishing never blocks; events sent while no subscriber is attached are
/// simply dropped.
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> EventStream {
        EventStream {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn publish(&self, event: Event) {
        let _ = self.sender.send(event);
    }
}

/// Receiving half handed to subscribers.
pub struct EventStream {
    receiver: broadcast::Receiver<Event>,
}

impl EventStream {
    pub async fn recv(&mut self) -> Result<Event, broadcast::error::RecvError> {
        self.receiver.recv().await
    }
}
