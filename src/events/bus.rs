//! # Event bus for broadcasting handle events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. Handles publish
//! from any thread (including worker-pool jobs) without blocking.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                       Receivers:
//!   Handle::close()      ──┐
//!   ignition job         ──┼──► Bus ──►  HandleBuilder listener ──► SubscriberSet
//!   listener dispatch    ──┤  (broadcast)    Bus::subscribe() (user code / tests)
//!   SubscriberSet workers──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Bounded capacity**: one ring buffer shared by all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if nobody is subscribed at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for handle events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers; dropped if there are none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn receivers_see_events_after_subscribing() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::HandleClosed));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::IgnitionStarting).with_handle("db"));

        let ev = rx.recv().await.ok();
        assert_eq!(ev.map(|e| e.kind), Some(EventKind::IgnitionStarting));
    }
}
