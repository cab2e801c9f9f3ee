//! # Lifecycle events emitted by handles.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Ignition events**: starting, succeeded, failed, discarded, cancelled
//! - **Lifecycle events**: handle closed, builder adopted, rollback
//! - **Isolation events**: failures swallowed to keep `close()` and listener dispatch total
//!
//! The [`Event`] struct carries the handle name, ignition generation and an
//! optional human-readable reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use ignis::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::IgnitionFailed)
//!     .with_handle("db")
//!     .with_generation(3)
//!     .with_reason("connection refused");
//!
//! assert_eq!(ev.kind, EventKind::IgnitionFailed);
//! assert_eq!(ev.handle.as_deref(), Some("db"));
//! assert_eq!(ev.generation, Some(3));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of handle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `handle`: subscriber name
    /// - `reason`: panic message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `handle`: subscriber name
    /// - `reason`: "full" or "closed"
    SubscriberOverflow,

    // === Ignition events ===
    /// Ignition submitted to the worker pool.
    ///
    /// Sets:
    /// - `handle`: builder name
    /// - `generation`: ignition generation
    IgnitionStarting,

    /// Ignition resolved its promise with a resource.
    ///
    /// Sets:
    /// - `handle`, `generation`
    IgnitionSucceeded,

    /// Ignition rejected its promise.
    ///
    /// Sets:
    /// - `handle`, `generation`
    /// - `reason`: build error
    IgnitionFailed,

    /// Ignition finished after its promise had been cancelled or replaced;
    /// the fresh resource was closed instead of published.
    ///
    /// Sets:
    /// - `handle`, `generation`
    IgnitionDiscarded,

    /// A pending ignition was cancelled (close or replacement).
    ///
    /// Sets:
    /// - `handle`, `generation`
    IgnitionCancelled,

    // === Lifecycle events ===
    /// The handle released its promise and ran its close listeners.
    ///
    /// Sets:
    /// - `handle`, `generation` (of the released promise)
    HandleClosed,

    /// A rebuild succeeded and the new builder became current.
    ///
    /// Sets:
    /// - `handle`: name of the adopted builder
    BuilderAdopted,

    /// A rebuild failed; the previous builder is being reignited.
    ///
    /// Sets:
    /// - `handle`: previous builder name
    /// - `reason`: failure of the new builder
    RollbackStarted,

    /// The rollback ignition failed as well.
    ///
    /// Sets:
    /// - `handle`, `reason`
    RollbackFailed,

    // === Isolation events ===
    /// `Resource::close` returned an error or panicked.
    ///
    /// Sets:
    /// - `handle`, `generation`, `reason`
    CloseFailed,

    /// A start or close listener panicked.
    ///
    /// Sets:
    /// - `handle`, `reason`
    ListenerPanicked,
}

/// Handle event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the handle's builder (or subscriber for subscriber events).
    pub handle: Option<Arc<str>>,
    /// Ignition generation the event refers to.
    pub generation: Option<u64>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            handle: None,
            generation: None,
            reason: None,
        }
    }

    /// Attaches a handle name.
    #[inline]
    pub fn with_handle(mut self, handle: impl Into<Arc<str>>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    /// Attaches an ignition generation.
    #[inline]
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_handle(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_handle(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::IgnitionStarting);
        let b = Event::new(EventKind::IgnitionSucceeded);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn overflow_helper_fills_fields() {
        let ev = Event::subscriber_overflow("metrics", "full");
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.handle.as_deref(), Some("metrics"));
        assert_eq!(ev.reason.as_deref(), Some("full"));
    }
}
