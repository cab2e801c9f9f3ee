//! # LogWriter — tracing event renderer
//!
//! A minimal subscriber that forwards incoming [`Event`]s to `tracing`.
//! Routine transitions are logged at `debug`, failures at `warn`.
//!
//! ## Example output (with a fmt subscriber)
//! ```text
//! DEBUG ignis: ignition starting handle="db" generation=1
//! WARN  ignis: ignition failed handle="db" generation=1 reason="connection refused"
//! DEBUG ignis: handle closed handle="db" generation=1
//! ```

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let handle = e.handle.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        let generation = e.generation.unwrap_or_default();

        match e.kind {
            EventKind::IgnitionStarting => {
                debug!(target: "ignis", handle, generation, "ignition starting");
            }
            EventKind::IgnitionSucceeded => {
                debug!(target: "ignis", handle, generation, "ignition succeeded");
            }
            EventKind::IgnitionFailed => {
                warn!(target: "ignis", handle, generation, reason, "ignition failed");
            }
            EventKind::IgnitionDiscarded => {
                debug!(target: "ignis", handle, generation, "ignition discarded");
            }
            EventKind::IgnitionCancelled => {
                debug!(target: "ignis", handle, generation, "ignition cancelled");
            }
            EventKind::HandleClosed => {
                debug!(target: "ignis", handle, generation, "handle closed");
            }
            EventKind::BuilderAdopted => {
                debug!(target: "ignis", handle, "builder adopted");
            }
            EventKind::RollbackStarted => {
                warn!(target: "ignis", handle, reason, "rebuild failed; rolling back");
            }
            EventKind::RollbackFailed => {
                warn!(target: "ignis", handle, reason, "rollback failed");
            }
            EventKind::CloseFailed => {
                warn!(target: "ignis", handle, generation, reason, "resource close failed");
            }
            EventKind::ListenerPanicked => {
                warn!(target: "ignis", handle, reason, "listener panicked");
            }
            EventKind::SubscriberOverflow => {
                warn!(target: "ignis", subscriber = handle, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                warn!(target: "ignis", subscriber = handle, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
