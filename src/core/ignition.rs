//! # Ignition job.
//!
//! The unit of work submitted to the [`WorkerPool`](crate::WorkerPool) for one
//! ignition attempt.
//!
//! ```text
//! ignite_gate.read()          (waits while close() is closing the previous resource)
//!     │
//! builder.ignite()            (no locks held; panics become BuildError::Panicked)
//!     │
//! teardown.read()             (close() cannot run from here on)
//!     │
//!     ├─ Ok  ─► promise.resolve() ─┬─ won, current ─► IgnitionSucceeded ─► start listeners
//!     │                            ├─ won, replaced ► IgnitionDiscarded ─► resource.close()
//!     │                            └─ lost ─────────► IgnitionDiscarded ─► resource.close()
//!     └─ Err ─► promise.reject()  ──── won ─► IgnitionFailed
//! ```
//!
//! Losing the race means the promise was cancelled by `close()` or by a
//! replacing rebuild while `ignite()` ran; the fresh resource never becomes
//! current. A resolved ignition that no longer occupies the slot is closed
//! as well: nothing else would ever close it.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use super::panic_message;
use super::state::{Ignition, Shared};
use crate::builders::{BuilderRef, Resource};
use crate::error::BuildError;
use crate::events::EventKind;

pub(crate) async fn run_ignition<R: Resource>(
    shared: Arc<Shared<R>>,
    ignition: Arc<Ignition<R>>,
    builder: BuilderRef<R>,
) {
    drop(shared.ignite_gate.read().await);

    let outcome = match AssertUnwindSafe(builder.ignite()).catch_unwind().await {
        Ok(res) => res,
        Err(panic_err) => Err(BuildError::Panicked {
            info: panic_message(&*panic_err),
        }),
    };

    let _gate = shared.teardown.read().await;
    match outcome {
        Ok(resource) => {
            let resource = Arc::new(resource);
            if ignition.promise.resolve(Arc::clone(&resource)) && shared.is_current(&ignition) {
                shared.publish(ignition.event(EventKind::IgnitionSucceeded));
                shared.dispatch_start(&ignition, &resource);
            } else {
                shared.publish(ignition.event(EventKind::IgnitionDiscarded));
                shared.close_resource(&ignition, &resource).await;
            }
        }
        Err(err) => {
            let reason = err.as_message();
            if ignition.promise.reject(err) {
                shared.publish(ignition.event(EventKind::IgnitionFailed).with_reason(reason));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::BuilderFn;
    use crate::config::Config;
    use crate::error::BoxError;
    use crate::events::Bus;
    use crate::pool::InlinePool;
    use crate::promise::PromiseState;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Socket {
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Resource for Socket {
        async fn close(&self) -> Result<(), BoxError> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn resolved_ignition_outside_the_slot_is_closed() {
        let closed = Arc::new(AtomicUsize::new(0));
        let c = closed.clone();
        let builder: BuilderRef<Socket> = BuilderFn::arc("socket", move || {
            let closed = c.clone();
            async move { Ok::<_, BuildError>(Socket { closed }) }
        });
        let shared = Arc::new(Shared::new(
            Config::default(),
            Arc::new(InlinePool::new()),
            Bus::new(16),
            Arc::clone(&builder),
            None,
        ));
        let mut events = shared.bus.subscribe();

        let stale = Arc::new(Ignition::new(7, "socket"));
        run_ignition(Arc::clone(&shared), Arc::clone(&stale), builder).await;

        assert_eq!(stale.promise.state(), PromiseState::Resolved);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
        let ev = events.try_recv().expect("discard reported");
        assert_eq!(ev.kind, EventKind::IgnitionDiscarded);
        assert_eq!(ev.generation, Some(7));
        assert!(events.try_recv().is_err());
    }
}
