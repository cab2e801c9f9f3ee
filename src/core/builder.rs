use std::sync::Arc;

use tokio::sync::{broadcast, oneshot};

use super::{handle::Handle, state::Shared};
use crate::{
    builders::{BuilderRef, Resource},
    config::Config,
    events::{Bus, Event},
    pool::{PoolRef, TokioPool, WorkerPool},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Handle`] with optional features.
pub struct HandleBuilder<R: Resource> {
    builder: BuilderRef<R>,
    cfg: Config,
    pool: Option<PoolRef>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl<R: Resource> HandleBuilder<R> {
    /// Creates a new builder around the resource builder, with default configuration.
    pub fn new(builder: BuilderRef<R>) -> Self {
        Self {
            builder,
            cfg: Config::default(),
            pool: None,
            subscribers: Vec::new(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the worker pool ignitions run on.
    ///
    /// Default: a [`TokioPool`] pinned to the runtime [`build`](Self::build)
    /// is called from, if any.
    pub fn with_pool(self, pool: impl WorkerPool) -> Self {
        self.with_pool_ref(Arc::new(pool))
    }

    /// Sets a shared worker pool.
    pub fn with_pool_ref(mut self, pool: PoolRef) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive handle events (ignition, close, rollback, failures)
    /// through dedicated workers with bounded queues. Requires a tokio runtime
    /// at [`build`](Self::build) time when non-empty.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the handle. Nothing is ignited yet.
    ///
    /// Initializes:
    /// - Event bus for broadcasting
    /// - Subscriber workers and the task forwarding bus events to them
    pub fn build(self) -> Handle<R> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let pool = self
            .pool
            .unwrap_or_else(|| Arc::new(TokioPool::current().unwrap_or_default()));

        let listener_stop = if self.subscribers.is_empty() {
            None
        } else {
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            let (stop_tx, stop_rx) = oneshot::channel();
            subscriber_listener(set, bus.subscribe(), stop_rx);
            Some(stop_tx)
        };

        let shared = Shared::new(self.cfg, pool, bus, self.builder, listener_stop);
        Handle::from_shared(Arc::new(shared))
    }
}

/// Forwards bus events to the subscriber set until the handle is dropped.
fn subscriber_listener(
    set: SubscriberSet,
    mut rx: broadcast::Receiver<Event>,
    mut stop: oneshot::Receiver<()>,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut stop => break,
                ev = rx.recv() => match ev {
                    Ok(ev) => set.emit(ev),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
        while let Ok(ev) = rx.try_recv() {
            set.emit(ev);
        }
        set.shutdown().await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::BuilderFn;
    use crate::error::{BoxError, BuildError};
    use async_trait::async_trait;

    struct Conn;

    #[async_trait]
    impl Resource for Conn {
        async fn close(&self) -> Result<(), BoxError> {
            Ok(())
        }
    }

    fn conn() -> BuilderRef<Conn> {
        BuilderFn::arc("conn", || async { Ok::<_, BuildError>(Conn) })
    }

    #[test]
    fn default_pool_is_pinned_to_the_building_runtime() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let handle = rt.block_on(async { HandleBuilder::new(conn()).build() });

        // No runtime context here; the ignition is spawned onto `rt`.
        let promise = handle.access().expect("lazy");
        let resolved = rt.block_on(promise.wait());

        assert!(resolved.is_ok());
        assert!(handle.is_present());
    }
}
