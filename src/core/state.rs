//! # Shared handle state.
//!
//! Every clone of a [`Handle`](crate::Handle) points at one [`Shared`]. It owns:
//! - the promise slot (`ArcSwapOption<Ignition>`), replaced atomically;
//! - the current builder;
//! - the start/close listener registries;
//! - the event bus and the worker pool.
//!
//! There is no lock around the slot. Two `tokio::sync::RwLock<()>` gates
//! order ignitions against `close()`:
//! - `teardown` orders promise settlement (readers, one per finishing
//!   ignition) against `close()` (writer), so a resource is either published
//!   and later closed by `close()`, or discarded and closed by its own
//!   ignition. Never both.
//! - `ignite_gate` is passed by every ignition before `Builder::ignite` runs.
//!   `close()` holds it for writing while it awaits `Resource::close`, so the
//!   next resource is not ignited while the previous one is still open.
//!   It is not taken when `close()` only cancels a pending ignition.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use futures::FutureExt;
use parking_lot::RwLock;
use tokio::sync::oneshot;
use tracing::warn;

use super::listeners::Listeners;
use super::panic_message;
use crate::builders::{BuilderRef, Resource};
use crate::config::Config;
use crate::events::{Bus, Event, EventKind};
use crate::pool::PoolRef;
use crate::promise::Promise;

/// Start listener: receives the freshly resolved resource.
pub(crate) type StartFn<R> = dyn Fn(&Arc<R>) + Send + Sync;

/// Close listener.
pub(crate) type CloseFn = dyn Fn() + Send + Sync;

/// One ignition attempt: the promise it settles and the generation it belongs to.
pub(crate) struct Ignition<R> {
    pub(crate) generation: u64,
    pub(crate) builder: Arc<str>,
    pub(crate) promise: Promise<R>,
}

impl<R> Ignition<R> {
    pub(crate) fn new(generation: u64, builder: &str) -> Self {
        Self {
            generation,
            builder: Arc::from(builder),
            promise: Promise::new(),
        }
    }

    /// Event pre-filled with this ignition's builder name and generation.
    pub(crate) fn event(&self, kind: EventKind) -> Event {
        Event::new(kind)
            .with_handle(Arc::clone(&self.builder))
            .with_generation(self.generation)
    }
}

pub(crate) struct Shared<R: Resource> {
    pub(crate) cfg: Config,
    pub(crate) pool: PoolRef,
    pub(crate) bus: Bus,
    pub(crate) builder: RwLock<BuilderRef<R>>,
    pub(crate) slot: ArcSwapOption<Ignition<R>>,
    pub(crate) teardown: tokio::sync::RwLock<()>,
    pub(crate) ignite_gate: tokio::sync::RwLock<()>,
    pub(crate) on_start: Listeners<StartFn<R>>,
    pub(crate) on_close: Listeners<CloseFn>,
    generations: AtomicU64,
    close_epoch: AtomicU64,
    /// Dropping the sender stops the subscriber forwarding task.
    _listener_stop: Option<oneshot::Sender<()>>,
}

impl<R: Resource> Shared<R> {
    pub(crate) fn new(
        cfg: Config,
        pool: PoolRef,
        bus: Bus,
        builder: BuilderRef<R>,
        listener_stop: Option<oneshot::Sender<()>>,
    ) -> Self {
        Self {
            cfg,
            pool,
            bus,
            builder: RwLock::new(builder),
            slot: ArcSwapOption::empty(),
            teardown: tokio::sync::RwLock::new(()),
            ignite_gate: tokio::sync::RwLock::new(()),
            on_start: Listeners::new(),
            on_close: Listeners::new(),
            generations: AtomicU64::new(0),
            close_epoch: AtomicU64::new(1),
            _listener_stop: listener_stop,
        }
    }

    pub(crate) fn publish(&self, ev: Event) {
        self.bus.publish(ev);
    }

    pub(crate) fn current_builder(&self) -> BuilderRef<R> {
        Arc::clone(&*self.builder.read())
    }

    pub(crate) fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Current close epoch; epoch 1 is the initial empty state.
    pub(crate) fn close_epoch(&self) -> u64 {
        self.close_epoch.load(Ordering::SeqCst)
    }

    /// Starts a new close epoch and returns it.
    pub(crate) fn bump_close_epoch(&self) -> u64 {
        self.close_epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns true if `ignition` still occupies the slot.
    pub(crate) fn is_current(&self, ignition: &Arc<Ignition<R>>) -> bool {
        let current = self.slot.load();
        matches!(&*current, Some(cur) if Arc::ptr_eq(cur, ignition))
    }

    /// Delivers `resource` to every start listener that has not seen this generation.
    pub(crate) fn dispatch_start(&self, ignition: &Ignition<R>, resource: &Arc<R>) {
        for listener in self.on_start.snapshot() {
            if listener.claim(ignition.generation) {
                self.run_listener(&ignition.builder, || (listener.callback())(resource));
            }
        }
    }

    /// Runs every close listener that has not seen `epoch`.
    pub(crate) fn dispatch_close(&self, name: &str, epoch: u64) {
        for listener in self.on_close.snapshot() {
            if listener.claim(epoch) {
                self.run_listener(name, || (listener.callback())());
            }
        }
    }

    /// Runs one listener callback; a panic is reported and swallowed.
    pub(crate) fn run_listener(&self, name: &str, f: impl FnOnce()) {
        if let Err(panic_err) = std::panic::catch_unwind(AssertUnwindSafe(f)) {
            let info = panic_message(&*panic_err);
            warn!(target: "ignis", handle = name, reason = %info, "listener panicked");
            self.publish(
                Event::new(EventKind::ListenerPanicked)
                    .with_handle(name)
                    .with_reason(info),
            );
        }
    }

    /// Closes a resource produced by `ignition`. Errors and panics are reported, not returned.
    pub(crate) async fn close_resource(&self, ignition: &Ignition<R>, resource: &Arc<R>) {
        let reason = match AssertUnwindSafe(resource.close()).catch_unwind().await {
            Ok(Ok(())) => return,
            Ok(Err(err)) => err.to_string(),
            Err(panic_err) => format!("panic: {}", panic_message(&*panic_err)),
        };
        warn!(
            target: "ignis",
            handle = %ignition.builder,
            generation = ignition.generation,
            reason = %reason,
            "resource close failed"
        );
        self.publish(ignition.event(EventKind::CloseFailed).with_reason(reason));
    }
}
