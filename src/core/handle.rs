//! # Handle: rebindable supervisor of one resource.
//!
//! A [`Handle`] owns at most one [`Promise`] at a time. Everything else
//! (status, presence, listener replay) is derived from that promise.
//!
//! ## Lifecycle
//! ```text
//!             access()/build()                 ignite Ok
//! Inactive ─────────────────────► Starting ───────────────► Active
//!    ▲                               │                        │
//!    │                     ignite Err│                        │
//!    │                               ▼                        │
//!    │◄────────── close() ────── FailedBuild                  │
//!    │◄──────────────────────────── close() ──────────────────┘
//! ```
//!
//! ## Rules
//! - One ignition in flight per handle: concurrent `access()`/`build()` share it.
//! - `close()` is idempotent and never fails; a pending ignition is cancelled and
//!   its late result is closed instead of published.
//! - An ignition started while `close()` is still closing the previous resource
//!   does not call `ignite()` until that close returns.
//! - `rebuild_with` adopts the new builder only when it ignites successfully.
//! - Start listeners see each activation once; close listeners each deactivation once.
//!
//! ## Example
//! ```rust
//! use ignis::{BoxError, BuildError, BuilderFn, Handle, InlinePool, Resource};
//! use async_trait::async_trait;
//!
//! struct Conn;
//!
//! #[async_trait]
//! impl Resource for Conn {
//!     async fn close(&self) -> Result<(), BoxError> { Ok(()) }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let handle = Handle::configure(BuilderFn::arc("conn", || async { Ok::<_, BuildError>(Conn) }))
//!     .with_pool(InlinePool::new())
//!     .build();
//!
//! assert!(!handle.is_present());
//! handle.build().await.unwrap();
//! assert!(handle.is_present());
//!
//! handle.close().await;
//! assert!(handle.is_empty());
//! # });
//! ```

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::broadcast;

use super::builder::HandleBuilder;
use super::ignition::run_ignition;
use super::state::{Ignition, Shared};
use super::status::Status;
use crate::builders::{BuilderRef, MetadataView, Resource};
use crate::config::Config;
use crate::error::HandleError;
use crate::events::{Event, EventKind};
use crate::pool::Completion;
use crate::promise::{Promise, PromiseState};

/// How [`Handle::start`] treats the promise already in the slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Start {
    /// Reuse any existing promise.
    Access,
    /// Join a pending promise, retry a rejected one, refuse a resolved one.
    Build,
    /// Supersede anything that is not resolved.
    Replace,
}

/// Rebindable handle over an asynchronously ignited resource.
///
/// Cloning is cheap; clones share state. Two handles are equal when their
/// current builders have the same name.
pub struct Handle<R: Resource> {
    shared: Arc<Shared<R>>,
}

impl<R: Resource> Clone for Handle<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R: Resource> Handle<R> {
    /// Creates an un-ignited handle with default [`Config`] and a tokio pool.
    ///
    /// The pool is pinned to the runtime `new` is called from. Outside a
    /// runtime it spawns onto the caller's runtime at ignition time, so
    /// [`access`](Self::access) must then run inside one; use
    /// [`configure`](Self::configure) with an explicit pool otherwise.
    pub fn new(builder: BuilderRef<R>) -> Self {
        HandleBuilder::new(builder).build()
    }

    /// Starts configuring a handle (config, pool, subscribers).
    pub fn configure(builder: BuilderRef<R>) -> HandleBuilder<R> {
        HandleBuilder::new(builder)
    }

    pub(crate) fn from_shared(shared: Arc<Shared<R>>) -> Self {
        Self { shared }
    }

    // ---- queries ----

    /// Returns the handle configuration.
    pub fn config(&self) -> &Config {
        &self.shared.cfg
    }

    /// Returns the current builder.
    pub fn builder(&self) -> BuilderRef<R> {
        self.shared.current_builder()
    }

    /// Returns the name of the current builder.
    pub fn name(&self) -> String {
        self.builder().name().to_string()
    }

    /// Returns the current status.
    pub fn status(&self) -> Status {
        let current = self.shared.slot.load();
        Status::from_promise(Option::as_ref(&*current).map(|ign| ign.promise.state()))
    }

    /// Returns true iff the current promise is resolved.
    pub fn is_present(&self) -> bool {
        self.status() == Status::Active
    }

    /// Alias of [`is_present`](Self::is_present).
    pub fn exists(&self) -> bool {
        self.is_present()
    }

    /// Negation of [`is_present`](Self::is_present).
    pub fn is_empty(&self) -> bool {
        !self.is_present()
    }

    /// Returns the resolved resource without waiting or igniting.
    pub fn get(&self) -> Option<Arc<R>> {
        self.current().and_then(|p| p.try_get())
    }

    /// Returns the current promise, if any, without igniting.
    pub fn current(&self) -> Option<Promise<R>> {
        let current = self.shared.slot.load();
        Option::as_ref(&*current).map(|ign| ign.promise.clone())
    }

    /// Immutable snapshot of the current builder's metadata.
    pub fn metadata(&self) -> MetadataView {
        self.builder().get_metadata()
    }

    /// Typed lookup of one metadata entry of the current builder.
    pub fn metadata_value<T>(&self, key: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.builder().metadata().get::<T>(key)
    }

    /// Subscribes to the handle's event bus.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe()
    }

    // ---- ignition ----

    /// Returns the current promise, igniting one first if none exists.
    ///
    /// Never waits. Concurrent callers share one promise. A non-lazy handle
    /// that was never built returns `None`. A failed ignition is reported
    /// through the returned promise, not here.
    ///
    /// # Panics
    /// With the default [`TokioPool`](crate::TokioPool) created outside a
    /// runtime, igniting panics unless called from within a tokio runtime.
    pub fn access(&self) -> Option<Promise<R>> {
        if let Some(p) = self.current() {
            return Some(p);
        }
        if !self.shared.cfg.lazy {
            return None;
        }
        self.start(Start::Access, self.builder()).ok()
    }

    /// Ignites the resource and waits for the outcome.
    ///
    /// Joins an ignition already in flight. Retries after a failed one.
    ///
    /// # Errors
    /// - [`HandleError::AlreadyActive`] if a resource is resolved;
    /// - [`HandleError::Build`] if ignition fails;
    /// - [`HandleError::Cancelled`] if the handle is closed meanwhile.
    pub async fn build(&self) -> Result<Arc<R>, HandleError> {
        self.start(Start::Build, self.builder())?.wait().await
    }

    /// Waits for the resource using the configured timeout (zero = unbounded).
    ///
    /// Lazy handles ignite on first use.
    ///
    /// # Errors
    /// [`HandleError::NotPresent`], [`HandleError::Timeout`], the rejected
    /// [`HandleError::Build`] or [`HandleError::Cancelled`].
    pub async fn observe(&self) -> Result<Arc<R>, HandleError> {
        let promise = self.access().ok_or(HandleError::NotPresent)?;
        match self.shared.cfg.observe_timeout() {
            Some(timeout) => promise.wait_timeout(timeout).await,
            None => promise.wait().await,
        }
    }

    /// Waits at most `timeout` for the resource; zero checks once without waiting.
    ///
    /// # Errors
    /// Same as [`observe`](Self::observe).
    pub async fn observe_within(&self, timeout: Duration) -> Result<Arc<R>, HandleError> {
        let promise = self.access().ok_or(HandleError::NotPresent)?;
        if !timeout.is_zero() {
            return promise.wait_timeout(timeout).await;
        }
        match promise.state() {
            PromiseState::Resolved => promise.try_get().ok_or(HandleError::NotPresent),
            PromiseState::Rejected => Err(promise
                .error()
                .map_or(HandleError::NotPresent, HandleError::Build)),
            PromiseState::Cancelled => Err(HandleError::Cancelled),
            PromiseState::Pending => Err(HandleError::NotPresent),
        }
    }

    /// Installs a new ignition according to `mode` and submits it to the pool.
    fn start(&self, mode: Start, builder: BuilderRef<R>) -> Result<Promise<R>, HandleError> {
        let shared = &self.shared;
        loop {
            let current = shared.slot.load_full();
            if let Some(ign) = &current {
                match (mode, ign.promise.state()) {
                    (Start::Access, _) => return Ok(ign.promise.clone()),
                    (_, PromiseState::Resolved) => return Err(HandleError::AlreadyActive),
                    (Start::Build, PromiseState::Pending) => return Ok(ign.promise.clone()),
                    (Start::Replace, PromiseState::Pending) => {
                        // Cancel before the swap; a late resolve is then discarded by its ignition.
                        if !ign.promise.cancel() {
                            continue;
                        }
                        shared.publish(ign.event(EventKind::IgnitionCancelled));
                    }
                    _ => {}
                }
            }

            let next = Arc::new(Ignition::new(shared.next_generation(), builder.name()));
            let prev = shared
                .slot
                .compare_and_swap(&current, Some(Arc::clone(&next)));
            if !same_ignition(&*prev, &current) {
                continue;
            }
            shared.publish(next.event(EventKind::IgnitionStarting));

            let promise = next.promise.clone();
            let job = run_ignition(Arc::clone(shared), next, builder);
            drop(shared.pool.submit(job.boxed()));
            return Ok(promise);
        }
    }

    // ---- presence-dependent callbacks ----

    /// Runs exactly one of the callbacks depending on presence, waiting at
    /// most `timeout` for a pending ignition. Does not start an ignition.
    pub async fn compute<T>(
        &self,
        on_present: impl FnOnce(Arc<R>) -> T,
        on_absent: impl FnOnce() -> T,
        timeout: Duration,
    ) -> T {
        match self.present_within(timeout).await {
            Some(resource) => on_present(resource),
            None => on_absent(),
        }
    }

    /// Calls `f` with the resource if it is present right now.
    pub fn if_present(&self, f: impl FnOnce(Arc<R>)) {
        if let Some(resource) = self.get() {
            f(resource);
        }
    }

    /// Calls `f` if no resource is present right now.
    pub fn if_absent(&self, f: impl FnOnce()) {
        if self.is_empty() {
            f();
        }
    }

    /// Immediate variant that forwards the callback's result.
    ///
    /// # Errors
    /// Whatever the selected callback returns.
    pub fn execute_now<T, E>(
        &self,
        on_present: impl FnOnce(Arc<R>) -> Result<T, E>,
        on_absent: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        match self.get() {
            Some(resource) => on_present(resource),
            None => on_absent(),
        }
    }

    /// Waits at most `timeout`, then behaves like [`execute_now`](Self::execute_now).
    ///
    /// # Errors
    /// Whatever the selected callback returns.
    pub async fn execute_locking<T, E>(
        &self,
        on_present: impl FnOnce(Arc<R>) -> Result<T, E>,
        on_absent: impl FnOnce() -> Result<T, E>,
        timeout: Duration,
    ) -> Result<T, E> {
        match self.present_within(timeout).await {
            Some(resource) => on_present(resource),
            None => on_absent(),
        }
    }

    /// Runs `consumer` on the worker pool once the resource resolves.
    ///
    /// Returns `None` (and drops `consumer`) when there is no live or pending
    /// promise. The job gives up if nothing resolves within `timeout`
    /// (zero = only if already resolved).
    pub fn execute_parallel<F>(&self, consumer: F, timeout: Duration) -> Option<Completion>
    where
        F: FnOnce(Arc<R>) + Send + 'static,
    {
        let promise = self.current()?;
        if !matches!(
            promise.state(),
            PromiseState::Pending | PromiseState::Resolved
        ) {
            return None;
        }

        let job = async move {
            let resource = if timeout.is_zero() {
                promise.try_get()
            } else {
                promise.wait_timeout(timeout).await.ok()
            };
            if let Some(resource) = resource {
                consumer(resource);
            }
        };
        Some(self.shared.pool.submit(job.boxed()))
    }

    async fn present_within(&self, timeout: Duration) -> Option<Arc<R>> {
        if timeout.is_zero() {
            return self.get();
        }
        let promise = self.current()?;
        promise.wait_timeout(timeout).await.ok()
    }

    // ---- listeners ----

    /// Registers a start listener.
    ///
    /// Called immediately if a resource is present, then once per activation.
    pub fn on_start<F>(&self, listener: F)
    where
        F: Fn(&Arc<R>) + Send + Sync + 'static,
    {
        let entry = self.shared.on_start.register(Box::new(listener));

        let current = self.shared.slot.load_full();
        if let Some(ign) = current {
            if let Some(resource) = ign.promise.try_get() {
                if entry.claim(ign.generation) {
                    self.shared
                        .run_listener(&ign.builder, || (entry.callback())(&resource));
                }
            }
        }
    }

    /// Registers a close listener.
    ///
    /// Called immediately if no resource is present, then once per deactivation.
    pub fn on_close<F>(&self, listener: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let entry = self.shared.on_close.register(Box::new(listener));

        if self.is_empty() && entry.claim(self.shared.close_epoch()) {
            let name = self.name();
            self.shared.run_listener(&name, || (entry.callback())());
        }
    }

    // ---- teardown / rebuild ----

    /// Releases the current promise.
    ///
    /// - resolved: the resource is closed; close errors are logged, not returned;
    /// - pending: the promise is cancelled and waiters get [`HandleError::Cancelled`];
    /// - nothing: no-op.
    ///
    /// Close listeners run afterwards. Idempotent.
    pub async fn close(&self) {
        let shared = &self.shared;
        let gate = shared.teardown.write().await;

        let resolved = match &*shared.slot.load() {
            None => return,
            Some(cur) => cur.promise.state() == PromiseState::Resolved,
        };
        // Held until the resource is closed; the next ignition waits on it.
        let ignite_gate = if resolved {
            Some(shared.ignite_gate.write().await)
        } else {
            None
        };

        let epoch = shared.bump_close_epoch();
        let Some(released) = shared.slot.swap(None) else {
            return;
        };

        if released.promise.cancel() {
            shared.publish(released.event(EventKind::IgnitionCancelled));
        } else if let Some(resource) = released.promise.try_get() {
            shared.close_resource(&released, &resource).await;
        }
        drop(ignite_gate);
        drop(gate);

        shared.dispatch_close(&released.builder, epoch);
        shared.publish(released.event(EventKind::HandleClosed));
    }

    /// `close()` followed by `build()` with the current builder.
    ///
    /// # Errors
    /// Same as [`build`](Self::build).
    pub async fn rebuild(&self) -> Result<Arc<R>, HandleError> {
        self.close().await;
        self.build().await
    }

    /// Closes the handle and ignites `builder` in place of the current one.
    ///
    /// Returns `Ok(true)` when `builder` ignited and was adopted. On failure
    /// the current builder is kept and `Ok(false)` is returned; with
    /// `rollback` the previous builder is reignited first (awaited), without it
    /// the handle is left without a resource.
    ///
    /// # Errors
    /// - [`HandleError::AlreadyActive`] if another caller built concurrently;
    /// - [`HandleError::RollbackFailed`] if the rollback ignition failed too.
    pub async fn rebuild_with(
        &self,
        builder: BuilderRef<R>,
        rollback: bool,
    ) -> Result<bool, HandleError> {
        let previous = self.builder();
        self.close().await;

        let attempt = match self.start(Start::Replace, Arc::clone(&builder)) {
            Ok(promise) => promise.wait().await,
            Err(err) => Err(err),
        };
        let err = match attempt {
            Ok(_) => {
                let name = builder.name().to_string();
                *self.shared.builder.write() = builder;
                self.shared
                    .publish(Event::new(EventKind::BuilderAdopted).with_handle(name));
                return Ok(true);
            }
            Err(HandleError::AlreadyActive) => return Err(HandleError::AlreadyActive),
            Err(err) => err,
        };
        if !rollback {
            return Ok(false);
        }

        self.shared.publish(
            Event::new(EventKind::RollbackStarted)
                .with_handle(previous.name())
                .with_reason(err.as_message()),
        );
        let restored = match self.start(Start::Replace, Arc::clone(&previous)) {
            Ok(promise) => promise.wait().await,
            Err(err) => Err(err),
        };
        match restored {
            Ok(_) => Ok(false),
            Err(rollback_err) => {
                self.shared.publish(
                    Event::new(EventKind::RollbackFailed)
                        .with_handle(previous.name())
                        .with_reason(rollback_err.as_message()),
                );
                Err(HandleError::RollbackFailed {
                    attempt: Box::new(err),
                    rollback: Box::new(rollback_err),
                })
            }
        }
    }

    /// [`rebuild_with`](Self::rebuild_with) using the configured rollback flag.
    ///
    /// # Errors
    /// Same as [`rebuild_with`](Self::rebuild_with).
    pub async fn reignite(&self, builder: BuilderRef<R>) -> Result<bool, HandleError> {
        self.rebuild_with(builder, self.shared.cfg.rollback).await
    }
}

fn same_ignition<R>(a: &Option<Arc<Ignition<R>>>, b: &Option<Arc<Ignition<R>>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

impl<R: Resource> PartialEq for Handle<R> {
    fn eq(&self, other: &Self) -> bool {
        self.builder().name() == other.builder().name()
    }
}

impl<R: Resource> Eq for Handle<R> {}

impl<R: Resource> Hash for Handle<R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.builder().name().hash(state);
    }
}

impl<R: Resource> fmt::Debug for Handle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("builder", &self.name())
            .field("status", &self.status())
            .field("start_listeners", &self.shared.on_start.len())
            .field("close_listeners", &self.shared.on_close.len())
            .finish()
    }
}
