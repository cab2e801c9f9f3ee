//! # ignis
//!
//! **Ignis** supervises one resource at a time behind a rebindable handle.
//!
//! A [`Builder`] knows how to ignite a [`Resource`] (a connection pool, a client,
//! a server socket). A [`Handle`] owns the current ignition as a [`Promise`],
//! runs ignitions on an injected [`WorkerPool`], and can close, rebuild, or
//! swap the builder at runtime with optional rollback.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐        ┌──────────────┐
//!     │   Builder    │        │   Builder    │
//!     │    ("v1")    │        │    ("v2")    │   (rebuild_with)
//!     └──────┬───────┘        └──────┬───────┘
//!            ▼                       ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Handle (shared state, cheap clones)                              │
//! │  - promise slot (ArcSwapOption, replaced atomically)              │
//! │  - current builder                                                │
//! │  - on_start / on_close listeners (append-only, exactly-once)      │
//! │  - Bus (broadcast events)                                         │
//! └──────┬──────────────────────────────────────────────────────┬─────┘
//!        │ submit(ignition)                                     │
//!        ▼                                                      │
//!     ┌──────────────┐                                          │
//!     │  WorkerPool  │  TokioPool / InlinePool / custom         │
//!     └──────┬───────┘                                          │
//!            │ Publishes:                                       │
//!            │ - IgnitionStarting / Succeeded / Failed          │
//!            │ - IgnitionDiscarded / Cancelled                  │
//!            │ - HandleClosed, CloseFailed, ListenerPanicked    │
//!            ▼                                                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                   (capacity: Config::bus_capacity)                │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                            (per-sub queues)
//!                         ┌─────────┼─────────┐
//!                         ▼         ▼         ▼
//!                      worker1   worker2   workerN
//! ```
//!
//! ### Lifecycle
//! ```text
//! Inactive ──access()/build()──► Starting ──ignite Ok──► Active
//!                                    │                     │
//!                                    └──ignite Err──► FailedBuild
//!
//! close():   Active      ─► resource.close(), close listeners, Inactive
//!            Starting    ─► promise cancelled, late resource closed, Inactive
//!            FailedBuild ─► close listeners, Inactive
//!
//! rebuild_with(new, rollback):
//!   close() ─► ignite(new) ─┬─ Ok  ─► adopt new builder, true
//!                           └─ Err ─┬─ rollback=false ─► false
//!                                   └─ rollback=true  ─► ignite(previous), false
//!                                                        (fails ─► RollbackFailed)
//! ```
//!
//! ## Features
//! | Area              | Description                                                        | Key types / traits                     |
//! |-------------------|--------------------------------------------------------------------|----------------------------------------|
//! | **Handles**       | Lazy/eager ignition, close, rebuild with rollback, listeners.      | [`Handle`], [`HandleBuilder`]          |
//! | **Builders**      | Resource factories with write-once metadata.                       | [`Builder`], [`BuilderFn`], [`Metadata`] |
//! | **Promises**      | Single-assignment results of one ignition.                         | [`Promise`], [`PromiseState`]          |
//! | **Pools**         | Where ignitions run.                                               | [`WorkerPool`], [`TokioPool`], [`InlinePool`] |
//! | **Subscriber API**| Hook into handle lifecycle events (logging, metrics).              | [`Subscribe`]                          |
//! | **Errors**        | Typed errors for ignition and handle operations.                   | [`BuildError`], [`HandleError`]        |
//! | **Configuration** | Per-handle settings.                                               | [`Config`]                             |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] rendering events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use ignis::{BoxError, BuildError, BuilderFn, Handle};
//!
//! struct Client { endpoint: &'static str }
//!
//! #[async_trait]
//! impl ignis::Resource for Client {
//!     async fn close(&self) -> Result<(), BoxError> { Ok(()) }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn ignis::Subscribe>> = vec![Arc::new(ignis::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn ignis::Subscribe>> = Vec::new();
//!
//!     let primary = BuilderFn::arc("primary", || async {
//!         Ok::<_, BuildError>(Client { endpoint: "10.0.0.1" })
//!     });
//!     let handle = Handle::configure(primary).with_subscribers(subs).build();
//!
//!     let client = handle.build().await?;
//!     assert_eq!(client.endpoint, "10.0.0.1");
//!
//!     // Swap to a replica; on failure the primary is reignited.
//!     let replica = BuilderFn::arc("replica", || async {
//!         Ok::<_, BuildError>(Client { endpoint: "10.0.0.2" })
//!     });
//!     assert!(handle.rebuild_with(replica, true).await?);
//!
//!     handle.close().await;
//!     Ok(())
//! }
//! ```
mod builders;
mod config;
mod core;
mod error;
mod events;
mod pool;
mod promise;
mod subscribers;

// ---- Public re-exports ----

pub use builders::{Builder, BuilderFn, BuilderRef, Metadata, MetadataValue, MetadataView, Resource};
pub use config::Config;
pub use core::{Handle, HandleBuilder, Status};
pub use error::{BoxError, BuildError, HandleError};
pub use events::{Bus, Event, EventKind};
pub use pool::{Completion, InlinePool, Job, PoolRef, TokioPool, WorkerPool};
pub use promise::{Promise, PromiseState};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
