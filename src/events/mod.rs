//! Handle events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by handles, ignition jobs
//! and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Handle` operations, ignition jobs, listener dispatch,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the subscriber listener spawned by `HandleBuilder`
//!   (fans out to `SubscriberSet`), and any receiver from `Handle::events()`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
