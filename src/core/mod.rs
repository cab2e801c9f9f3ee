//! Handle core: state machine, ignition and listener dispatch.
//!
//! The public API from this module is [`Handle`], [`HandleBuilder`] and
//! [`Status`].
//!
//! Internal modules:
//! - [`state`]: shared handle state (promise slot, builder, listeners);
//! - [`ignition`]: runs one ignition on the worker pool and settles its promise;
//! - [`listeners`]: append-only listener registry with exactly-once delivery;
//! - [`handle`]: public operations (access/build/close/rebuild/...);
//! - [`builder`]: assembles a handle with config, pool and subscribers.

mod builder;
mod handle;
mod ignition;
mod listeners;
mod state;
mod status;

pub use builder::HandleBuilder;
pub use handle::Handle;
pub use status::Status;

use std::any::Any;

/// Renders a caught panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
