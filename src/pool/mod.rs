//! # Worker pools.
//!
//! Ignition never runs on a thread the handle manages itself; it is submitted to
//! an injected [`WorkerPool`]. Two implementations ship with the crate:
//! - [`TokioPool`] - spawns jobs onto a tokio runtime (default)
//! - [`InlinePool`] - runs jobs to completion on the submitting thread (tests)

mod inline;
mod tokio_pool;
mod worker_pool;

pub use inline::InlinePool;
pub use tokio_pool::TokioPool;
pub use worker_pool::{Completion, Job, PoolRef, WorkerPool};
