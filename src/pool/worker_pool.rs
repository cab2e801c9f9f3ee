//! # Worker pool capability.
//!
//! [`WorkerPool`] has a single operation: submit a unit of work and get back a
//! future that completes when the work has run. Pools hold no handle-specific
//! state and may be shared by any number of handles.

use std::sync::Arc;

use futures::future::BoxFuture;

/// Unit of work submitted to a pool.
pub type Job = BoxFuture<'static, ()>;

/// Future that completes once a submitted [`Job`] finished (or was dropped by the pool).
pub type Completion = BoxFuture<'static, ()>;

/// Shared reference to a pool.
pub type PoolRef = Arc<dyn WorkerPool>;

/// Executes submitted jobs.
///
/// # Example
/// ```
/// use futures::future::FutureExt;
/// use ignis::{Completion, Job, WorkerPool};
///
/// struct Blocking;
///
/// impl WorkerPool for Blocking {
///     fn submit(&self, job: Job) -> Completion {
///         futures::executor::block_on(job);
///         futures::future::ready(()).boxed()
///     }
/// }
/// ```
pub trait WorkerPool: Send + Sync + 'static {
    /// Runs `job` and returns a future resolving when it is done.
    ///
    /// The returned future does not need to be polled for the job to make progress.
    fn submit(&self, job: Job) -> Completion;

    /// Returns the pool name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
