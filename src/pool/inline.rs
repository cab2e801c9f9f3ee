//! # Synchronous in-place pool.
//!
//! [`InlinePool`] drives each job to completion on the submitting thread before
//! `submit` returns. Ignition through it is deterministic, which makes it the
//! pool of choice for tests.
//!
//! ## Rules
//! - Jobs must not depend on the tokio timer or I/O drivers of the calling
//!   runtime (they are not polled while the thread is blocked here).
//! - `Handle::access()` becomes blocking for the duration of ignition, and
//!   also while a concurrent `close()` on another thread is still closing the
//!   previous resource. Do not mix it with concurrent closes on a single-threaded runtime.
//! - Jobs run outside tokio's cooperative budget so they cannot be parked
//!   by an exhausted budget of the surrounding task.

use futures::future::{self, FutureExt};

use crate::pool::{Completion, Job, WorkerPool};

/// Pool that runs jobs inline.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlinePool;

impl InlinePool {
    /// Construct a new [`InlinePool`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl WorkerPool for InlinePool {
    fn submit(&self, job: Job) -> Completion {
        futures::executor::block_on(tokio::task::unconstrained(job));
        future::ready(()).boxed()
    }

    fn name(&self) -> &'static str {
        "inline"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn job_has_run_when_submit_returns() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let _done = InlinePool.submit(
            async move {
                h.fetch_add(1, Ordering::SeqCst);
            }
            .boxed(),
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
