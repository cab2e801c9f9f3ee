//! # Tokio-backed worker pool.
//!
//! [`TokioPool`] spawns each job as a tokio task, either on an explicit
//! runtime handle or on the runtime of the submitting context.

use futures::FutureExt;
use tokio::runtime;

use crate::pool::{Completion, Job, WorkerPool};

/// Worker pool that spawns jobs onto a tokio runtime.
///
/// Without an explicit runtime, [`submit`](WorkerPool::submit) must be called
/// from within a tokio runtime context.
#[derive(Clone, Debug, Default)]
pub struct TokioPool {
    runtime: Option<runtime::Handle>,
}

impl TokioPool {
    /// Pool that spawns on the runtime of whoever submits.
    pub fn new() -> Self {
        Self { runtime: None }
    }

    /// Pool pinned to a specific runtime.
    pub fn with_runtime(runtime: runtime::Handle) -> Self {
        Self {
            runtime: Some(runtime),
        }
    }

    /// Pool pinned to the current runtime, if called inside one.
    pub fn current() -> Option<Self> {
        runtime::Handle::try_current().ok().map(Self::with_runtime)
    }
}

impl WorkerPool for TokioPool {
    fn submit(&self, job: Job) -> Completion {
        let join = match &self.runtime {
            Some(rt) => rt.spawn(job),
            None => tokio::spawn(job),
        };
        join.map(|_joined| ()).boxed()
    }

    fn name(&self) -> &'static str {
        "tokio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn completion_follows_the_job() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let pool = TokioPool::new();

        pool.submit(
            async move {
                flag.store(true, Ordering::SeqCst);
            }
            .boxed(),
        )
        .await;

        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn current_captures_the_runtime() {
        assert!(TokioPool::current().is_some());
    }
}
