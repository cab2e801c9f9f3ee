//! # Single-assignment promise.
//!
//! [`Promise`] is the handle's view of one ignition. It starts pending and is
//! settled exactly once: resolved with the resource, rejected with a
//! [`BuildError`], or cancelled by `Handle::close()`. Later settle attempts are
//! refused (`false`), which is how a superseded ignition learns it lost.
//!
//! ## Architecture
//! ```text
//! Promise (clone) ─┐
//! Promise (clone) ─┼──► Arc<watch::Sender<Option<Settled>>>
//! ignition task  ──┘          │
//!        resolve/reject/cancel └──► send_if_modified(None → Some)   (single writer wins)
//!
//! wait() ──► subscribe() ──► wait_for(is_some) ──► Ok(resource) | Err(HandleError)
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::error::{BuildError, HandleError};

/// Observable state of a [`Promise`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseState {
    /// Ignition still running.
    Pending,
    /// Ignition produced a resource.
    Resolved,
    /// Ignition failed.
    Rejected,
    /// Ignition was invalidated before it settled.
    Cancelled,
}

enum Settled<R> {
    Resolved(Arc<R>),
    Rejected(Arc<BuildError>),
    Cancelled,
}

impl<R> Clone for Settled<R> {
    fn clone(&self) -> Self {
        match self {
            Settled::Resolved(r) => Settled::Resolved(Arc::clone(r)),
            Settled::Rejected(e) => Settled::Rejected(Arc::clone(e)),
            Settled::Cancelled => Settled::Cancelled,
        }
    }
}

impl<R> Settled<R> {
    fn state(&self) -> PromiseState {
        match self {
            Settled::Resolved(_) => PromiseState::Resolved,
            Settled::Rejected(_) => PromiseState::Rejected,
            Settled::Cancelled => PromiseState::Cancelled,
        }
    }

    fn into_result(self) -> Result<Arc<R>, HandleError> {
        match self {
            Settled::Resolved(r) => Ok(r),
            Settled::Rejected(e) => Err(HandleError::Build(e)),
            Settled::Cancelled => Err(HandleError::Cancelled),
        }
    }
}

/// Single-assignment future of a resource.
///
/// Cheap to clone; all clones observe the same settlement.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use ignis::{Promise, PromiseState};
///
/// let p: Promise<u32> = Promise::new();
/// assert!(p.try_get().is_none());
///
/// assert!(p.resolve(Arc::new(7)));
/// assert!(!p.cancel()); // already settled
/// assert_eq!(p.state(), PromiseState::Resolved);
/// assert_eq!(p.try_get().as_deref(), Some(&7));
/// ```
pub struct Promise<R> {
    tx: Arc<watch::Sender<Option<Settled<R>>>>,
}

impl<R> Clone for Promise<R> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<R> Default for Promise<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Promise<R> {
    /// Creates a pending promise.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Creates a promise already resolved with `value`.
    pub fn resolved(value: Arc<R>) -> Self {
        let p = Self::new();
        p.resolve(value);
        p
    }

    /// Creates a promise already rejected with `err`.
    pub fn rejected(err: BuildError) -> Self {
        let p = Self::new();
        p.reject(err);
        p
    }

    /// Resolves the promise. Returns `false` if it was already settled.
    pub fn resolve(&self, value: Arc<R>) -> bool {
        self.settle(Settled::Resolved(value))
    }

    /// Rejects the promise. Returns `false` if it was already settled.
    pub fn reject(&self, err: BuildError) -> bool {
        self.settle(Settled::Rejected(Arc::new(err)))
    }

    /// Cancels the promise. Returns `false` if it was already settled.
    pub fn cancel(&self) -> bool {
        self.settle(Settled::Cancelled)
    }

    fn settle(&self, outcome: Settled<R>) -> bool {
        self.tx.send_if_modified(move |slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(outcome);
            true
        })
    }

    /// Returns the current state without waiting.
    pub fn state(&self) -> PromiseState {
        self.tx
            .borrow()
            .as_ref()
            .map_or(PromiseState::Pending, Settled::state)
    }

    /// Returns true while the promise is unsettled.
    pub fn is_pending(&self) -> bool {
        self.state() == PromiseState::Pending
    }

    /// Returns true if the promise resolved with a resource.
    pub fn is_resolved(&self) -> bool {
        self.state() == PromiseState::Resolved
    }

    /// Returns the resource if resolved; `None` while pending, rejected or cancelled.
    pub fn try_get(&self) -> Option<Arc<R>> {
        match self.tx.borrow().as_ref() {
            Some(Settled::Resolved(r)) => Some(Arc::clone(r)),
            _ => None,
        }
    }

    /// Returns the ignition error if the promise was rejected.
    pub fn error(&self) -> Option<Arc<BuildError>> {
        match self.tx.borrow().as_ref() {
            Some(Settled::Rejected(e)) => Some(Arc::clone(e)),
            _ => None,
        }
    }

    /// Returns true if both values are clones of the same promise.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tx, &other.tx)
    }

    /// Waits until the promise settles.
    ///
    /// - resolved → `Ok(resource)`
    /// - rejected → `HandleError::Build`
    /// - cancelled → `HandleError::Cancelled`
    pub async fn wait(&self) -> Result<Arc<R>, HandleError> {
        let mut rx = self.tx.subscribe();
        let settled = match rx.wait_for(Option::is_some).await {
            Ok(slot) => slot.clone(),
            Err(_closed) => None,
        };
        settled.map_or(Err(HandleError::Cancelled), Settled::into_result)
    }

    /// Waits at most `timeout` for the promise to settle.
    ///
    /// Fails with `HandleError::Timeout` if it is still pending afterwards.
    pub async fn wait_timeout(&self, timeout: Duration) -> Result<Arc<R>, HandleError> {
        match tokio::time::timeout(timeout, self.wait()).await {
            Ok(res) => res,
            Err(_elapsed) => Err(HandleError::Timeout { timeout }),
        }
    }
}

impl<R> fmt::Debug for Promise<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_first_settlement_counts() {
        let p: Promise<u8> = Promise::new();
        assert!(p.is_pending());
        assert!(p.reject(BuildError::msg("first")));
        assert!(!p.resolve(Arc::new(1)));
        assert!(!p.cancel());
        assert_eq!(p.state(), PromiseState::Rejected);
        assert!(p.try_get().is_none());
        assert!(p.error().is_some());
    }

    #[tokio::test]
    async fn waiters_wake_on_resolve() {
        let p: Promise<u8> = Promise::new();
        let waiter = {
            let p = p.clone();
            tokio::spawn(async move { p.wait().await })
        };
        tokio::task::yield_now().await;
        p.resolve(Arc::new(9));

        let got = waiter.await.ok().and_then(Result::ok);
        assert_eq!(got.as_deref(), Some(&9));
    }

    #[tokio::test]
    async fn cancelled_waiters_fail_instead_of_hanging() {
        let p: Promise<u8> = Promise::new();
        let waiter = {
            let p = p.clone();
            tokio::spawn(async move { p.wait().await })
        };
        tokio::task::yield_now().await;
        p.cancel();

        let res = waiter.await.ok().map(|r| r.err().map(|e| e.as_label()));
        assert_eq!(res, Some(Some("handle_cancelled")));
    }

    #[tokio::test]
    async fn pending_wait_times_out() {
        let p: Promise<u8> = Promise::new();
        let res = p.wait_timeout(Duration::from_millis(10)).await;
        assert!(matches!(res, Err(HandleError::Timeout { .. })));
    }
}
