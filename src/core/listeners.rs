//! # Append-only listener registry.
//!
//! Listeners are never removed. Each one remembers the highest epoch it was
//! delivered for; [`Listener::claim`] hands out a delivery right at most once
//! per epoch. Live dispatch and replay-on-registration both go through
//! `claim`, so a listener registered concurrently with a transition sees that
//! transition exactly once.
//!
//! ## Epochs
//! - start listeners: the ignition generation that resolved
//! - close listeners: the handle's close epoch (1 = initial empty state)

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Registered callback with its delivery watermark.
pub(crate) struct Listener<F: ?Sized> {
    delivered: AtomicU64,
    callback: Box<F>,
}

impl<F: ?Sized> Listener<F> {
    /// Claims delivery for `epoch`. Returns true for the first claim of an epoch
    /// newer than anything delivered so far; stale epochs are refused.
    pub(crate) fn claim(&self, epoch: u64) -> bool {
        self.delivered.fetch_max(epoch, Ordering::SeqCst) < epoch
    }

    pub(crate) fn callback(&self) -> &F {
        &self.callback
    }
}

/// Thread-safe, append-only list of listeners in registration order.
pub(crate) struct Listeners<F: ?Sized> {
    entries: RwLock<Vec<Arc<Listener<F>>>>,
}

impl<F: ?Sized> Listeners<F> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Appends a listener and returns its entry for an immediate replay check.
    pub(crate) fn register(&self, callback: Box<F>) -> Arc<Listener<F>> {
        let entry = Arc::new(Listener {
            delivered: AtomicU64::new(0),
            callback,
        });
        self.entries.write().push(Arc::clone(&entry));
        entry
    }

    /// Returns the listeners registered so far, in order.
    pub(crate) fn snapshot(&self) -> Vec<Arc<Listener<F>>> {
        self.entries.read().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    type Cb = dyn Fn() -> u8 + Send + Sync;

    #[test]
    fn claims_are_exactly_once_per_epoch() {
        let listeners: Listeners<Cb> = Listeners::new();
        let entry = listeners.register(Box::new(|| 1));

        assert!(entry.claim(1));
        assert!(!entry.claim(1));
        assert!(entry.claim(2));
        assert!(!entry.claim(1), "stale epoch must be refused");
        assert_eq!((entry.callback())(), 1);
    }

    #[test]
    fn racing_claims_grant_a_single_delivery() {
        let listeners: Listeners<Cb> = Listeners::new();
        let entry = listeners.register(Box::new(|| 1));
        let granted = AtomicUsize::new(0);

        for epoch in 1..=32 {
            std::thread::scope(|s| {
                for _ in 0..4 {
                    s.spawn(|| {
                        if entry.claim(epoch) {
                            granted.fetch_add(1, Ordering::SeqCst);
                        }
                    });
                }
            });
        }
        assert_eq!(granted.load(Ordering::SeqCst), 32);
    }

    #[test]
    fn snapshot_keeps_registration_order() {
        let listeners: Listeners<Cb> = Listeners::new();
        listeners.register(Box::new(|| 1));
        listeners.register(Box::new(|| 2));

        let order: Vec<u8> = listeners
            .snapshot()
            .iter()
            .map(|l| (l.callback())())
            .collect();
        assert_eq!(order, vec![1, 2]);
        assert_eq!(listeners.len(), 2);
    }
}
