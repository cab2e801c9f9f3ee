//! # Handle configuration.
//!
//! Provides [`Config`] centralized settings for a [`Handle`](crate::Handle).
//!
//! ## Sentinel values
//! - `timeout = 0s` → `observe()` waits without bound
//! - `bus_capacity = 0` → clamped to 1 by the bus

use std::time::Duration;

/// Configuration for a single handle.
///
/// ## Field semantics
/// - `lazy`: ignite on first `access()` (`true`) or only on explicit `build()` (`false`)
/// - `rollback`: fallback used by [`Handle::reignite`](crate::Handle::reignite)
/// - `timeout`: default wait for `observe()` (`0s` = unbounded)
/// - `bus_capacity`: event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct Config {
    /// Ignite on first access instead of requiring an explicit `build()`.
    pub lazy: bool,

    /// Reignite with the previous builder when a replacement builder fails.
    pub rollback: bool,

    /// Default wait applied by `observe()`.
    ///
    /// - `Duration::ZERO` = wait until the promise settles
    /// - `> 0` = fail with `HandleError::Timeout` after this window
    pub timeout: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the default `observe()` window as an `Option`.
    ///
    /// - `None` → unbounded
    /// - `Some(d)` → bounded by `d`
    #[inline]
    pub fn observe_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `lazy = true` (ignition on first access, through the worker pool)
    /// - `rollback = true`
    /// - `timeout = 0s` (unbounded observe)
    /// - `bus_capacity = 256`
    fn default() -> Self {
        Self {
            lazy: true,
            rollback: true,
            timeout: Duration::ZERO,
            bus_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_is_unbounded() {
        let cfg = Config::default();
        assert!(cfg.observe_timeout().is_none());

        let cfg = Config {
            timeout: Duration::from_millis(50),
            ..Config::default()
        };
        assert_eq!(cfg.observe_timeout(), Some(Duration::from_millis(50)));
    }

    #[test]
    fn bus_capacity_never_zero() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
