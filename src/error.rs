//! Error types used by handles and builders.
//!
//! This module defines two main error enums:
//!
//! - [`BuildError`] — errors raised while igniting a resource from a builder.
//! - [`HandleError`] — errors surfaced by blocking handle accessors and lifecycle operations.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Boxed error used for opaque causes (ignition failures, resource close failures).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// # Errors produced by ignition.
///
/// Returned by [`Builder::ignite`](crate::Builder::ignite) and carried by a
/// rejected [`Promise`](crate::Promise).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BuildError {
    /// The builder failed to construct the resource.
    #[error("ignition failed: {source}")]
    Failed {
        /// The underlying cause.
        source: BoxError,
    },

    /// The builder panicked during ignition; the panic was caught.
    #[error("ignition panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// The builder completed without producing a resource.
    #[error("ignition produced no resource")]
    Missing,
}

impl BuildError {
    /// Wraps any error as the cause of a failed ignition.
    pub fn new(err: impl Into<BoxError>) -> Self {
        BuildError::Failed { source: err.into() }
    }

    /// Creates a failed ignition from a plain message.
    ///
    /// # Example
    /// ```
    /// use ignis::BuildError;
    ///
    /// let err = BuildError::msg("port already bound");
    /// assert_eq!(err.to_string(), "ignition failed: port already bound");
    /// ```
    pub fn msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        BuildError::Failed {
            source: message.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BuildError::Failed { .. } => "build_failed",
            BuildError::Panicked { .. } => "build_panicked",
            BuildError::Missing => "build_missing",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BuildError::Failed { source } => format!("error: {source}"),
            BuildError::Panicked { info } => format!("panic: {info}"),
            BuildError::Missing => "no resource".to_string(),
        }
    }

    /// Indicates whether a later ignition with the same builder may succeed.
    ///
    /// Panics are treated as deterministic and therefore not retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BuildError::Failed { .. } | BuildError::Missing)
    }
}

/// # Errors produced by handle operations.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum HandleError {
    /// Ignition was attempted and rejected.
    #[error("build failed: {0}")]
    Build(#[source] Arc<BuildError>),

    /// `build()` was called while a resource is resolved; `close()` it first.
    #[error("resource already active; close it before building a new one")]
    AlreadyActive,

    /// No resource is available and none is being ignited.
    #[error("resource not present")]
    NotPresent,

    /// No resource resolved within the caller's window.
    #[error("resource not present after {timeout:?}")]
    Timeout {
        /// The window that elapsed.
        timeout: Duration,
    },

    /// The pending ignition was invalidated by a concurrent `close()`.
    #[error("ignition cancelled by handle close")]
    Cancelled,

    /// Both the new builder and the rollback to the previous builder failed.
    #[error("rebuild failed ({attempt}); rollback failed ({rollback})")]
    RollbackFailed {
        /// Failure of the new builder.
        attempt: Box<HandleError>,
        /// Failure of the previous builder during rollback.
        rollback: Box<HandleError>,
    },
}

impl HandleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use ignis::HandleError;
    ///
    /// assert_eq!(HandleError::AlreadyActive.as_label(), "handle_already_active");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HandleError::Build(_) => "handle_build_failed",
            HandleError::AlreadyActive => "handle_already_active",
            HandleError::NotPresent => "handle_not_present",
            HandleError::Timeout { .. } => "handle_timeout",
            HandleError::Cancelled => "handle_cancelled",
            HandleError::RollbackFailed { .. } => "handle_rollback_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandleError::Build(err) => format!("build: {}", err.as_message()),
            HandleError::AlreadyActive => "already active".to_string(),
            HandleError::NotPresent => "not present".to_string(),
            HandleError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            HandleError::Cancelled => "cancelled".to_string(),
            HandleError::RollbackFailed { attempt, rollback } => {
                format!(
                    "attempt: {}; rollback: {}",
                    attempt.as_message(),
                    rollback.as_message()
                )
            }
        }
    }

    /// Returns the ignition error if this failure came from a rejected build.
    pub fn build_error(&self) -> Option<&BuildError> {
        match self {
            HandleError::Build(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<BuildError> for HandleError {
    fn from(err: BuildError) -> Self {
        HandleError::Build(Arc::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_error_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "bound");
        let err = BuildError::new(io);
        assert_eq!(err.as_label(), "build_failed");
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.is_retryable());
    }

    #[test]
    fn panics_are_not_retryable() {
        let err = BuildError::Panicked { info: "boom".into() };
        assert!(!err.is_retryable());
        assert_eq!(err.as_message(), "panic: boom");
    }

    #[test]
    fn handle_error_exposes_build_error() {
        let err: HandleError = BuildError::msg("nope").into();
        assert_eq!(err.as_label(), "handle_build_failed");
        assert!(err.build_error().is_some());
        assert!(HandleError::NotPresent.build_error().is_none());
    }
}
