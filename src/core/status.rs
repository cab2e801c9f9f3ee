//! # Handle status.
//!
//! [`Status`] is derived from the handle's current promise rather than stored
//! next to it, so `Active` holds exactly when the current promise is resolved.
//!
//! ```text
//! no promise          ──► Inactive
//! promise pending     ──► Starting
//! promise resolved    ──► Active
//! promise rejected    ──► FailedBuild
//! promise cancelled   ──► Inactive
//! ```

use crate::promise::PromiseState;

/// Lifecycle status of a [`Handle`](crate::Handle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Ignition is running.
    Starting,
    /// A resource is resolved and alive.
    Active,
    /// Nothing ignited yet, or the handle was closed.
    Inactive,
    /// The last ignition attempt failed.
    FailedBuild,
}

impl Status {
    /// Maps the state of the current promise (if any) to a status.
    pub(crate) fn from_promise(state: Option<PromiseState>) -> Self {
        match state {
            None | Some(PromiseState::Cancelled) => Status::Inactive,
            Some(PromiseState::Pending) => Status::Starting,
            Some(PromiseState::Resolved) => Status::Active,
            Some(PromiseState::Rejected) => Status::FailedBuild,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Status::Starting => "starting",
            Status::Active => "active",
            Status::Inactive => "inactive",
            Status::FailedBuild => "failed_build",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_only_for_resolved_promises() {
        assert_eq!(Status::from_promise(None), Status::Inactive);
        assert_eq!(
            Status::from_promise(Some(PromiseState::Cancelled)),
            Status::Inactive
        );
        assert_eq!(
            Status::from_promise(Some(PromiseState::Pending)),
            Status::Starting
        );
        assert_eq!(
            Status::from_promise(Some(PromiseState::Resolved)),
            Status::Active
        );
        assert_eq!(
            Status::from_promise(Some(PromiseState::Rejected)),
            Status::FailedBuild
        );
    }
}
