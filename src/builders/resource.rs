//! # Supervised resource abstraction.
//!
//! A [`Resource`] is whatever a [`Builder`](crate::Builder) ignites. The handle
//! only ever needs one capability from it: [`close`](Resource::close).

use async_trait::async_trait;

use crate::error::BoxError;

/// # Closable component owned by a handle.
///
/// The handle that resolved a resource calls [`close`](Resource::close) exactly
/// once per ignition, either on `Handle::close()` or when the ignition was
/// superseded before it could be published. Callers that obtained the resource
/// through `observe()` must not keep it past that point.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use ignis::{BoxError, Resource};
///
/// struct Connection;
///
/// #[async_trait]
/// impl Resource for Connection {
///     async fn close(&self) -> Result<(), BoxError> {
///         // flush, hang up...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Releases the resource.
    ///
    /// Errors and panics are isolated by the handle and reported as
    /// `EventKind::CloseFailed`; they never abort `Handle::close()`.
    async fn close(&self) -> Result<(), BoxError>;
}
