//! # Builder abstraction.
//!
//! A [`Builder`] is the construction recipe of a [`Resource`]. It has a stable
//! [`name`](Builder::name) (its identity for equality and hashing), a write-once
//! [`Metadata`] store, and an async [`ignite`](Builder::ignite) method.
//! The common shared type is [`BuilderRef`], an `Arc<dyn Builder>`.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use crate::builders::{Metadata, MetadataView, Resource};
use crate::core::Handle;
use crate::error::BuildError;

/// Shared reference to a builder producing `R`.
pub type BuilderRef<R> = Arc<dyn Builder<Resource = R>>;

/// # Deterministic, possibly-failing resource factory.
///
/// `ignite` may be called any number of times (initial build, rebuild,
/// rollback); each call must produce an independent resource and must not
/// leave partial state behind when it fails.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use ignis::{BoxError, BuildError, Builder, Metadata, Resource};
///
/// struct Pool;
///
/// #[async_trait]
/// impl Resource for Pool {
///     async fn close(&self) -> Result<(), BoxError> { Ok(()) }
/// }
///
/// struct PoolBuilder { metadata: Metadata }
///
/// #[async_trait]
/// impl Builder for PoolBuilder {
///     type Resource = Pool;
///
///     fn name(&self) -> &str { "pool" }
///     fn metadata(&self) -> &Metadata { &self.metadata }
///
///     async fn ignite(&self) -> Result<Pool, BuildError> {
///         Ok(Pool)
///     }
/// }
/// ```
#[async_trait]
pub trait Builder: Send + Sync + 'static {
    /// Resource type this builder ignites.
    type Resource: Resource;

    /// Returns the builder identity used for equality and hashing of handles.
    fn name(&self) -> &str;

    /// Returns the builder's write-once metadata store.
    fn metadata(&self) -> &Metadata;

    /// Constructs a new resource.
    async fn ignite(&self) -> Result<Self::Resource, BuildError>;

    /// Stores metadata unless `key` was already written; returns whether it was stored.
    fn set_metadata<V>(&self, key: impl Into<String>, value: V) -> bool
    where
        Self: Sized,
        V: Any + Send + Sync,
    {
        self.metadata().insert(key, value)
    }

    /// Returns an immutable snapshot of the metadata.
    fn get_metadata(&self) -> MetadataView {
        self.metadata().snapshot()
    }

    /// Wraps the builder in a new, un-ignited handle with default settings.
    fn to_handle(self) -> Handle<Self::Resource>
    where
        Self: Sized,
    {
        Handle::new(Arc::new(self))
    }
}
