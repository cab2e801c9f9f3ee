//! # Function-backed builder (`BuilderFn`)
//!
//! [`BuilderFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh future per
//! ignition. Nothing is shared between ignitions unless the closure captures
//! it explicitly (e.g. an `Arc<...>`).
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use ignis::{BoxError, BuildError, Builder, BuilderFn, Resource};
//!
//! struct Counter(u64);
//!
//! #[async_trait]
//! impl Resource for Counter {
//!     async fn close(&self) -> Result<(), BoxError> { Ok(()) }
//! }
//!
//! let builder = BuilderFn::new("counter", || async { Ok::<_, BuildError>(Counter(0)) })
//!     .with_metadata("owner", "billing");
//!
//! assert_eq!(builder.name(), "counter");
//! assert!(!builder.set_metadata("owner", "search"));
//! ```

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::builders::{Builder, BuilderRef, Metadata, Resource};
use crate::error::BuildError;

/// Function-backed builder implementation.
pub struct BuilderFn<F, R> {
    name: Cow<'static, str>,
    f: F,
    metadata: Metadata,
    _resource: PhantomData<fn() -> R>,
}

impl<F, R> BuilderFn<F, R> {
    /// Writes metadata at construction time (first write of a key wins).
    pub fn with_metadata<V>(self, key: impl Into<String>, value: V) -> Self
    where
        V: Any + Send + Sync,
    {
        self.metadata.insert(key, value);
        self
    }
}

impl<F, Fut, R> BuilderFn<F, R>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, BuildError>> + Send + 'static,
    R: Resource,
{
    /// Creates a new function-backed builder.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
            metadata: Metadata::new(),
            _resource: PhantomData,
        }
    }

    /// Creates the builder and returns it as a shared [`BuilderRef`].
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> BuilderRef<R> {
        Arc::new(Self::new(name, f))
    }
}

impl<F, R> fmt::Debug for BuilderFn<F, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderFn")
            .field("name", &self.name)
            .field("metadata", &self.metadata)
            .finish()
    }
}

#[async_trait]
impl<F, Fut, R> Builder for BuilderFn<F, R>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, BuildError>> + Send + 'static,
    R: Resource,
{
    type Resource = R;

    fn name(&self) -> &str {
        &self.name
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    async fn ignite(&self) -> Result<R, BuildError> {
        (self.f)().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Unit;

    #[async_trait]
    impl Resource for Unit {
        async fn close(&self) -> Result<(), BoxError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn each_ignition_runs_the_closure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let builder = BuilderFn::new("unit", move || {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok::<_, BuildError>(Unit)
            }
        });

        assert!(builder.ignite().await.is_ok());
        assert!(builder.ignite().await.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_are_returned_not_cached() {
        let builder = BuilderFn::new("broken", || async {
            Err::<Unit, _>(BuildError::msg("refused"))
        });
        let err = builder.ignite().await.err().map(|e| e.as_label());
        assert_eq!(err, Some("build_failed"));
        assert!(builder.ignite().await.is_err());
    }

    #[test]
    fn metadata_is_write_once() {
        let builder = BuilderFn::new("unit", || async { Ok::<_, BuildError>(Unit) })
            .with_metadata("k", 1u8)
            .with_metadata("k", 2u8);
        assert!(!builder.set_metadata("k", 3u8));
        assert_eq!(builder.get_metadata().get::<u8>("k").as_deref(), Some(&1));
    }
}
