//! # Resource and builder abstractions.
//!
//! This module provides the construction-side types:
//! - [`Resource`] - trait for the supervised component (close only)
//! - [`Builder`] - trait for deterministic, possibly-failing factories
//! - [`BuilderFn`] - closure-backed builder implementation
//! - [`BuilderRef`] - shared reference to a builder (`Arc<dyn Builder>`)
//! - [`Metadata`] / [`MetadataView`] - write-once builder metadata and its snapshots

mod builder;
mod builder_fn;
mod metadata;
mod resource;

pub use builder::{Builder, BuilderRef};
pub use builder_fn::BuilderFn;
pub use metadata::{Metadata, MetadataValue, MetadataView};
pub use resource::Resource;
