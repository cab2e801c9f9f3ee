//! # Write-once builder metadata.
//!
//! [`Metadata`] is a small key/value store with insert-if-absent semantics:
//! the first write of a key wins, later writes are rejected without mutation.
//! [`MetadataView`] is an immutable snapshot handed out to readers; writes made
//! after a snapshot was taken are never visible through it.

use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// Type-erased metadata value.
pub type MetadataValue = Arc<dyn Any + Send + Sync>;

/// Thread-safe write-once metadata store.
#[derive(Default)]
pub struct Metadata {
    entries: RwLock<HashMap<String, MetadataValue>>,
}

impl Metadata {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key` unless the key is already present.
    ///
    /// Returns `false` (and leaves the existing value untouched) on a second write.
    ///
    /// # Example
    /// ```
    /// use ignis::Metadata;
    ///
    /// let meta = Metadata::new();
    /// assert!(meta.insert("region", "eu-west"));
    /// assert!(!meta.insert("region", "us-east"));
    /// assert_eq!(meta.get::<&str>("region").as_deref(), Some(&"eu-west"));
    /// ```
    pub fn insert<V>(&self, key: impl Into<String>, value: V) -> bool
    where
        V: Any + Send + Sync,
    {
        self.insert_value(key, Arc::new(value))
    }

    /// Stores an already type-erased value unless the key is present.
    pub fn insert_value(&self, key: impl Into<String>, value: MetadataValue) -> bool {
        let mut entries = self.entries.write();
        match entries.entry(key.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    /// Returns the value for `key` if it exists and has type `T`.
    pub fn get<T>(&self, key: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let value = self.entries.read().get(key).cloned()?;
        value.downcast::<T>().ok()
    }

    /// Returns true if `key` has been written.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Takes an immutable snapshot of the current entries.
    pub fn snapshot(&self) -> MetadataView {
        MetadataView {
            entries: Arc::new(self.entries.read().clone()),
        }
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read();
        let mut keys: Vec<&String> = entries.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Metadata").field("keys", &keys).finish()
    }
}

/// Immutable snapshot of a builder's metadata.
///
/// Cheap to clone; values are shared, not copied.
#[derive(Clone, Default)]
pub struct MetadataView {
    entries: Arc<HashMap<String, MetadataValue>>,
}

impl MetadataView {
    /// Returns the value for `key` if it exists and has type `T`.
    pub fn get<T>(&self, key: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.entries.get(key).cloned()?.downcast::<T>().ok()
    }

    /// Returns the type-erased value for `key`.
    pub fn get_value(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.get(key)
    }

    /// Returns true if `key` is part of the snapshot.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the snapshot's keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of keys in the snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for MetadataView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataView")
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_write_is_rejected() {
        let meta = Metadata::new();
        assert!(meta.insert("k", 1u32));
        assert!(!meta.insert("k", 2u32));
        assert_eq!(meta.get::<u32>("k").as_deref(), Some(&1));
        assert_eq!(meta.len(), 1);
    }

    #[test]
    fn wrong_type_reads_as_absent() {
        let meta = Metadata::new();
        meta.insert("k", String::from("v"));
        assert!(meta.get::<u32>("k").is_none());
        assert!(meta.contains("k"));
    }

    #[test]
    fn snapshot_does_not_see_later_writes() {
        let meta = Metadata::new();
        meta.insert("a", 1u8);
        let view = meta.snapshot();
        meta.insert("b", 2u8);

        assert_eq!(view.keys(), vec!["a"]);
        assert!(!view.contains_key("b"));
        assert_eq!(meta.snapshot().keys(), vec!["a", "b"]);
    }
}
