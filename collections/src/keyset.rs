//! Typed set of keys.

use std::fmt;
use std::sync::Arc;

use common::Storage;

use crate::error::Result;
use crate::iterator::KeySetIterator;
use crate::key::Key;
use crate::map::Map;
use crate::prefix::Prefix;
use crate::range::Ranger;
use crate::value::NoValue;

/// A set of `K` stored under its own namespace.
///
/// Members are stored as keys with empty values.
pub struct KeySet<K> {
    entries: Map<K, NoValue>,
}

impl<K> KeySet<K> {
    pub fn new(storage: Arc<dyn Storage>, prefix: impl Into<Prefix>) -> Self {
        Self {
            entries: Map::new(storage, prefix),
        }
    }

    pub fn prefix(&self) -> &Prefix {
        self.entries.prefix()
    }
}

impl<K: Key> KeySet<K> {
    /// Adds `key`. Adding an existing member is a no-op.
    pub async fn set(&self, key: &K) -> Result<()> {
        self.entries.set(key, &NoValue).await
    }

    pub async fn has(&self, key: &K) -> Result<bool> {
        self.entries.has(key).await
    }

    /// Removes `key`. Removing a missing member is not an error.
    pub async fn remove(&self, key: &K) -> Result<()> {
        self.entries.remove(key).await
    }

    /// Opens an iterator over the members selected by `ranger`.
    pub async fn iterate(&self, ranger: &impl Ranger<K>) -> Result<KeySetIterator<K>> {
        self.entries.iterate(ranger).await
    }

    /// Removes every member selected by `ranger` and returns how many were
    /// removed.
    pub async fn clear(&self, ranger: &impl Ranger<K>) -> Result<usize> {
        self.entries.clear(ranger).await
    }
}

impl<K> Clone for KeySet<K> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<K> fmt::Debug for KeySet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySet")
            .field("prefix", self.entries.prefix())
            .finish()
    }
}
