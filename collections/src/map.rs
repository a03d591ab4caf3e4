//! Typed key-value collection.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use common::{Record, RecordOp, Storage};

use crate::error::{Error, Result};
use crate::iterator::{CollectionIterator, MapIterator};
use crate::key::Key;
use crate::prefix::Prefix;
use crate::range::Ranger;
use crate::value::Value;

/// A map from `K` to `V` stored under its own namespace.
///
/// Entries are kept in encoded-key order, so range scans return keys in
/// the order of `K`.
///
/// # Example
///
/// ```ignore
/// use collections::{FullRange, Map, Pair};
///
/// let scores: Map<Pair<String, u64>, u64> = db.map(0x02u8);
/// scores.set(&Pair::new("alice".to_string(), 1), &90).await?;
///
/// let mut iter = scores.iterate(&FullRange::ascending()).await?;
/// while let Some((key, score)) = iter.next().await? {
///     println!("{:?}: {}", key, score);
/// }
/// ```
pub struct Map<K, V> {
    storage: Arc<dyn Storage>,
    prefix: Prefix,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> Map<K, V> {
    pub fn new(storage: Arc<dyn Storage>, prefix: impl Into<Prefix>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
            _marker: PhantomData,
        }
    }

    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }
}

impl<K: Key, V: Value> Map<K, V> {
    /// Inserts or overwrites the entry for `key`.
    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn set(&self, key: &K, value: &V) -> Result<()> {
        let record = Record::new(self.prefix.encode_key(key), value.encode_value());
        self.storage.put(vec![record]).await?;
        Ok(())
    }

    /// Returns the value for `key`, or [`Error::NotFound`].
    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn get(&self, key: &K) -> Result<V> {
        let record = self
            .storage
            .get(self.prefix.encode_key(key))
            .await?
            .ok_or(Error::NotFound)?;
        V::decode_value(&record.value)
    }

    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn has(&self, key: &K) -> Result<bool> {
        let record = self.storage.get(self.prefix.encode_key(key)).await?;
        Ok(record.is_some())
    }

    /// Removes the entry for `key`. Removing a missing key is not an error.
    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn remove(&self, key: &K) -> Result<()> {
        self.storage.delete(self.prefix.encode_key(key)).await?;
        Ok(())
    }

    /// Opens an iterator over the entries selected by `ranger`.
    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn iterate(&self, ranger: &impl Ranger<K>) -> Result<MapIterator<K, V>> {
        let key_range = ranger.key_range();
        let range = self.prefix.bytes_range(&key_range);
        let cursor = self.storage.scan_iter(range, key_range.order).await?;
        Ok(CollectionIterator::new(self.prefix.clone(), cursor))
    }

    /// Removes every entry selected by `ranger` in a single batch and
    /// returns how many were removed.
    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn clear(&self, ranger: &impl Ranger<K>) -> Result<usize> {
        let key_range = ranger.key_range();
        let range = self.prefix.bytes_range(&key_range);
        let ops: Vec<RecordOp> = self
            .storage
            .scan(range, key_range.order)
            .await?
            .into_iter()
            .map(|record| RecordOp::Delete(record.key))
            .collect();
        let removed = ops.len();
        if removed > 0 {
            self.storage.apply(ops).await?;
        }
        tracing::debug!(removed, "cleared collection range");
        Ok(removed)
    }
}

impl<K, V> Clone for Map<K, V> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            prefix: self.prefix.clone(),
            _marker: PhantomData,
        }
    }
}

impl<K, V> fmt::Debug for Map<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map").field("prefix", &self.prefix).finish()
    }
}
