//! Entry point that opens a store and hands out collections over it.

use std::sync::Arc;

use common::Storage;
use common::storage::factory::create_storage;

use crate::config::Config;
use crate::error::Result;
use crate::key::Key;
use crate::keyset::KeySet;
use crate::map::Map;
use crate::prefix::Prefix;
use crate::value::Value;

/// A store shared by any number of collections.
///
/// Collections are cheap handles; each owns a namespace prefix and shares
/// the underlying store. Choosing prefixes that do not overlap is up to the
/// caller.
///
/// # Example
///
/// ```ignore
/// use collections::{CollectionsDb, Config, KeySet, Pair, PairRange};
///
/// let db = CollectionsDb::open(Config::default()).await?;
/// let follows: KeySet<Pair<u64, u64>> = db.key_set(0x01u8);
///
/// follows.set(&Pair::new(1, 2)).await?;
/// let followed = follows.iterate(&PairRange::prefixed(1)).await?.keys().await?;
///
/// db.close().await?;
/// ```
#[derive(Clone)]
pub struct CollectionsDb {
    storage: Arc<dyn Storage>,
}

impl CollectionsDb {
    /// Opens the store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be initialized.
    pub async fn open(config: Config) -> Result<Self> {
        let storage = create_storage(&config.storage).await?;
        Ok(Self::from_storage(storage))
    }

    /// Wraps an already opened store.
    pub fn from_storage(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Returns a key set living under `prefix`.
    pub fn key_set<K: Key>(&self, prefix: impl Into<Prefix>) -> KeySet<K> {
        KeySet::new(Arc::clone(&self.storage), prefix)
    }

    /// Returns a map living under `prefix`.
    pub fn map<K: Key, V: Value>(&self, prefix: impl Into<Prefix>) -> Map<K, V> {
        Map::new(Arc::clone(&self.storage), prefix)
    }

    /// Flushes pending writes.
    pub async fn flush(&self) -> Result<()> {
        self.storage.flush().await?;
        Ok(())
    }

    /// Closes the store.
    pub async fn close(self) -> Result<()> {
        self.storage.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use common::StorageError;
    use common::storage::in_memory::{FailingStorage, InMemoryStorage};

    use super::*;
    use crate::range::FullRange;

    #[tokio::test]
    async fn should_open_in_memory_store_from_config() {
        // given
        let db = CollectionsDb::open(Config::default()).await.unwrap();
        let map: Map<u64, String> = db.map(0x01u8);

        // when
        map.set(&1, &"one".to_string()).await.unwrap();
        db.flush().await.unwrap();

        // then
        assert_eq!(map.get(&1).await.unwrap(), "one");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn should_share_store_between_collections() {
        // given
        let storage = Arc::new(InMemoryStorage::new());
        let db = CollectionsDb::from_storage(storage.clone());
        let a: KeySet<u64> = db.key_set(0x01u8);
        let b: KeySet<u64> = db.key_set(0x02u8);

        // when
        a.set(&1).await.unwrap();
        b.set(&2).await.unwrap();

        // then
        assert_eq!(storage.len().unwrap(), 2);
        let in_a = a
            .iterate(&FullRange::ascending())
            .await
            .unwrap()
            .keys()
            .await
            .unwrap();
        assert_eq!(in_a, vec![1]);
    }

    #[tokio::test]
    async fn should_pass_store_errors_from_handle_operations() {
        let storage = FailingStorage::wrap(Arc::new(InMemoryStorage::new()));
        let db = CollectionsDb::from_storage(storage.clone());
        storage.fail_apply(StorageError::Storage("read only".to_string()));

        let set = db.key_set::<u64>(0x01u8);
        let err = set.set(&1).await.unwrap_err();
        storage.clear();

        assert_eq!(
            err.to_string(),
            StorageError::Storage("read only".to_string()).to_string()
        );
        set.set(&1).await.unwrap();
        assert!(set.has(&1).await.unwrap());
    }
}
