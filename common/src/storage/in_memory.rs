use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;

use super::{RecordOp, ScanOrder, Storage};
use crate::{BytesRange, Record, StorageError, StorageIterator, StorageRead, StorageResult};

/// In-memory implementation of the Storage trait using a BTreeMap.
///
/// Useful for testing or scenarios where durability is not required. A scan
/// copies the matching records when the cursor is created, so a cursor sees
/// the store as it was at that moment (snapshot semantics) regardless of
/// later writes.
pub struct InMemoryStorage {
    data: Arc<RwLock<BTreeMap<Bytes, Bytes>>>,
    open_iterators: Arc<AtomicUsize>,
}

impl InMemoryStorage {
    /// Creates a new InMemoryStorage instance with an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(BTreeMap::new())),
            open_iterators: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of cursors handed out by `scan_iter` that have not been dropped.
    pub fn open_iterators(&self) -> usize {
        self.open_iterators.load(Ordering::SeqCst)
    }

    /// Number of stored records.
    pub fn len(&self) -> StorageResult<usize> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.len())
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageRead for InMemoryStorage {
    /// Retrieves a single record by key from the in-memory store.
    #[tracing::instrument(level = "trace", skip_all)]
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&key).map(|value| Record::new(key, value.clone())))
    }

    #[tracing::instrument(level = "trace", skip_all, fields(order = ?order))]
    async fn scan_iter(
        &self,
        range: BytesRange,
        order: ScanOrder,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(format!("Failed to acquire read lock: {}", e)))?;

        let mut records: Vec<Record> = if range.is_empty() {
            Vec::new()
        } else {
            data.range(range)
                .map(|(k, v)| Record::new(k.clone(), v.clone()))
                .collect()
        };
        if order.is_descending() {
            records.reverse();
        }

        self.open_iterators.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemoryIterator {
            records: records.into_iter(),
            open_iterators: Arc::clone(&self.open_iterators),
        }))
    }
}

struct InMemoryIterator {
    records: std::vec::IntoIter<Record>,
    open_iterators: Arc<AtomicUsize>,
}

#[async_trait]
impl StorageIterator for InMemoryIterator {
    #[tracing::instrument(level = "trace", skip_all)]
    async fn next(&mut self) -> StorageResult<Option<Record>> {
        Ok(self.records.next())
    }
}

impl Drop for InMemoryIterator {
    fn drop(&mut self) {
        self.open_iterators.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn apply(&self, ops: Vec<RecordOp>) -> StorageResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Internal(format!("Failed to acquire write lock: {}", e)))?;

        for op in ops {
            match op {
                RecordOp::Put(record) => {
                    data.insert(record.key, record.value);
                }
                RecordOp::Delete(key) => {
                    data.remove(&key);
                }
            }
        }

        Ok(())
    }

    async fn flush(&self) -> StorageResult<()> {
        // No-op for in-memory storage - all writes are immediately visible
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        // No-op for in-memory storage
        Ok(())
    }
}

/// Error armed on one of the [`FailingStorage`] entry points.
#[cfg(feature = "test-utils")]
#[derive(Clone)]
enum Failure {
    /// Fails the next call only.
    Once(StorageError),
    /// Fails every call until [`FailingStorage::clear`].
    Persistent(StorageError),
}

#[cfg(feature = "test-utils")]
type FailSlot = Arc<arc_swap::ArcSwap<Option<Failure>>>;

#[cfg(feature = "test-utils")]
fn new_slot() -> FailSlot {
    Arc::new(arc_swap::ArcSwap::from_pointee(None))
}

/// Fails the current call if `slot` is armed.
///
/// A `Once` error is disarmed with a compare-and-swap, so of two racing
/// calls only the one that disarms it reports it.
#[cfg(feature = "test-utils")]
fn injected_failure(slot: &FailSlot) -> StorageResult<()> {
    let armed = slot.load_full();
    match armed.as_ref() {
        None => Ok(()),
        Some(Failure::Persistent(err)) => Err(err.clone()),
        Some(Failure::Once(err)) => {
            let prev = slot.compare_and_swap(&armed, Arc::new(None));
            if Arc::ptr_eq(&prev, &armed) {
                Err(err.clone())
            } else {
                Ok(())
            }
        }
    }
}

/// A storage wrapper that delegates to an inner [`Storage`] but can inject
/// failures into `get`, `apply`, `scan_iter` and the `next` call of cursors
/// it hands out.
///
/// Gated behind the `test-utils` feature.
///
/// ```ignore
/// let storage = FailingStorage::wrap(Arc::new(InMemoryStorage::new()));
/// storage.fail_next_once(StorageError::Storage("io error".into()));
/// // the next cursor step on any open cursor returns Err(...), then auto-clears
/// ```
#[cfg(feature = "test-utils")]
pub struct FailingStorage {
    inner: Arc<dyn Storage>,
    fail_get: FailSlot,
    fail_apply: FailSlot,
    fail_scan: FailSlot,
    fail_next: FailSlot,
}

#[cfg(feature = "test-utils")]
impl FailingStorage {
    /// Wraps an existing storage, with all failure injections initially `None`.
    pub fn wrap(inner: Arc<dyn Storage>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_get: new_slot(),
            fail_apply: new_slot(),
            fail_scan: new_slot(),
            fail_next: new_slot(),
        })
    }

    /// Makes `get` return the given error on every subsequent call.
    pub fn fail_get(&self, err: StorageError) {
        self.fail_get.store(Arc::new(Some(Failure::Persistent(err))));
    }

    /// Makes `apply` (and therefore `put`/`delete`) return the given error on
    /// every subsequent call.
    pub fn fail_apply(&self, err: StorageError) {
        self.fail_apply.store(Arc::new(Some(Failure::Persistent(err))));
    }

    /// Makes `scan_iter` return the given error on the next call only.
    pub fn fail_scan_once(&self, err: StorageError) {
        self.fail_scan.store(Arc::new(Some(Failure::Once(err))));
    }

    /// Makes the next cursor step return the given error, then clears.
    pub fn fail_next_once(&self, err: StorageError) {
        self.fail_next.store(Arc::new(Some(Failure::Once(err))));
    }

    /// Clears every injected failure.
    pub fn clear(&self) {
        for slot in [
            &self.fail_get,
            &self.fail_apply,
            &self.fail_scan,
            &self.fail_next,
        ] {
            slot.store(Arc::new(None));
        }
    }
}

#[cfg(feature = "test-utils")]
struct FailingIterator {
    inner: Box<dyn StorageIterator + Send + 'static>,
    fail_next: FailSlot,
}

#[cfg(feature = "test-utils")]
#[async_trait]
impl StorageIterator for FailingIterator {
    async fn next(&mut self) -> StorageResult<Option<Record>> {
        injected_failure(&self.fail_next)?;
        self.inner.next().await
    }
}

#[cfg(feature = "test-utils")]
#[async_trait]
impl StorageRead for FailingStorage {
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        injected_failure(&self.fail_get)?;
        self.inner.get(key).await
    }

    async fn scan_iter(
        &self,
        range: BytesRange,
        order: ScanOrder,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>> {
        injected_failure(&self.fail_scan)?;
        let inner = self.inner.scan_iter(range, order).await?;
        Ok(Box::new(FailingIterator {
            inner,
            fail_next: Arc::clone(&self.fail_next),
        }))
    }
}

#[cfg(feature = "test-utils")]
#[async_trait]
impl Storage for FailingStorage {
    async fn apply(&self, ops: Vec<RecordOp>) -> StorageResult<()> {
        injected_failure(&self.fail_apply)?;
        self.inner.apply(ops).await
    }

    async fn flush(&self) -> StorageResult<()> {
        self.inner.flush().await
    }

    async fn close(&self) -> StorageResult<()> {
        self.inner.close().await
    }
}

#[cfg(test)]
mod tests {
    use std::ops::Bound::{Excluded, Included, Unbounded};

    use super::*;

    fn record(key: &'static str, value: &'static str) -> Record {
        Record::new(Bytes::from(key), Bytes::from(value))
    }

    async fn storage_with(keys: &[&'static str]) -> InMemoryStorage {
        let storage = InMemoryStorage::new();
        storage
            .put(keys.iter().map(|k| record(k, "v")).collect())
            .await
            .unwrap();
        storage
    }

    fn keys(records: &[Record]) -> Vec<Bytes> {
        records.iter().map(|r| r.key.clone()).collect()
    }

    #[tokio::test]
    async fn should_put_get_and_delete() {
        // given
        let storage = InMemoryStorage::new();
        storage.put(vec![record("a", "1")]).await.unwrap();

        // when
        let found = storage.get(Bytes::from("a")).await.unwrap();
        storage.delete(Bytes::from("a")).await.unwrap();
        let gone = storage.get(Bytes::from("a")).await.unwrap();

        // then
        assert_eq!(found, Some(record("a", "1")));
        assert_eq!(gone, None);
    }

    #[tokio::test]
    async fn should_scan_ascending_and_descending() {
        // given
        let storage = storage_with(&["a", "b", "c", "d"]).await;
        let range = BytesRange::new(Included(Bytes::from("b")), Excluded(Bytes::from("d")));

        // when
        let asc = storage
            .scan(range.clone(), ScanOrder::Ascending)
            .await
            .unwrap();
        let desc = storage.scan(range, ScanOrder::Descending).await.unwrap();

        // then
        assert_eq!(keys(&asc), vec![Bytes::from("b"), Bytes::from("c")]);
        assert_eq!(keys(&desc), vec![Bytes::from("c"), Bytes::from("b")]);
    }

    #[tokio::test]
    async fn should_return_nothing_for_inverted_range() {
        // given
        let storage = storage_with(&["a", "b", "c"]).await;
        let range = BytesRange::new(Included(Bytes::from("c")), Excluded(Bytes::from("a")));

        // when
        let records = storage.scan(range, ScanOrder::Ascending).await.unwrap();

        // then
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn should_not_observe_writes_made_after_cursor_creation() {
        // given
        let storage = storage_with(&["a", "b"]).await;
        let mut iter = storage
            .scan_iter(BytesRange::unbounded(), ScanOrder::Ascending)
            .await
            .unwrap();

        // when
        storage.put(vec![record("c", "v")]).await.unwrap();
        let mut seen = Vec::new();
        while let Some(r) = iter.next().await.unwrap() {
            seen.push(r.key);
        }

        // then
        assert_eq!(seen, vec![Bytes::from("a"), Bytes::from("b")]);
    }

    #[tokio::test]
    async fn should_track_open_cursors() {
        // given
        let storage = storage_with(&["a"]).await;

        // when
        let iter = storage
            .scan_iter(
                BytesRange::new(Included(Bytes::from("a")), Unbounded),
                ScanOrder::Ascending,
            )
            .await
            .unwrap();

        // then
        assert_eq!(storage.open_iterators(), 1);
        drop(iter);
        assert_eq!(storage.open_iterators(), 0);
    }

    #[cfg(feature = "test-utils")]
    #[tokio::test]
    async fn should_fire_once_failures_a_single_time() {
        // given
        let storage = FailingStorage::wrap(Arc::new(storage_with(&["a"]).await));
        let err = StorageError::Storage("scan refused".to_string());
        storage.fail_scan_once(err.clone());
        storage.fail_get(err.clone());

        // when
        let first = storage.scan(BytesRange::unbounded(), ScanOrder::Ascending).await;
        let second = storage.scan(BytesRange::unbounded(), ScanOrder::Ascending).await;

        // then
        assert_eq!(first.unwrap_err(), err);
        assert_eq!(second.unwrap().len(), 1);
        for _ in 0..2 {
            assert_eq!(storage.get(Bytes::from("a")).await.unwrap_err(), err);
        }
        storage.clear();
        assert!(storage.get(Bytes::from("a")).await.unwrap().is_some());
    }
}
