pub mod config;
pub mod factory;
pub mod in_memory;

use async_trait::async_trait;
use bytes::Bytes;

use crate::BytesRange;

/// Traversal order of a range scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScanOrder {
    #[default]
    Ascending,
    Descending,
}

impl ScanOrder {
    pub fn is_descending(&self) -> bool {
        matches!(self, ScanOrder::Descending)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub key: Bytes,
    pub value: Bytes,
}

impl Record {
    pub fn new(key: Bytes, value: Bytes) -> Self {
        Self { key, value }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordOp {
    Put(Record),
    Delete(Bytes),
}

/// Error type for storage operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Storage-related errors
    Storage(String),
    /// Internal errors
    Internal(String),
}

impl std::error::Error for StorageError {}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            StorageError::Storage(msg) => write!(f, "Storage error: {}", msg),
            StorageError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Cursor over storage records.
///
/// Dropping the cursor releases whatever the backend holds for it.
#[async_trait]
pub trait StorageIterator {
    async fn next(&mut self) -> StorageResult<Option<Record>>;
}

/// Read operations of an ordered byte-keyed store.
#[async_trait]
pub trait StorageRead: Send + Sync {
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>>;

    /// Returns a cursor over records in `range`, visited in `order`.
    ///
    /// The returned iterator is owned and does not borrow from the storage,
    /// allowing it to be stored in structs or passed across await points.
    async fn scan_iter(
        &self,
        range: BytesRange,
        order: ScanOrder,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>>;

    /// Collects all records in the range into a Vec.
    #[tracing::instrument(level = "trace", skip_all)]
    async fn scan(&self, range: BytesRange, order: ScanOrder) -> StorageResult<Vec<Record>> {
        let mut iter = self.scan_iter(range, order).await?;
        let mut records = Vec::new();
        while let Some(record) = iter.next().await? {
            records.push(record);
        }
        Ok(records)
    }
}

/// Read-write access to an ordered byte-keyed store.
#[async_trait]
pub trait Storage: StorageRead {
    /// Applies a batch of puts and deletes atomically.
    async fn apply(&self, ops: Vec<RecordOp>) -> StorageResult<()>;

    async fn put(&self, records: Vec<Record>) -> StorageResult<()> {
        self.apply(records.into_iter().map(RecordOp::Put).collect()).await
    }

    /// Deletes a key. Deleting a missing key is not an error.
    async fn delete(&self, key: Bytes) -> StorageResult<()> {
        self.apply(vec![RecordOp::Delete(key)]).await
    }

    /// Flushes all pending writes.
    async fn flush(&self) -> StorageResult<()>;

    /// Closes the storage, releasing any resources.
    async fn close(&self) -> StorageResult<()>;
}
