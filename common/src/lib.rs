pub mod bytes;
pub mod serde;
pub mod storage;

pub use bytes::{BytesRange, lex_increment};
pub use storage::config::StorageConfig;
pub use storage::{
    Record, RecordOp, ScanOrder, Storage, StorageError, StorageIterator, StorageRead,
    StorageResult,
};
