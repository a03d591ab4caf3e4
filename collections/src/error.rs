//! Error types for collection operations.

use common::StorageError;
use common::serde::DeserializeError;

/// Error type for collection operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Bytes that could not be decoded into a key or value: truncated,
    /// malformed, carrying trailing garbage, or outside the collection's
    /// namespace.
    Codec(String),

    /// An iterator operation attempted in a state that does not allow it.
    Iterator(String),

    /// The requested key does not exist.
    NotFound,

    /// Error returned by the underlying store, carried unchanged.
    Storage(StorageError),
}

impl Error {
    pub(crate) fn codec(msg: impl Into<String>) -> Self {
        Error::Codec(msg.into())
    }

    /// Returns true for [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Codec(msg) => write!(f, "Codec error: {}", msg),
            Error::Iterator(msg) => write!(f, "Iterator error: {}", msg),
            Error::NotFound => write!(f, "Not found"),
            Error::Storage(err) => write!(f, "{}", err),
        }
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Error::Storage(err)
    }
}

impl From<DeserializeError> for Error {
    fn from(err: DeserializeError) -> Self {
        Error::Codec(err.message)
    }
}

/// Result type alias for collection operations.
pub type Result<T> = std::result::Result<T, Error>;
