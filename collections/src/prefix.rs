//! Collection namespaces.
//!
//! Every collection owns a byte prefix that is prepended to each encoded key
//! before it reaches the store and stripped again before decoding:
//!
//! ```text
//! Store key: | prefix (n bytes) | encoded key |
//! ```
//!
//! Prefixes are assigned by the caller; two collections sharing a store must
//! use prefixes where neither is a byte prefix of the other.

use std::ops::Bound;

use bytes::{BufMut, Bytes, BytesMut};
use common::{BytesRange, lex_increment};

use crate::error::{Error, Result};
use crate::key::Key;
use crate::range::KeyRange;

/// The namespace of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Prefix(Bytes);

impl Prefix {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the store key for `key`.
    pub fn encode_key<K: Key>(&self, key: &K) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.0.len() + K::FIXED_SIZE.unwrap_or(16));
        buf.put_slice(&self.0);
        key.encode(&mut buf);
        buf.freeze()
    }

    /// Decodes a store key produced by [`Prefix::encode_key`].
    pub fn decode_key<K: Key>(&self, store_key: &[u8]) -> Result<K> {
        let encoded = store_key.strip_prefix(self.as_bytes()).ok_or_else(|| {
            Error::codec(format!(
                "key of {} bytes is outside namespace 0x{}",
                store_key.len(),
                hex(&self.0)
            ))
        })?;
        K::decode_from_bytes(encoded)
    }

    /// Translates codec-level bounds into store bounds inside this namespace.
    ///
    /// An unbounded start becomes the namespace itself; an unbounded end
    /// becomes the namespace's successor, or stays unbounded when the
    /// namespace has none (empty or all `0xFF`).
    pub fn bytes_range(&self, range: &KeyRange) -> BytesRange {
        let start = match &range.start {
            Bound::Included(key) => Bound::Included(self.join(key)),
            Bound::Excluded(key) => Bound::Excluded(self.join(key)),
            Bound::Unbounded if self.is_empty() => Bound::Unbounded,
            Bound::Unbounded => Bound::Included(self.0.clone()),
        };
        let end = match &range.end {
            Bound::Included(key) => Bound::Included(self.join(key)),
            Bound::Excluded(key) => Bound::Excluded(self.join(key)),
            Bound::Unbounded => match lex_increment(&self.0) {
                Some(next) => Bound::Excluded(next),
                None => Bound::Unbounded,
            },
        };
        BytesRange::new(start, end)
    }

    fn join(&self, encoded: &[u8]) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.0.len() + encoded.len());
        buf.put_slice(&self.0);
        buf.put_slice(encoded);
        buf.freeze()
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

impl From<u8> for Prefix {
    fn from(byte: u8) -> Self {
        Self(Bytes::copy_from_slice(&[byte]))
    }
}

impl From<&'static str> for Prefix {
    fn from(s: &'static str) -> Self {
        Self(Bytes::from_static(s.as_bytes()))
    }
}

impl From<&'static [u8]> for Prefix {
    fn from(bytes: &'static [u8]) -> Self {
        Self(Bytes::from_static(bytes))
    }
}

impl From<Vec<u8>> for Prefix {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<Bytes> for Prefix {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}
