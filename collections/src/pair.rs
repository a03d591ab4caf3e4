//! Two-field composite keys.

use bytes::BytesMut;

use crate::error::Result;
use crate::key::Key;

/// A key made of two fields, ordered by `k1` then `k2`.
///
/// `k1` is written with its self-delimiting encoding, `k2` with its terminal
/// encoding, so a `Pair<String, Bytes>` costs one terminator byte for the
/// string and nothing for the trailing bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pair<K1, K2> {
    k1: K1,
    k2: K2,
}

impl<K1, K2> Pair<K1, K2> {
    /// Joins two values into a key.
    pub fn new(k1: K1, k2: K2) -> Self {
        Self { k1, k2 }
    }

    pub fn k1(&self) -> &K1 {
        &self.k1
    }

    pub fn k2(&self) -> &K2 {
        &self.k2
    }

    /// Splits the key back into its fields.
    pub fn split(self) -> (K1, K2) {
        (self.k1, self.k2)
    }
}

impl<K1, K2> From<(K1, K2)> for Pair<K1, K2> {
    fn from((k1, k2): (K1, K2)) -> Self {
        Self::new(k1, k2)
    }
}

impl<K1: Key, K2: Key> Key for Pair<K1, K2> {
    const FIXED_SIZE: Option<usize> = match (K1::FIXED_SIZE, K2::FIXED_SIZE) {
        (Some(a), Some(b)) => Some(a + b),
        _ => None,
    };

    fn encode(&self, buf: &mut BytesMut) {
        self.k1.encode_non_terminal(buf);
        self.k2.encode(buf);
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        let k1 = K1::decode_non_terminal(buf)?;
        let k2 = K2::decode(buf)?;
        Ok(Self { k1, k2 })
    }

    fn encode_non_terminal(&self, buf: &mut BytesMut) {
        self.k1.encode_non_terminal(buf);
        self.k2.encode_non_terminal(buf);
    }

    fn decode_non_terminal(buf: &mut &[u8]) -> Result<Self> {
        let k1 = K1::decode_non_terminal(buf)?;
        let k2 = K2::decode_non_terminal(buf)?;
        Ok(Self { k1, k2 })
    }
}
