//! Three-field composite keys.

use bytes::BytesMut;

use crate::error::Result;
use crate::key::Key;

/// A key made of three fields, ordered by `k1`, then `k2`, then `k3`.
///
/// `k1` and `k2` use self-delimiting encodings; `k3` uses its terminal one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple<K1, K2, K3> {
    k1: K1,
    k2: K2,
    k3: K3,
}

impl<K1, K2, K3> Triple<K1, K2, K3> {
    /// Joins three values into a key.
    pub fn new(k1: K1, k2: K2, k3: K3) -> Self {
        Self { k1, k2, k3 }
    }

    pub fn k1(&self) -> &K1 {
        &self.k1
    }

    pub fn k2(&self) -> &K2 {
        &self.k2
    }

    pub fn k3(&self) -> &K3 {
        &self.k3
    }

    /// Splits the key back into its fields.
    pub fn split(self) -> (K1, K2, K3) {
        (self.k1, self.k2, self.k3)
    }
}

impl<K1, K2, K3> From<(K1, K2, K3)> for Triple<K1, K2, K3> {
    fn from((k1, k2, k3): (K1, K2, K3)) -> Self {
        Self::new(k1, k2, k3)
    }
}

impl<K1: Key, K2: Key, K3: Key> Key for Triple<K1, K2, K3> {
    const FIXED_SIZE: Option<usize> = match (K1::FIXED_SIZE, K2::FIXED_SIZE, K3::FIXED_SIZE) {
        (Some(a), Some(b), Some(c)) => Some(a + b + c),
        _ => None,
    };

    fn encode(&self, buf: &mut BytesMut) {
        self.k1.encode_non_terminal(buf);
        self.k2.encode_non_terminal(buf);
        self.k3.encode(buf);
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        let k1 = K1::decode_non_terminal(buf)?;
        let k2 = K2::decode_non_terminal(buf)?;
        let k3 = K3::decode(buf)?;
        Ok(Self { k1, k2, k3 })
    }

    fn encode_non_terminal(&self, buf: &mut BytesMut) {
        self.k1.encode_non_terminal(buf);
        self.k2.encode_non_terminal(buf);
        self.k3.encode_non_terminal(buf);
    }

    fn decode_non_terminal(buf: &mut &[u8]) -> Result<Self> {
        let k1 = K1::decode_non_terminal(buf)?;
        let k2 = K2::decode_non_terminal(buf)?;
        let k3 = K3::decode_non_terminal(buf)?;
        Ok(Self { k1, k2, k3 })
    }
}
