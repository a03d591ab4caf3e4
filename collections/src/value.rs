//! Value encodings for map entries.
//!
//! Values are never compared by the store, so unlike keys they only need to
//! round-trip.

use bytes::Bytes;

use crate::error::{Error, Result};

/// A type that can be stored as the value of a collection entry.
pub trait Value: Sized {
    fn encode_value(&self) -> Bytes;

    fn decode_value(data: &[u8]) -> Result<Self>;
}

/// The value of a key set entry. Stored as zero bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoValue;

impl Value for NoValue {
    fn encode_value(&self) -> Bytes {
        Bytes::new()
    }

    fn decode_value(data: &[u8]) -> Result<Self> {
        if !data.is_empty() {
            return Err(Error::codec(format!(
                "expected empty value, found {} bytes",
                data.len()
            )));
        }
        Ok(NoValue)
    }
}

impl Value for Bytes {
    fn encode_value(&self) -> Bytes {
        self.clone()
    }

    fn decode_value(data: &[u8]) -> Result<Self> {
        Ok(Bytes::copy_from_slice(data))
    }
}

impl Value for Vec<u8> {
    fn encode_value(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }

    fn decode_value(data: &[u8]) -> Result<Self> {
        Ok(data.to_vec())
    }
}

impl Value for String {
    fn encode_value(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }

    fn decode_value(data: &[u8]) -> Result<Self> {
        String::from_utf8(data.to_vec())
            .map_err(|e| Error::codec(format!("invalid UTF-8 in value: {}", e)))
    }
}

fn fixed<const N: usize>(data: &[u8], what: &str) -> Result<[u8; N]> {
    data.try_into().map_err(|_| {
        Error::codec(format!(
            "invalid {} value length: expected {}, got {}",
            what,
            N,
            data.len()
        ))
    })
}

impl Value for u64 {
    fn encode_value(&self) -> Bytes {
        Bytes::copy_from_slice(&self.to_be_bytes())
    }

    fn decode_value(data: &[u8]) -> Result<Self> {
        Ok(u64::from_be_bytes(fixed(data, "u64")?))
    }
}

impl Value for i64 {
    fn encode_value(&self) -> Bytes {
        Bytes::copy_from_slice(&self.to_be_bytes())
    }

    fn decode_value(data: &[u8]) -> Result<Self> {
        Ok(i64::from_be_bytes(fixed(data, "i64")?))
    }
}
