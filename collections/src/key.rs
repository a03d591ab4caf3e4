//! Order-preserving key encodings for single values.
//!
//! Every key type has two encodings:
//!
//! - the **terminal** encoding, used when the value is the last (or only)
//!   field of a key. Variable-length values are written raw; decoding
//!   consumes the rest of the buffer.
//! - the **non-terminal** encoding, used when more fields follow. It must be
//!   self-delimiting. Fixed-width values reuse the terminal encoding;
//!   variable-length values use [`terminated_bytes`].
//!
//! Both encodings preserve order: comparing encoded bytes gives the same
//! result as comparing the values.
//!
//! | type | terminal | non-terminal |
//! |------|----------|--------------|
//! | `u8`..`u64` | big-endian | same |
//! | `i32`, `i64` | sign bit flipped, big-endian | same |
//! | `bool` | `0x00` / `0x01` | same |
//! | `String` | raw UTF-8 | terminated bytes |
//! | `Bytes`, `Vec<u8>` | raw | terminated bytes |

use bytes::{BufMut, Bytes, BytesMut};
use common::serde::sortable::{
    decode_i32_sortable, decode_i64_sortable, encode_i32_sortable, encode_i64_sortable,
};
use common::serde::terminated_bytes;

use crate::error::{Error, Result};

/// A value that can be used as (part of) a collection key.
///
/// Decoders read from the front of `buf` and advance it past the bytes they
/// consumed.
pub trait Key: Clone + Sized {
    /// Width of the encoding if it is the same for every value.
    const FIXED_SIZE: Option<usize>;

    /// Writes the terminal encoding of `self`.
    fn encode(&self, buf: &mut BytesMut);

    /// Reads a value written by [`Key::encode`].
    fn decode(buf: &mut &[u8]) -> Result<Self>;

    /// Writes a self-delimiting encoding of `self`.
    ///
    /// The default is only correct for fixed-width types; variable-length
    /// types must override both non-terminal methods.
    fn encode_non_terminal(&self, buf: &mut BytesMut) {
        self.encode(buf)
    }

    /// Reads a value written by [`Key::encode_non_terminal`].
    fn decode_non_terminal(buf: &mut &[u8]) -> Result<Self> {
        Self::decode(buf)
    }

    /// Terminal encoding into a new buffer.
    fn encode_to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::FIXED_SIZE.unwrap_or(16));
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Non-terminal encoding into a new buffer.
    fn encode_non_terminal_to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::FIXED_SIZE.unwrap_or(16));
        self.encode_non_terminal(&mut buf);
        buf.freeze()
    }

    /// Decodes a complete key, rejecting trailing bytes.
    fn decode_from_bytes(data: &[u8]) -> Result<Self> {
        let mut buf = data;
        let value = Self::decode(&mut buf)?;
        if !buf.is_empty() {
            return Err(Error::codec(format!(
                "{} trailing bytes after key of {} bytes",
                buf.len(),
                data.len() - buf.len()
            )));
        }
        Ok(value)
    }
}

/// Splits `N` bytes off the front of `buf`.
fn take<const N: usize>(buf: &mut &[u8], what: &str) -> Result<[u8; N]> {
    if buf.len() < N {
        return Err(Error::codec(format!(
            "buffer too short for {}: need {} bytes, have {}",
            what,
            N,
            buf.len()
        )));
    }
    let (head, rest) = buf.split_at(N);
    *buf = rest;
    let mut out = [0u8; N];
    out.copy_from_slice(head);
    Ok(out)
}

macro_rules! impl_unsigned_key {
    ($($t:ty),*) => {
        $(
            impl Key for $t {
                const FIXED_SIZE: Option<usize> = Some(std::mem::size_of::<$t>());

                fn encode(&self, buf: &mut BytesMut) {
                    buf.put_slice(&self.to_be_bytes());
                }

                fn decode(buf: &mut &[u8]) -> Result<Self> {
                    Ok(<$t>::from_be_bytes(take(buf, stringify!($t))?))
                }
            }
        )*
    };
}

impl_unsigned_key!(u8, u16, u32, u64);

impl Key for i32 {
    const FIXED_SIZE: Option<usize> = Some(4);

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32(encode_i32_sortable(*self));
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        Ok(decode_i32_sortable(u32::from_be_bytes(take(buf, "i32")?)))
    }
}

impl Key for i64 {
    const FIXED_SIZE: Option<usize> = Some(8);

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u64(encode_i64_sortable(*self));
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        Ok(decode_i64_sortable(u64::from_be_bytes(take(buf, "i64")?)))
    }
}

impl Key for bool {
    const FIXED_SIZE: Option<usize> = Some(1);

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(u8::from(*self));
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        match take::<1>(buf, "bool")? {
            [0x00] => Ok(false),
            [0x01] => Ok(true),
            [other] => Err(Error::codec(format!("invalid bool byte: 0x{:02x}", other))),
        }
    }
}

fn utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| Error::codec(format!("invalid UTF-8 in key: {}", e)))
}

impl Key for String {
    const FIXED_SIZE: Option<usize> = None;

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_slice(self.as_bytes());
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        let value = utf8(buf.to_vec())?;
        *buf = &[];
        Ok(value)
    }

    fn encode_non_terminal(&self, buf: &mut BytesMut) {
        terminated_bytes::serialize(self.as_bytes(), buf);
    }

    fn decode_non_terminal(buf: &mut &[u8]) -> Result<Self> {
        utf8(terminated_bytes::deserialize(buf)?.to_vec())
    }
}

impl Key for Bytes {
    const FIXED_SIZE: Option<usize> = None;

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_slice(self);
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        let value = Bytes::copy_from_slice(buf);
        *buf = &[];
        Ok(value)
    }

    fn encode_non_terminal(&self, buf: &mut BytesMut) {
        terminated_bytes::serialize(self, buf);
    }

    fn decode_non_terminal(buf: &mut &[u8]) -> Result<Self> {
        Ok(terminated_bytes::deserialize(buf)?)
    }
}

impl Key for Vec<u8> {
    const FIXED_SIZE: Option<usize> = None;

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_slice(self);
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        let value = buf.to_vec();
        *buf = &[];
        Ok(value)
    }

    fn encode_non_terminal(&self, buf: &mut BytesMut) {
        terminated_bytes::serialize(self, buf);
    }

    fn decode_non_terminal(buf: &mut &[u8]) -> Result<Self> {
        Ok(terminated_bytes::deserialize(buf)?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn terminal_roundtrip<K: Key + PartialEq + std::fmt::Debug>(value: K) {
        let encoded = value.encode_to_bytes();
        assert_eq!(K::decode_from_bytes(&encoded).unwrap(), value);
        if let Some(size) = K::FIXED_SIZE {
            assert_eq!(encoded.len(), size);
        }
    }

    fn non_terminal_roundtrip<K: Key + PartialEq + std::fmt::Debug>(value: K) {
        let mut buf = BytesMut::new();
        value.encode_non_terminal(&mut buf);
        buf.put_slice(b"\xDE\xAD");
        let mut slice = buf.as_ref();
        assert_eq!(K::decode_non_terminal(&mut slice).unwrap(), value);
        assert_eq!(slice, b"\xDE\xAD");
    }

    proptest! {
        #[test]
        fn should_roundtrip_fixed_width_keys(a: u8, b: u16, c: u32, d: u64, e: i32, f: i64, g: bool) {
            terminal_roundtrip(a);
            terminal_roundtrip(b);
            terminal_roundtrip(c);
            terminal_roundtrip(d);
            terminal_roundtrip(e);
            terminal_roundtrip(f);
            terminal_roundtrip(g);
            non_terminal_roundtrip(d);
            non_terminal_roundtrip(f);
        }

        #[test]
        fn should_roundtrip_variable_keys(s: String, b: Vec<u8>) {
            terminal_roundtrip(s.clone());
            non_terminal_roundtrip(s);
            terminal_roundtrip(Bytes::from(b.clone()));
            non_terminal_roundtrip(Bytes::from(b.clone()));
            terminal_roundtrip(b.clone());
            non_terminal_roundtrip(b);
        }

        #[test]
        fn should_preserve_u64_ordering(a: u64, b: u64) {
            prop_assert_eq!(a.cmp(&b), a.encode_to_bytes().cmp(&b.encode_to_bytes()));
        }

        #[test]
        fn should_preserve_i64_ordering(a: i64, b: i64) {
            prop_assert_eq!(a.cmp(&b), a.encode_to_bytes().cmp(&b.encode_to_bytes()));
        }

        #[test]
        fn should_preserve_string_ordering_in_both_encodings(a: String, b: String) {
            prop_assert_eq!(a.cmp(&b), a.encode_to_bytes().cmp(&b.encode_to_bytes()));
            prop_assert_eq!(
                a.cmp(&b),
                a.encode_non_terminal_to_bytes().cmp(&b.encode_non_terminal_to_bytes())
            );
        }
    }

    #[rstest]
    #[case::u64_one(1u64.encode_to_bytes(), &[0, 0, 0, 0, 0, 0, 0, 1])]
    #[case::u16(0x0102u16.encode_to_bytes(), &[0x01, 0x02])]
    #[case::i32_negative_one((-1i32).encode_to_bytes(), &[0x7F, 0xFF, 0xFF, 0xFF])]
    #[case::i32_zero(0i32.encode_to_bytes(), &[0x80, 0x00, 0x00, 0x00])]
    #[case::i64_min(i64::MIN.encode_to_bytes(), &[0; 8])]
    #[case::bool_true(true.encode_to_bytes(), &[0x01])]
    #[case::string_terminal("a\0b".to_string().encode_to_bytes(), b"a\0b")]
    #[case::string_non_terminal("a\0b".to_string().encode_non_terminal_to_bytes(), &[0x61, 0x01, 0x01, 0x62, 0x00])]
    #[case::bytes_non_terminal(Bytes::from_static(&[0x01]).encode_non_terminal_to_bytes(), &[0x01, 0x02, 0x00])]
    fn should_lay_out_encoding(#[case] encoded: Bytes, #[case] expected: &[u8]) {
        assert_eq!(encoded.as_ref(), expected);
    }

    #[test]
    fn should_terminate_non_terminal_string() {
        let encoded = "A".to_string().encode_non_terminal_to_bytes();
        assert_eq!(encoded.as_ref(), &[0x41, 0x00]);
    }

    #[test]
    fn should_reject_truncated_fixed_width_key() {
        // given
        let mut slice: &[u8] = &[0x00, 0x01, 0x02];

        // when
        let err = u64::decode(&mut slice).unwrap_err();

        // then
        assert!(matches!(err, Error::Codec(msg) if msg.contains("buffer too short for u64")));
    }

    #[test]
    fn should_reject_trailing_bytes() {
        let err = u32::decode_from_bytes(&[0, 0, 0, 1, 9]).unwrap_err();
        assert!(matches!(err, Error::Codec(msg) if msg.contains("1 trailing bytes")));
    }

    #[test]
    fn should_reject_invalid_bool() {
        assert!(bool::decode_from_bytes(&[0x02]).is_err());
    }

    #[test]
    fn should_reject_invalid_utf8() {
        assert!(String::decode_from_bytes(&[0xC3, 0x28]).is_err());
        let mut slice: &[u8] = &[0xC3, 0x28, 0x00];
        assert!(String::decode_non_terminal(&mut slice).is_err());
    }

    #[test]
    fn should_reject_unterminated_non_terminal_bytes() {
        let mut slice: &[u8] = b"abc";
        assert!(Bytes::decode_non_terminal(&mut slice).is_err());
    }
}
