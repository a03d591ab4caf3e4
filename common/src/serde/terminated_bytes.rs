//! Terminated bytes serialization for lexicographically ordered keys.
//!
//! Variable-length byte strings that are followed by further key fields must
//! be self-delimiting. They are escaped and terminated with `0x00`:
//!
//! - `0x00` → `0x01 0x01`
//! - `0x01` → `0x01 0x02`
//! - All other bytes unchanged
//! - Terminated with `0x00`
//!
//! The terminator is the lowest byte, so a shorter string sorts before any
//! longer string it prefixes ("/foo" < "/foo/bar"), and the encoded form of
//! one string is never a byte prefix of another's.

use bytes::{BufMut, Bytes, BytesMut};

use super::DeserializeError;

/// Terminator byte (lowest byte value).
const TERMINATOR_BYTE: u8 = 0x00;

/// Escape character.
const ESCAPE_BYTE: u8 = 0x01;

/// Serializes `data` into a freshly allocated buffer.
pub fn serialize_to_bytes(data: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(data.len() + 1);
    serialize(data, &mut buf);
    buf.freeze()
}

/// Appends the escaped, terminated form of `data` to `buf`.
pub fn serialize(data: &[u8], buf: &mut BytesMut) {
    let mut rest = data;
    while let Some(pos) = rest.iter().position(|&b| b <= ESCAPE_BYTE) {
        buf.put_slice(&rest[..pos]);
        buf.put_u8(ESCAPE_BYTE);
        buf.put_u8(rest[pos] + 1);
        rest = &rest[pos + 1..];
    }
    buf.put_slice(rest);
    buf.put_u8(TERMINATOR_BYTE);
}

/// Deserializes terminated bytes, advancing `buf` past the terminator.
///
/// # Errors
///
/// Returns an error if:
/// - The buffer ends inside an escape sequence
/// - An escape byte is followed by anything other than `0x01` or `0x02`
/// - The terminator is missing
pub fn deserialize(buf: &mut &[u8]) -> Result<Bytes, DeserializeError> {
    let input = *buf;

    // Fast path: no escapes before the terminator.
    match input.iter().position(|&b| b <= ESCAPE_BYTE) {
        None => {
            return Err(DeserializeError::new(
                "unterminated bytes sequence (missing 0x00 terminator)",
            ));
        }
        Some(pos) if input[pos] == TERMINATOR_BYTE => {
            *buf = &input[pos + 1..];
            return Ok(Bytes::copy_from_slice(&input[..pos]));
        }
        Some(_) => {}
    }

    let mut result = BytesMut::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        match input[i] {
            TERMINATOR_BYTE => {
                *buf = &input[i + 1..];
                return Ok(result.freeze());
            }
            ESCAPE_BYTE => {
                let escaped = match input.get(i + 1) {
                    Some(0x01) => TERMINATOR_BYTE,
                    Some(0x02) => ESCAPE_BYTE,
                    Some(other) => {
                        return Err(DeserializeError::new(format!(
                            "invalid escape sequence: 0x01 0x{:02x}",
                            other
                        )));
                    }
                    None => {
                        return Err(DeserializeError::new(
                            "truncated escape sequence in terminated bytes",
                        ));
                    }
                };
                result.put_u8(escaped);
                i += 2;
            }
            byte => {
                result.put_u8(byte);
                i += 1;
            }
        }
    }

    Err(DeserializeError::new(
        "unterminated bytes sequence (missing 0x00 terminator)",
    ))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn should_roundtrip_any_bytes(data: Vec<u8>, trailer: Vec<u8>) {
            let mut buf = BytesMut::new();
            serialize(&data, &mut buf);
            buf.extend_from_slice(&trailer);

            let mut slice = buf.as_ref();
            let decoded = deserialize(&mut slice).unwrap();

            prop_assert_eq!(decoded.as_ref(), data.as_slice());
            prop_assert_eq!(slice, trailer.as_slice());
        }

        #[test]
        fn should_preserve_ordering(a: Vec<u8>, b: Vec<u8>) {
            let enc_a = serialize_to_bytes(&a);
            let enc_b = serialize_to_bytes(&b);

            prop_assert_eq!(a.cmp(&b), enc_a.cmp(&enc_b));
        }

        #[test]
        fn should_never_encode_a_prefix_of_another_value(a: Vec<u8>, b: Vec<u8>) {
            prop_assume!(a != b);

            let enc_a = serialize_to_bytes(&a);
            let enc_b = serialize_to_bytes(&b);

            prop_assert!(!enc_b.starts_with(&enc_a));
        }
    }

    #[test]
    fn should_encode_special_bytes() {
        assert_eq!(serialize_to_bytes(&[0x00]).as_ref(), &[0x01, 0x01, 0x00]);
        assert_eq!(serialize_to_bytes(&[0x01]).as_ref(), &[0x01, 0x02, 0x00]);
        assert_eq!(serialize_to_bytes(&[0xFF]).as_ref(), &[0xFF, 0x00]);
        assert_eq!(serialize_to_bytes(&[]).as_ref(), &[0x00]);
        assert_eq!(
            serialize_to_bytes(&[0x61, 0x00, 0x62]).as_ref(),
            &[0x61, 0x01, 0x01, 0x62, 0x00]
        );
    }

    #[test]
    fn should_fail_without_terminator() {
        let mut slice: &[u8] = b"abc";
        assert!(deserialize(&mut slice).is_err());
    }

    #[test]
    fn should_fail_with_truncated_escape() {
        let mut slice: &[u8] = &[0x61, 0x01];
        let err = deserialize(&mut slice).unwrap_err();
        assert!(err.message.contains("truncated escape"));
    }

    #[test]
    fn should_fail_with_invalid_escape() {
        let mut slice: &[u8] = &[0x61, 0x01, 0x03, 0x00];
        let err = deserialize(&mut slice).unwrap_err();
        assert!(err.message.contains("invalid escape"));
    }

    #[test]
    fn should_advance_past_terminator_only() {
        // given
        let data = [0x61, 0x01, 0x02, 0x00, 0xDE, 0xAD];
        let mut slice = &data[..];

        // when
        let decoded = deserialize(&mut slice).unwrap();

        // then
        assert_eq!(decoded.as_ref(), &[0x61, 0x01]);
        assert_eq!(slice, &[0xDE, 0xAD]);
    }
}
