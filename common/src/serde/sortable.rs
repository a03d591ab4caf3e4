//! Sortable encoding for signed integers.
//!
//! Two's complement puts negative numbers after positive ones when compared
//! as unsigned big-endian bytes (`-1` is `0xFF..FF`). Flipping the sign bit
//! moves negatives into the lower half of the unsigned range while keeping
//! the relative order inside each half, so the big-endian bytes of the result
//! sort like the original signed values.
//!
//! ```
//! use common::serde::sortable::{decode_i64_sortable, encode_i64_sortable};
//!
//! let bytes = encode_i64_sortable(-42).to_be_bytes();
//! assert_eq!(decode_i64_sortable(u64::from_be_bytes(bytes)), -42);
//! ```

const SIGN_BIT_64: u64 = 0x8000_0000_0000_0000;
const SIGN_BIT_32: u32 = 0x8000_0000;

/// Encodes an i64 so that its big-endian bytes sort in numeric order.
#[inline]
pub const fn encode_i64_sortable(value: i64) -> u64 {
    (value as u64) ^ SIGN_BIT_64
}

/// Inverse of [`encode_i64_sortable`].
#[inline]
pub const fn decode_i64_sortable(sortable: u64) -> i64 {
    (sortable ^ SIGN_BIT_64) as i64
}

/// Encodes an i32 so that its big-endian bytes sort in numeric order.
#[inline]
pub const fn encode_i32_sortable(value: i32) -> u32 {
    (value as u32) ^ SIGN_BIT_32
}

/// Inverse of [`encode_i32_sortable`].
#[inline]
pub const fn decode_i32_sortable(sortable: u32) -> i32 {
    (sortable ^ SIGN_BIT_32) as i32
}
