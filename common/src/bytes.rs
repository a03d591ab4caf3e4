//! Byte utilities for key encoding and range queries.

use bytes::{Bytes, BytesMut};
use std::ops::Bound::{Excluded, Included, Unbounded};
use std::ops::{Bound, RangeBounds};

/// Computes the lexicographic successor of a byte prefix.
///
/// Returns the smallest byte sequence that is strictly greater than every
/// sequence starting with `data`, or `None` when no such sequence exists
/// (`data` is empty or consists only of `0xFF` bytes). In the `None` case a
/// prefix scan has no upper bound.
///
/// Trailing `0xFF` bytes are dropped and the last remaining byte is
/// incremented:
///
/// - `[0x61]` → `Some([0x62])`
/// - `[0x61, 0xFF]` → `Some([0x62])`
/// - `[0x00, 0x01, 0xFF, 0xFF]` → `Some([0x00, 0x02])`
/// - `[0xFF, 0xFF]` → `None`
///
/// Dropping the carried bytes instead of zeroing them matters: `[0x62]` is a
/// valid key that does not start with `[0x61, 0xFF]`, and `[0x62, 0x00]` as an
/// exclusive bound would let it through.
pub fn lex_increment(data: &[u8]) -> Option<Bytes> {
    let pos = data.iter().rposition(|&b| b != 0xFF)?;
    let mut result = BytesMut::from(&data[..=pos]);
    result[pos] += 1;
    Some(result.freeze())
}

/// A range over byte sequences, used for key range queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BytesRange {
    pub start: Bound<Bytes>,
    pub end: Bound<Bytes>,
}

impl BytesRange {
    pub fn new(start: Bound<Bytes>, end: Bound<Bytes>) -> Self {
        Self { start, end }
    }

    /// Creates a range that includes all keys with the given prefix.
    pub fn prefix(prefix: Bytes) -> Self {
        if prefix.is_empty() {
            return Self::unbounded();
        }
        let end = match lex_increment(&prefix) {
            Some(end) => Excluded(end),
            None => Unbounded,
        };
        Self {
            start: Included(prefix),
            end,
        }
    }

    /// Creates a range that scans everything.
    pub fn unbounded() -> Self {
        Self {
            start: Unbounded,
            end: Unbounded,
        }
    }

    pub fn contains(&self, k: &[u8]) -> bool {
        (match &self.start {
            Included(s) => k >= s,
            Excluded(s) => k > s,
            Unbounded => true,
        }) && (match &self.end {
            Included(e) => k <= e,
            Excluded(e) => k < e,
            Unbounded => true,
        })
    }

    /// Returns true if no byte sequence can fall inside the range.
    ///
    /// Ordered maps reject such ranges (`BTreeMap::range` panics on them), so
    /// storage backends check this before handing bounds to their index.
    pub fn is_empty(&self) -> bool {
        match (&self.start, &self.end) {
            (Unbounded, _) | (_, Unbounded) => false,
            (Included(s), Included(e)) => s > e,
            (Included(s), Excluded(e)) | (Excluded(s), Included(e)) => s >= e,
            (Excluded(s), Excluded(e)) => s >= e,
        }
    }
}

impl RangeBounds<Bytes> for BytesRange {
    fn start_bound(&self) -> Bound<&Bytes> {
        self.start.as_ref()
    }
    fn end_bound(&self) -> Bound<&Bytes> {
        self.end.as_ref()
    }
}
