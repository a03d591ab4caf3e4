//! Range construction over typed keys.
//!
//! A [`Ranger`] turns typed bounds into a [`KeyRange`]: encoded start/end
//! bounds plus a traversal order. Bounds are expressed over encoded keys
//! without the collection namespace; the collection adds it (see
//! [`Prefix::bytes_range`](crate::Prefix::bytes_range)).
//!
//! Prefix ranges cover every key whose encoding starts with the encoded
//! prefix: `[prefix, lex_increment(prefix))`, or `[prefix, ..)` when the
//! prefix has no successor. Leading fields of a composite key are encoded
//! with their self-delimiting encoding, so `PairRange::prefixed("a")` never
//! matches a pair whose first field is `"ab"`.
//!
//! Reversed ranges use the same bounds and only flip the order.

use std::marker::PhantomData;
use std::ops::Bound;

use bytes::{Bytes, BytesMut};
use common::{ScanOrder, lex_increment};

use crate::key::Key;
use crate::pair::Pair;
use crate::triple::Triple;

/// Encoded bounds and traversal order of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    pub start: Bound<Bytes>,
    pub end: Bound<Bytes>,
    pub order: ScanOrder,
}

impl KeyRange {
    pub fn new(start: Bound<Bytes>, end: Bound<Bytes>, order: ScanOrder) -> Self {
        Self { start, end, order }
    }

    /// Covers the whole collection.
    pub fn full(order: ScanOrder) -> Self {
        Self::new(Bound::Unbounded, Bound::Unbounded, order)
    }

    /// Covers every key whose encoding starts with `prefix`.
    pub fn prefix(prefix: Bytes, order: ScanOrder) -> Self {
        if prefix.is_empty() {
            return Self::full(order);
        }
        let end = match lex_increment(&prefix) {
            Some(next) => Bound::Excluded(next),
            None => Bound::Unbounded,
        };
        Self::new(Bound::Included(prefix), end, order)
    }

    /// Same bounds, opposite order.
    pub fn reversed(self) -> Self {
        let order = match self.order {
            ScanOrder::Ascending => ScanOrder::Descending,
            ScanOrder::Descending => ScanOrder::Ascending,
        };
        Self { order, ..self }
    }
}

/// Produces the range a collection scan should cover.
pub trait Ranger<K> {
    fn key_range(&self) -> KeyRange;
}

impl<K> Ranger<K> for KeyRange {
    fn key_range(&self) -> KeyRange {
        self.clone()
    }
}

/// The whole collection, in either order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FullRange {
    order: ScanOrder,
}

impl FullRange {
    pub fn ascending() -> Self {
        Self {
            order: ScanOrder::Ascending,
        }
    }

    pub fn descending() -> Self {
        Self {
            order: ScanOrder::Descending,
        }
    }
}

impl<K> Ranger<K> for FullRange {
    fn key_range(&self) -> KeyRange {
        KeyRange::full(self.order)
    }
}

/// Pair keys sharing a first field.
#[derive(Debug, Clone)]
pub struct PairRange<K1, K2> {
    k1: K1,
    order: ScanOrder,
    _k2: PhantomData<fn() -> K2>,
}

impl<K1: Key, K2: Key> PairRange<K1, K2> {
    /// Every pair whose first field equals `k1`, ascending.
    pub fn prefixed(k1: K1) -> Self {
        Self {
            k1,
            order: ScanOrder::Ascending,
            _k2: PhantomData,
        }
    }

    /// Same keys as [`PairRange::prefixed`], descending.
    pub fn prefixed_reversed(k1: K1) -> Self {
        Self {
            order: ScanOrder::Descending,
            ..Self::prefixed(k1)
        }
    }
}

impl<K1: Key, K2: Key> Ranger<Pair<K1, K2>> for PairRange<K1, K2> {
    fn key_range(&self) -> KeyRange {
        KeyRange::prefix(self.k1.encode_non_terminal_to_bytes(), self.order)
    }
}

/// Triple keys sharing their first field, or their first two fields.
#[derive(Debug, Clone)]
pub struct TripleRange<K1, K2, K3> {
    k1: K1,
    k2: Option<K2>,
    order: ScanOrder,
    _k3: PhantomData<fn() -> K3>,
}

impl<K1: Key, K2: Key, K3: Key> TripleRange<K1, K2, K3> {
    /// Every triple whose first field equals `k1`, ascending.
    pub fn prefixed(k1: K1) -> Self {
        Self {
            k1,
            k2: None,
            order: ScanOrder::Ascending,
            _k3: PhantomData,
        }
    }

    /// Same keys as [`TripleRange::prefixed`], descending.
    pub fn prefixed_reversed(k1: K1) -> Self {
        Self {
            order: ScanOrder::Descending,
            ..Self::prefixed(k1)
        }
    }

    /// Every triple whose first two fields equal `(k1, k2)`, ascending.
    pub fn super_prefixed(k1: K1, k2: K2) -> Self {
        Self {
            k2: Some(k2),
            ..Self::prefixed(k1)
        }
    }

    /// Same keys as [`TripleRange::super_prefixed`], descending.
    pub fn super_prefixed_reversed(k1: K1, k2: K2) -> Self {
        Self {
            order: ScanOrder::Descending,
            ..Self::super_prefixed(k1, k2)
        }
    }
}

impl<K1: Key, K2: Key, K3: Key> Ranger<Triple<K1, K2, K3>> for TripleRange<K1, K2, K3> {
    fn key_range(&self) -> KeyRange {
        let mut prefix = BytesMut::new();
        self.k1.encode_non_terminal(&mut prefix);
        if let Some(k2) = &self.k2 {
            k2.encode_non_terminal(&mut prefix);
        }
        KeyRange::prefix(prefix.freeze(), self.order)
    }
}

/// General-purpose range over any key type.
///
/// Either a prefix or explicit start/end bounds may be set. A prefix here is
/// a whole key encoded with its terminal encoding, so a trailing
/// variable-length field matches partially: `Range::new().prefix(Pair::new(1,
/// "ab"))` covers `(1, "ab")`, `(1, "abc")` and `(1, "abz")`.
///
/// # Panics
///
/// Setting a bound twice, or mixing a prefix with explicit bounds, panics:
/// the resulting range would be ambiguous.
#[derive(Debug, Clone)]
pub struct Range<K> {
    prefix: Option<K>,
    start: Option<Bound<K>>,
    end: Option<Bound<K>>,
    order: ScanOrder,
}

impl<K: Key> Default for Range<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> Range<K> {
    pub fn new() -> Self {
        Self {
            prefix: None,
            start: None,
            end: None,
            order: ScanOrder::Ascending,
        }
    }

    pub fn prefix(mut self, key: K) -> Self {
        assert!(
            self.prefix.is_none() && self.start.is_none() && self.end.is_none(),
            "range prefix cannot be combined with other bounds"
        );
        self.prefix = Some(key);
        self
    }

    pub fn start_inclusive(self, key: K) -> Self {
        self.with_start(Bound::Included(key))
    }

    pub fn start_exclusive(self, key: K) -> Self {
        self.with_start(Bound::Excluded(key))
    }

    pub fn end_inclusive(self, key: K) -> Self {
        self.with_end(Bound::Included(key))
    }

    pub fn end_exclusive(self, key: K) -> Self {
        self.with_end(Bound::Excluded(key))
    }

    pub fn descending(mut self) -> Self {
        self.order = ScanOrder::Descending;
        self
    }

    fn with_start(mut self, bound: Bound<K>) -> Self {
        self.assert_no_prefix();
        assert!(self.start.is_none(), "range start already set");
        self.start = Some(bound);
        self
    }

    fn with_end(mut self, bound: Bound<K>) -> Self {
        self.assert_no_prefix();
        assert!(self.end.is_none(), "range end already set");
        self.end = Some(bound);
        self
    }

    fn assert_no_prefix(&self) {
        assert!(
            self.prefix.is_none(),
            "range prefix cannot be combined with other bounds"
        );
    }
}

fn encode_bound<K: Key>(bound: &Option<Bound<K>>) -> Bound<Bytes> {
    match bound {
        Some(Bound::Included(key)) => Bound::Included(key.encode_to_bytes()),
        Some(Bound::Excluded(key)) => Bound::Excluded(key.encode_to_bytes()),
        Some(Bound::Unbounded) | None => Bound::Unbounded,
    }
}

impl<K: Key> Ranger<K> for Range<K> {
    fn key_range(&self) -> KeyRange {
        match &self.prefix {
            Some(prefix) => KeyRange::prefix(prefix.encode_to_bytes(), self.order),
            None => KeyRange::new(
                encode_bound(&self.start),
                encode_bound(&self.end),
                self.order,
            ),
        }
    }
}
