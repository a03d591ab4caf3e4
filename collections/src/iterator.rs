//! Typed iteration over a collection range.
//!
//! A [`CollectionIterator`] wraps a store cursor and moves through four
//! states:
//!
//! ```text
//!          advance                advance (no more records)
//!   Open ─────────► Valid ◄──┐ ──────────────────────────► Exhausted
//!     │               │  └───┘ advance                         │
//!     │               │                                        │
//!     └───────────────┴──────── close / store error ───────────┴──► Closed
//! ```
//!
//! The store cursor is released when the iterator reaches `Exhausted` or
//! `Closed`, and when it is dropped.

use std::fmt;
use std::marker::PhantomData;

use common::{Record, StorageIterator};

use crate::error::{Error, Result};
use crate::key::Key;
use crate::prefix::Prefix;
use crate::value::{NoValue, Value};

type Cursor = Box<dyn StorageIterator + Send + 'static>;

/// Observable state of a [`CollectionIterator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IteratorState {
    /// Created, not advanced yet.
    Open,
    /// Positioned on an entry.
    Valid,
    /// Advanced past the last entry of the range.
    Exhausted,
    /// Closed explicitly or after a store error.
    Closed,
}

impl fmt::Display for IteratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IteratorState::Open => "open",
            IteratorState::Valid => "valid",
            IteratorState::Exhausted => "exhausted",
            IteratorState::Closed => "closed",
        };
        f.write_str(name)
    }
}

enum State {
    Open(Cursor),
    Valid { cursor: Cursor, current: Record },
    Exhausted,
    Closed,
}

impl State {
    fn public(&self) -> IteratorState {
        match self {
            State::Open(_) => IteratorState::Open,
            State::Valid { .. } => IteratorState::Valid,
            State::Exhausted => IteratorState::Exhausted,
            State::Closed => IteratorState::Closed,
        }
    }
}

/// Iterator over the entries of a collection range.
pub struct CollectionIterator<K, V> {
    prefix: Prefix,
    state: State,
    _marker: PhantomData<fn() -> (K, V)>,
}

/// Iterator returned by [`KeySet::iterate`](crate::KeySet::iterate).
pub type KeySetIterator<K> = CollectionIterator<K, NoValue>;

/// Iterator returned by [`Map::iterate`](crate::Map::iterate).
pub type MapIterator<K, V> = CollectionIterator<K, V>;

impl<K: Key, V: Value> CollectionIterator<K, V> {
    pub(crate) fn new(prefix: Prefix, cursor: Cursor) -> Self {
        Self {
            prefix,
            state: State::Open(cursor),
            _marker: PhantomData,
        }
    }

    pub fn state(&self) -> IteratorState {
        self.state.public()
    }

    /// Returns true when positioned on an entry.
    pub fn is_valid(&self) -> bool {
        matches!(self.state, State::Valid { .. })
    }

    /// Moves to the next entry of the range.
    ///
    /// Returns `Ok(true)` when positioned on an entry and `Ok(false)` once the
    /// range is exhausted; advancing an exhausted iterator keeps returning
    /// `Ok(false)`. A store error is returned unchanged and closes the
    /// iterator. Advancing a closed iterator is an [`Error::Iterator`].
    ///
    /// Dropping the returned future before it completes leaves the iterator
    /// closed.
    pub async fn advance(&mut self) -> Result<bool> {
        let mut cursor = match std::mem::replace(&mut self.state, State::Closed) {
            State::Open(cursor) | State::Valid { cursor, .. } => cursor,
            State::Exhausted => {
                self.state = State::Exhausted;
                return Ok(false);
            }
            State::Closed => {
                return Err(Error::Iterator(
                    "cannot advance a closed iterator".to_string(),
                ));
            }
        };

        match cursor.next().await? {
            Some(current) => {
                self.state = State::Valid { cursor, current };
                Ok(true)
            }
            None => {
                self.state = State::Exhausted;
                Ok(false)
            }
        }
    }

    fn current(&self) -> Result<&Record> {
        match &self.state {
            State::Valid { current, .. } => Ok(current),
            other => Err(Error::Iterator(format!(
                "no current entry: iterator is {}",
                other.public()
            ))),
        }
    }

    /// Decodes the key of the current entry.
    pub fn key(&self) -> Result<K> {
        self.prefix.decode_key(&self.current()?.key)
    }

    /// Decodes the value of the current entry.
    pub fn value(&self) -> Result<V> {
        V::decode_value(&self.current()?.value)
    }

    /// Decodes the current entry.
    pub fn entry(&self) -> Result<(K, V)> {
        Ok((self.key()?, self.value()?))
    }

    /// Advances and returns the entry it lands on, or `None` at the end.
    pub async fn next(&mut self) -> Result<Option<(K, V)>> {
        if !self.advance().await? {
            return Ok(None);
        }
        self.entry().map(Some)
    }

    /// Collects the remaining keys and closes the iterator.
    pub async fn keys(&mut self) -> Result<Vec<K>> {
        self.drain(Self::key).await
    }

    /// Collects the remaining values and closes the iterator.
    pub async fn values(&mut self) -> Result<Vec<V>> {
        self.drain(Self::value).await
    }

    /// Collects the remaining entries and closes the iterator.
    pub async fn entries(&mut self) -> Result<Vec<(K, V)>> {
        self.drain(Self::entry).await
    }

    /// Releases the store cursor. Closing twice is a no-op.
    pub fn close(&mut self) {
        self.state = State::Closed;
    }

    async fn drain<T>(&mut self, decode: fn(&Self) -> Result<T>) -> Result<Vec<T>> {
        let result = self.collect_remaining(decode).await;
        if let Err(err) = &result {
            tracing::debug!("closing iterator after error: {}", err);
        }
        self.close();
        result
    }

    async fn collect_remaining<T>(&mut self, decode: fn(&Self) -> Result<T>) -> Result<Vec<T>> {
        let mut out = Vec::new();
        while self.advance().await? {
            out.push(decode(self)?);
        }
        Ok(out)
    }
}

impl<K, V> fmt::Debug for CollectionIterator<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionIterator")
            .field("prefix", &self.prefix)
            .field("state", &self.state.public())
            .finish()
    }
}
