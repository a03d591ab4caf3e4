//! Typed, ordered collections over a byte-keyed store.
//!
//! Collections map typed keys onto an ordered byte store with encodings that
//! preserve order, so range scans over the store return typed keys in their
//! natural order. Composite keys make hierarchical layouts possible: a
//! `Triple<UserId, Folder, MessageId>` set can be scanned per user or per
//! folder of a user, forwards or backwards.
//!
//! # Key Concepts
//!
//! - **Key**: order-preserving encoding of a single value, implemented for
//!   unsigned and signed integers, `bool`, `String`, `Bytes` and `Vec<u8>`.
//! - **Pair / Triple**: composite keys ordered field by field.
//! - **Ranger**: describes a scan. [`FullRange`], [`PairRange`] and
//!   [`TripleRange`] cover the common prefix scans; [`Range`] takes arbitrary
//!   bounds.
//! - **KeySet / Map**: collections living under a namespace [`Prefix`] of a
//!   shared store.
//! - **CollectionIterator**: cursor over a range with explicit state, returned
//!   by `iterate`.
//!
//! # Example
//!
//! ```ignore
//! use collections::{CollectionsDb, Config, KeySet, Triple, TripleRange};
//!
//! let db = CollectionsDb::open(Config::default()).await?;
//! let inbox: KeySet<Triple<u64, String, u64>> = db.key_set(0x01u8);
//!
//! inbox.set(&Triple::new(1, "inbox".to_string(), 10)).await?;
//! inbox.set(&Triple::new(1, "inbox".to_string(), 11)).await?;
//!
//! // newest first
//! let mut iter = inbox
//!     .iterate(&TripleRange::super_prefixed_reversed(1, "inbox".to_string()))
//!     .await?;
//! while let Some((key, _)) = iter.next().await? {
//!     println!("{:?}", key.split());
//! }
//! iter.close();
//! ```

mod config;
mod db;
mod error;
mod iterator;
mod key;
mod keyset;
mod map;
mod pair;
mod prefix;
mod range;
mod triple;
mod value;

pub use config::Config;
pub use db::CollectionsDb;
pub use error::{Error, Result};
pub use iterator::{CollectionIterator, IteratorState, KeySetIterator, MapIterator};
pub use key::Key;
pub use keyset::KeySet;
pub use map::Map;
pub use pair::Pair;
pub use prefix::Prefix;
pub use range::{FullRange, KeyRange, PairRange, Range, Ranger, TripleRange};
pub use triple::Triple;
pub use value::{NoValue, Value};
