use std::sync::Arc;

use bytes::Bytes;
use collections::{CollectionsDb, Error, FullRange, IteratorState, KeySet, Map, Pair, PairRange};
use common::storage::in_memory::{FailingStorage, InMemoryStorage};
use common::{Record, Storage, StorageError};

async fn seeded() -> (Arc<InMemoryStorage>, Map<Pair<u64, u64>, String>) {
    let storage = Arc::new(InMemoryStorage::new());
    let db = CollectionsDb::from_storage(storage.clone());
    let map = db.map(0x01u8);
    for n in 1..=3u64 {
        map.set(&Pair::new(1, n), &format!("v{}", n)).await.unwrap();
    }
    (storage, map)
}

#[tokio::test]
async fn should_allow_closing_twice_and_release_cursor() {
    // given
    let (storage, map) = seeded().await;
    let mut iter = map.iterate(&PairRange::prefixed(1)).await.unwrap();
    assert!(iter.advance().await.unwrap());
    assert_eq!(storage.open_iterators(), 1);

    // when
    iter.close();
    iter.close();

    // then
    assert_eq!(iter.state(), IteratorState::Closed);
    assert_eq!(storage.open_iterators(), 0);
    assert!(matches!(iter.key(), Err(Error::Iterator(_))));
}

#[tokio::test]
async fn should_release_cursor_when_decode_fails_mid_scan() {
    // given a record under the map's namespace whose key has a trailing byte
    let (storage, map) = seeded().await;
    let mut bad_key = map.prefix().encode_key(&Pair::new(1u64, 2u64)).to_vec();
    bad_key.push(0x00);
    storage
        .put(vec![Record::new(Bytes::from(bad_key), Bytes::from("v"))])
        .await
        .unwrap();
    let mut iter = map.iterate(&PairRange::prefixed(1)).await.unwrap();

    // when
    let result = iter.entries().await;

    // then
    assert!(matches!(result, Err(Error::Codec(_))));
    assert_eq!(iter.state(), IteratorState::Closed);
    assert_eq!(storage.open_iterators(), 0);
    iter.close();
}

#[tokio::test]
async fn should_stay_exhausted_after_last_entry() {
    // given
    let (storage, map) = seeded().await;
    let mut iter = map.iterate(&FullRange::descending()).await.unwrap();

    // when
    let mut seen = Vec::new();
    while let Some((key, value)) = iter.next().await.unwrap() {
        seen.push((key.split().1, value));
    }

    // then
    assert_eq!(
        seen,
        vec![
            (3, "v3".to_string()),
            (2, "v2".to_string()),
            (1, "v1".to_string())
        ]
    );
    assert_eq!(iter.state(), IteratorState::Exhausted);
    assert_eq!(iter.next().await.unwrap(), None);
    assert!(matches!(iter.value(), Err(Error::Iterator(_))));
    assert_eq!(storage.open_iterators(), 0);
}

#[tokio::test]
async fn should_pass_cursor_error_through_unchanged() {
    // given
    let inner = Arc::new(InMemoryStorage::new());
    let storage = FailingStorage::wrap(inner.clone());
    let set: KeySet<u64> = CollectionsDb::from_storage(storage.clone()).key_set("s");
    set.set(&1).await.unwrap();
    set.set(&2).await.unwrap();
    let mut iter = set.iterate(&FullRange::ascending()).await.unwrap();
    assert!(iter.advance().await.unwrap());
    let injected = StorageError::Storage("connection reset".to_string());
    storage.fail_next_once(injected.clone());

    // when
    let result = iter.keys().await;

    // then
    assert_eq!(result, Err(Error::Storage(injected)));
    assert_eq!(iter.state(), IteratorState::Closed);
    assert_eq!(inner.open_iterators(), 0);
}

#[tokio::test]
async fn should_release_cursor_when_iterator_is_dropped() {
    let (storage, map) = seeded().await;

    {
        let mut iter = map.iterate(&FullRange::ascending()).await.unwrap();
        iter.advance().await.unwrap();
        assert_eq!(storage.open_iterators(), 1);
    }

    assert_eq!(storage.open_iterators(), 0);
}
