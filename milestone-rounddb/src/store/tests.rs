use milestone_crypto::sponge::standard_hash;

use super::{MemoryRoundStore, RocksRoundStore, RoundStore};
use crate::Round;

fn with_tmp_db<T>(op: fn(db: RocksRoundStore) -> T) {
    let path = tempfile::tempdir().unwrap().into_path();
    let db = RocksRoundStore::open(path.clone()).unwrap();

    op(db);

    RocksRoundStore::destroy(path).unwrap();
}

fn dummy_round(index: u64) -> Round {
    Round::new(index, [standard_hash(&index.to_be_bytes())])
}

fn check_point_lookups(store: &impl RoundStore) {
    assert_eq!(store.load(5).unwrap(), None);

    let round = dummy_round(5);
    store.save(&round).unwrap();
    assert_eq!(store.load(5).unwrap(), Some(round.clone()));

    let mut grown = round.clone();
    grown.add_milestone(standard_hash(b"second milestone"));
    store.update_hashes(&grown).unwrap();
    assert_eq!(store.load(5).unwrap().unwrap().len(), 2);

    store.delete(5).unwrap();
    assert_eq!(store.load(5).unwrap(), None);
}

fn check_navigation(store: &impl RoundStore) {
    assert_eq!(store.first().unwrap(), None);
    assert_eq!(store.latest().unwrap(), None);

    // larger than one byte so the key order is exercised
    for index in [3, 300, 70_000, 12] {
        store.save(&dummy_round(index)).unwrap();
    }

    assert_eq!(store.first().unwrap().unwrap().index(), 3);
    assert_eq!(store.latest().unwrap().unwrap().index(), 70_000);

    assert_eq!(store.next(3).unwrap().unwrap().index(), 12);
    assert_eq!(store.next(12).unwrap().unwrap().index(), 300);
    assert_eq!(store.next(13).unwrap().unwrap().index(), 300);
    assert_eq!(store.next(70_000).unwrap(), None);

    assert_eq!(store.previous(300).unwrap().unwrap().index(), 12);
    assert_eq!(store.previous(299).unwrap().unwrap().index(), 12);
    assert_eq!(store.previous(100_000).unwrap().unwrap().index(), 70_000);
    assert_eq!(store.previous(3).unwrap(), None);
    assert_eq!(store.previous(0).unwrap(), None);
}

#[test]
fn memory_point_lookups() {
    check_point_lookups(&MemoryRoundStore::new());
}

#[test]
fn memory_navigation() {
    check_navigation(&MemoryRoundStore::new());
}

#[test]
fn rocks_point_lookups() {
    with_tmp_db(|db| check_point_lookups(&db));
}

#[test]
fn rocks_navigation() {
    with_tmp_db(|db| check_navigation(&db));
}

#[test]
fn rocks_reset_drops_rounds() {
    with_tmp_db(|db| {
        db.save(&dummy_round(1)).unwrap();
        db.save(&dummy_round(2)).unwrap();

        db.reset().unwrap();

        assert_eq!(db.first().unwrap(), None);
        assert_eq!(db.load(2).unwrap(), None);
    });
}

#[test]
fn rocks_survives_reopen() {
    let path = tempfile::tempdir().unwrap().into_path();

    {
        let db = RocksRoundStore::open(&path).unwrap();
        db.save(&dummy_round(41)).unwrap();
    }

    let db = RocksRoundStore::open(&path).unwrap();
    assert_eq!(db.load(41).unwrap(), Some(dummy_round(41)));
    drop(db);

    RocksRoundStore::destroy(path).unwrap();
}
