//! Storage behavior tests shared by both backends.

use crate::harness::TestDatabase;
use quarry_storage::{MemoryStore, Storage, WriteBatch};
use quarry_types::keys;

fn exercise_scan_order(store: &dyn Storage) {
    store.put(b"staking_node/zeta", b"z").unwrap();
    store.put(b"staking_node/alpha", b"a").unwrap();
    store.put(b"staking_node/mid", b"m").unwrap();
    store.put(b"pool_operator/x-a", b"other").unwrap();

    let entries = store.scan_prefix(keys::STAKING_NODE_PREFIX.as_bytes()).unwrap();
    let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_slice()).collect();
    assert_eq!(
        keys,
        vec![
            b"staking_node/alpha".as_slice(),
            b"staking_node/mid".as_slice(),
            b"staking_node/zeta".as_slice(),
        ]
    );
}

#[test]
fn rocksdb_scans_in_key_order() {
    let db = TestDatabase::new();
    exercise_scan_order(&*db);
}

#[test]
fn memory_store_scans_in_key_order() {
    let store = MemoryStore::new();
    exercise_scan_order(&store);
}

#[test]
fn backends_agree_on_prefix_boundaries() {
    // "mining_rig/" must not leak into "mining_rig2/" style neighbors.
    for store in [
        Box::new(MemoryStore::new()) as Box<dyn Storage>,
        Box::new(TestDatabase::new().db_clone()) as Box<dyn Storage>,
    ] {
        store.put(b"mining_rig/1-a", b"in").unwrap();
        store.put(b"mining_rigX", b"out").unwrap();
        store.put(b"mining_rih", b"out").unwrap();

        let entries = store.scan_prefix(b"mining_rig/").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, b"mining_rig/1-a".to_vec());
    }
}

#[test]
fn write_batch_applies_all_or_nothing_ops() {
    let db = TestDatabase::new();
    db.put(b"k1", b"old").unwrap();

    let mut batch = WriteBatch::new();
    batch.put(b"k1".to_vec(), b"new".to_vec());
    batch.put(b"k2".to_vec(), b"v2".to_vec());
    batch.delete(b"k1".to_vec());
    db.write_batch(batch).unwrap();

    // Operations apply in insertion order.
    assert_eq!(db.get(b"k1").unwrap(), None);
    assert_eq!(db.get(b"k2").unwrap(), Some(b"v2".to_vec()));
}

#[test]
fn composite_keys_stay_inside_their_prefix() {
    let db = TestDatabase::new();
    db.put(&keys::mining_rig_key(1, "chain-a"), b"rig").unwrap();
    db.put(&keys::cross_chain_message_key("chain-a", 1), b"msg")
        .unwrap();
    db.put(&keys::staking_node_key("op"), b"node").unwrap();

    assert_eq!(db.scan_prefix(keys::MINING_RIG_PREFIX.as_bytes()).unwrap().len(), 1);
    assert_eq!(db.scan_prefix(keys::STAKING_NODE_PREFIX.as_bytes()).unwrap().len(), 1);
    assert_eq!(
        db.scan_prefix(keys::CROSS_CHAIN_MESSAGE_PREFIX.as_bytes()).unwrap().len(),
        1
    );
}
