//! Reward schedule and distribution tests against the real store.

use crate::generators::rig;
use crate::harness::{RecordingCustody, TestDatabase};
use quarry_mining::{MiningError, RewardLedger};
use quarry_storage::Storage;
use quarry_types::{MiningRig, HALVING_INTERVAL, INITIAL_BLOCK_REWARD, NATIVE_DENOM};

fn seed_rig(db: &TestDatabase, rig: &MiningRig) {
    db.put(&rig.store_key(), &serde_json::to_vec(rig).unwrap())
        .unwrap();
}

fn production_ledger() -> RewardLedger {
    RewardLedger::with_schedule(INITIAL_BLOCK_REWARD, HALVING_INTERVAL)
}

#[test]
fn reward_halves_on_schedule() {
    let ledger = production_ledger();
    assert_eq!(ledger.base_reward(0), INITIAL_BLOCK_REWARD);
    assert_eq!(ledger.base_reward(HALVING_INTERVAL - 1), INITIAL_BLOCK_REWARD);
    assert_eq!(ledger.base_reward(HALVING_INTERVAL), INITIAL_BLOCK_REWARD / 2);
    assert_eq!(
        ledger.base_reward(HALVING_INTERVAL * 3),
        INITIAL_BLOCK_REWARD / 8
    );
}

#[test]
fn emission_ends_after_sixty_four_halvings() {
    let ledger = production_ledger();
    assert_ne!(ledger.base_reward(HALVING_INTERVAL * 63), 0);
    assert_eq!(ledger.base_reward(HALVING_INTERVAL * 64), 0);
    assert_eq!(ledger.base_reward(i64::MAX), 0);
}

#[test]
fn exhausted_emission_issues_nothing() {
    let ledger = RewardLedger::with_schedule(1_000, 10);
    let custody = RecordingCustody::default();
    let paid = ledger
        .issue_attempt_reward(&custody, "qry1miner", 10 * 64)
        .unwrap();
    assert_eq!(paid, 0);
    assert_eq!(custody.balance("qry1miner", NATIVE_DENOM), 0);
}

#[test]
fn no_rigs_is_reported_as_no_active_miners() {
    let db = TestDatabase::new();
    let custody = RecordingCustody::default();
    let err = production_ledger()
        .distribute_mining_rewards(&*db, &custody, 1)
        .unwrap_err();
    assert!(matches!(err, MiningError::NoActiveMiners));
}

#[test]
fn all_rigs_inactive_is_also_no_active_miners() {
    let db = TestDatabase::new();
    let mut parked = rig(1, "qry1a", 900);
    parked.is_active = false;
    seed_rig(&db, &parked);

    let custody = RecordingCustody::default();
    let err = production_ledger()
        .distribute_mining_rewards(&*db, &custody, 1)
        .unwrap_err();
    assert!(matches!(err, MiningError::NoActiveMiners));
    assert_eq!(custody.balance("qry1a", NATIVE_DENOM), 0);
}

#[test]
fn single_rig_takes_the_whole_reward() {
    let db = TestDatabase::new();
    seed_rig(&db, &rig(1, "qry1solo", 123));

    let custody = RecordingCustody::default();
    let outcome = production_ledger()
        .distribute_mining_rewards(&*db, &custody, 1)
        .unwrap();

    assert_eq!(outcome.total_paid, INITIAL_BLOCK_REWARD);
    assert_eq!(outcome.miners_paid, 1);
    assert_eq!(outcome.total_hash_power, 123);
    assert_eq!(custody.balance("qry1solo", NATIVE_DENOM), INITIAL_BLOCK_REWARD);
}

#[test]
fn tiny_share_floors_to_zero_without_a_transfer() {
    let db = TestDatabase::new();
    // With a 10-unit reward, a 1-in-20 share floors to zero.
    seed_rig(&db, &rig(1, "qry1whale", 19));
    seed_rig(&db, &rig(2, "qry1dust", 1));

    let ledger = RewardLedger::with_schedule(10, HALVING_INTERVAL);
    let custody = RecordingCustody::default();
    let outcome = ledger.distribute_mining_rewards(&*db, &custody, 1).unwrap();

    assert_eq!(custody.balance("qry1dust", NATIVE_DENOM), 0);
    assert_eq!(custody.balance("qry1whale", NATIVE_DENOM), 9);
    assert_eq!(outcome.miners_paid, 1);
}

#[test]
fn distribution_after_a_halving_uses_the_halved_reward() {
    let db = TestDatabase::new();
    seed_rig(&db, &rig(1, "qry1a", 1));

    let ledger = RewardLedger::with_schedule(1_000, 100);
    let custody = RecordingCustody::default();
    let outcome = ledger.distribute_mining_rewards(&*db, &custody, 250).unwrap();
    assert_eq!(outcome.total_paid, 250);
}
