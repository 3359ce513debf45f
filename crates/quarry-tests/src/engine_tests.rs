//! Whole-engine block lifecycle tests.

use crate::generators::{block_ctx, rig, staking_node};
use crate::harness::TestEngine;
use quarry_consensus::params::TARGET_WINDOW_MS;
use quarry_engine::EngineError;
use quarry_mining::MiningError;
use quarry_registry::RegistryError;
use quarry_storage::Storage;
use quarry_types::{
    EngineEvent, GenesisState, MiningRig, Params, MIN_NODE_STAKE, MODULE_ACCOUNT, NATIVE_DENOM,
    STAKING_REWARD_PER_CHAIN,
};

fn seed_rig(harness: &TestEngine, rig: &MiningRig) {
    harness
        .store
        .put(&rig.store_key(), &serde_json::to_vec(rig).unwrap())
        .unwrap();
}

#[test]
fn difficulty_starts_at_default() {
    let t = TestEngine::new();
    assert_eq!(t.engine.difficulty().unwrap(), 1_000_000);
}

#[test]
fn first_retarget_anchors_without_adjusting() {
    let t = TestEngine::new();
    let ctx = block_ctx(2016, 10_000_000);
    t.engine.on_block_start(&ctx).unwrap();

    // No window history yet, so the value holds.
    assert_eq!(t.engine.difficulty().unwrap(), 1_000_000);
    let events = t.engine.take_events();
    assert!(matches!(
        events[0],
        EngineEvent::DifficultyAdjusted {
            old_difficulty: 1_000_000,
            new_difficulty: 1_000_000,
            height: 2016,
        }
    ));
}

#[test]
fn fast_window_raises_difficulty_at_next_boundary() {
    let t = TestEngine::new();
    let anchor_ts = 10_000_000i64;
    t.engine
        .on_block_start(&block_ctx(2016, anchor_ts))
        .unwrap();

    // The next window completes in half the target time.
    let next_ts = anchor_ts + (TARGET_WINDOW_MS / 2) as i64;
    t.engine.on_block_start(&block_ctx(4032, next_ts)).unwrap();
    assert_eq!(t.engine.difficulty().unwrap(), 2_000_000);
}

#[test]
fn off_boundary_blocks_leave_difficulty_alone() {
    let t = TestEngine::new();
    t.engine.on_block_start(&block_ctx(2015, 1_000)).unwrap();
    t.engine.on_block_start(&block_ctx(2017, 2_000)).unwrap();
    assert_eq!(t.engine.difficulty().unwrap(), 1_000_000);
    assert!(t.engine.take_events().is_empty());
}

#[test]
fn verified_attempt_pays_miner_and_queues_batch() {
    let t = TestEngine::new();
    let ctx = block_ctx(10, 5_000);
    let batch = t.engine.mine(&ctx, "qry1miner", b"proof").unwrap();
    assert_eq!(batch.height, 10);
    assert_eq!(batch.block_hash, ctx.block_hash.to_vec());

    // Per-attempt issuance lands immediately.
    assert_eq!(
        t.custody.balance("qry1miner", NATIVE_DENOM),
        50_000_000_000_000_000
    );
    // Settlement waits for the end-of-block flush.
    assert!(t.l1.batches.lock().is_empty());

    t.engine.on_block_end(&ctx).unwrap();
    assert_eq!(t.l1.batches.lock().len(), 1);
    assert!(t
        .engine
        .take_events()
        .iter()
        .any(|e| matches!(e, EngineEvent::BatchSubmitted { height: 10, .. })));
}

#[test]
fn invalid_proof_is_terminal_and_pays_nothing() {
    let t = TestEngine::rejecting();
    let ctx = block_ctx(10, 5_000);
    let err = t.engine.mine(&ctx, "qry1miner", b"bogus").unwrap_err();
    assert!(matches!(
        err,
        EngineError::Mining(MiningError::InvalidProof)
    ));
    assert_eq!(t.custody.balance("qry1miner", NATIVE_DENOM), 0);

    t.engine.on_block_end(&ctx).unwrap();
    assert!(t.l1.batches.lock().is_empty());
}

#[test]
fn distribution_splits_by_hash_power() {
    let t = TestEngine::new();
    seed_rig(&t, &rig(1, "qry1a", 500));
    seed_rig(&t, &rig(2, "qry1b", 300));
    seed_rig(&t, &rig(3, "qry1c", 200));

    let ctx = block_ctx(100, 50_000);
    t.engine.on_block_end(&ctx).unwrap();

    assert_eq!(t.custody.balance("qry1a", NATIVE_DENOM), 25_000_000_000_000_000);
    assert_eq!(t.custody.balance("qry1b", NATIVE_DENOM), 15_000_000_000_000_000);
    assert_eq!(t.custody.balance("qry1c", NATIVE_DENOM), 10_000_000_000_000_000);

    let events = t.engine.take_events();
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::RewardsDistributed {
            height: 100,
            total_mining_reward: 50_000_000_000_000_000,
            miners_paid: 3,
            nodes_paid: 0,
        }
    )));
}

#[test]
fn inactive_rigs_earn_nothing() {
    let t = TestEngine::new();
    seed_rig(&t, &rig(1, "qry1a", 500));
    let mut parked = rig(2, "qry1b", 500);
    parked.is_active = false;
    seed_rig(&t, &parked);

    t.engine.on_block_end(&block_ctx(100, 50_000)).unwrap();

    assert_eq!(t.custody.balance("qry1a", NATIVE_DENOM), 50_000_000_000_000_000);
    assert_eq!(t.custody.balance("qry1b", NATIVE_DENOM), 0);
}

#[test]
fn unresolvable_owner_is_skipped_not_fatal() {
    let t = TestEngine::new();
    seed_rig(&t, &rig(1, "qry1good", 500));
    seed_rig(&t, &rig(2, "qry1bad", 500));
    t.custody.invalid_addresses.lock().push("qry1bad".into());

    t.engine.on_block_end(&block_ctx(100, 50_000)).unwrap();

    assert_eq!(t.custody.balance("qry1good", NATIVE_DENOM), 25_000_000_000_000_000);
    assert_eq!(t.custody.balance("qry1bad", NATIVE_DENOM), 0);
}

#[test]
fn empty_miner_set_still_pays_staking_nodes() {
    let t = TestEngine::new();
    t.engine
        .register_node(
            &block_ctx(1, 500),
            "qry1op",
            "lone-node",
            vec!["polygon-137".into()],
            MIN_NODE_STAKE,
        )
        .unwrap();

    // No rigs at all: mining distribution reports the gap, staking
    // payouts still go out.
    t.engine.on_block_end(&block_ctx(2, 1_000)).unwrap();

    let payouts = t.transport.sent_to("polygon-137");
    assert_eq!(payouts.len(), 1);
    let payout: serde_json::Value = serde_json::from_slice(&payouts[0]).unwrap();
    assert_eq!(payout["type"], "watt_reward");
    assert_eq!(payout["recipient"], "qry1op");
    assert_eq!(payout["amount"], STAKING_REWARD_PER_CHAIN.to_string());
    assert_eq!(payout["denom"], "watt");

    let events = t.engine.take_events();
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::RewardsDistributed {
            miners_paid: 0,
            nodes_paid: 1,
            ..
        }
    )));
}

#[test]
fn offline_nodes_get_no_staking_payout() {
    let t = TestEngine::new();
    t.engine
        .register_node(
            &block_ctx(1, 500),
            "qry1op",
            "flaky-node",
            vec!["polygon-137".into()],
            MIN_NODE_STAKE,
        )
        .unwrap();
    t.engine.update_online_status("qry1op", false, 2).unwrap();

    t.engine.on_block_end(&block_ctx(2, 1_000)).unwrap();
    assert!(t.transport.sent_to("polygon-137").is_empty());
}

#[test]
fn each_supported_chain_gets_its_own_payout() {
    let t = TestEngine::new();
    t.engine
        .register_node(
            &block_ctx(1, 500),
            "qry1op",
            "multi-node",
            vec!["polygon-137".into(), "altcoinchain-2330".into()],
            MIN_NODE_STAKE,
        )
        .unwrap();

    t.engine.on_block_end(&block_ctx(2, 1_000)).unwrap();
    assert_eq!(t.transport.sent_to("polygon-137").len(), 1);
    assert_eq!(t.transport.sent_to("altcoinchain-2330").len(), 1);
}

#[test]
fn registration_enforces_minimum_stake() {
    let t = TestEngine::new();
    let err = t
        .engine
        .register_node(
            &block_ctx(1, 500),
            "qry1poor",
            "under-node",
            vec!["polygon-137".into()],
            MIN_NODE_STAKE - 1,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Registry(RegistryError::InsufficientStake { .. })
    ));
    assert!(t.engine.staking_node("qry1poor").unwrap().is_none());
}

#[test]
fn registration_is_create_once() {
    let t = TestEngine::new();
    let ctx = block_ctx(1, 500);
    let node = t
        .engine
        .register_node(&ctx, "qry1op", "first", vec!["polygon-137".into()], MIN_NODE_STAKE)
        .unwrap();
    assert_eq!(node.voting_power, 21);

    let err = t
        .engine
        .register_node(&ctx, "qry1op", "second", vec!["polygon-137".into()], MIN_NODE_STAKE)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Registry(RegistryError::AlreadyRegistered(_))
    ));

    // The original record is untouched.
    let stored = t.engine.staking_node("qry1op").unwrap().unwrap();
    assert_eq!(stored.moniker, "first");
}

#[test]
fn status_transitions_emit_events() {
    let t = TestEngine::new();
    let ctx = block_ctx(1, 500);
    t.engine
        .register_node(&ctx, "qry1op", "node", vec!["polygon-137".into()], MIN_NODE_STAKE)
        .unwrap();
    t.engine.take_events();

    t.engine.update_online_status("qry1op", false, 2).unwrap();
    t.engine.update_online_status("qry1op", false, 3).unwrap();
    t.engine.update_online_status("qry1op", true, 4).unwrap();

    let events = t.engine.take_events();
    let transitions: Vec<_> = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                EngineEvent::StakingNodeOffline { .. } | EngineEvent::StakingNodeOnline { .. }
            )
        })
        .collect();
    // Only the two flips, not the repeated miss.
    assert_eq!(transitions.len(), 2);

    let node = t.engine.staking_node("qry1op").unwrap().unwrap();
    assert!(node.is_online);
    assert_eq!(node.last_block_signed, 4);
}

#[test]
fn l1_failure_drops_batch_without_failing_the_block() {
    let t = TestEngine::new();
    *t.l1.fail.lock() = true;

    let ctx = block_ctx(10, 5_000);
    t.engine.mine(&ctx, "qry1miner", b"proof").unwrap();
    t.engine.on_block_end(&ctx).unwrap();

    assert!(t.l1.batches.lock().is_empty());
    assert!(!t
        .engine
        .take_events()
        .iter()
        .any(|e| matches!(e, EngineEvent::BatchSubmitted { .. })));
}

#[test]
fn sync_peer_receives_end_of_block_notice() {
    let params = Params {
        sync_peer_chain: Some("zchain-1".into()),
        ..Params::default()
    };
    let t = TestEngine::with_params(params);

    t.engine.on_block_end(&block_ctx(5, 2_500)).unwrap();

    let notices = t.transport.sent_to("zchain-1");
    assert_eq!(notices.len(), 1);
    let notice: serde_json::Value = serde_json::from_slice(&notices[0]).unwrap();
    assert_eq!(notice["type"], "block_sync");
    assert_eq!(notice["block_height"], 5);
    assert_eq!(notice["difficulty"], 1_000_000);
}

#[test]
fn sync_peer_is_notified_of_mined_rewards() {
    let params = Params {
        sync_peer_chain: Some("zchain-1".into()),
        ..Params::default()
    };
    let t = TestEngine::with_params(params);
    let ctx = block_ctx(10, 5_000);

    t.engine.mine(&ctx, "qry1miner", b"proof").unwrap();
    t.engine.on_block_end(&ctx).unwrap();

    let notices: Vec<serde_json::Value> = t
        .transport
        .sent_to("zchain-1")
        .iter()
        .map(|bytes| serde_json::from_slice(bytes).unwrap())
        .filter(|v: &serde_json::Value| v["type"] == "reward_distribution")
        .collect();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["miner"], "qry1miner");
    assert_eq!(notices[0]["reward"], "50000000000000000");
    assert_eq!(notices[0]["block_height"], 10);
    assert_eq!(notices[0]["timestamp"], 5);
}

#[test]
fn unmined_block_sends_no_reward_notice() {
    let params = Params {
        sync_peer_chain: Some("zchain-1".into()),
        ..Params::default()
    };
    let t = TestEngine::with_params(params);

    t.engine.on_block_end(&block_ctx(5, 2_500)).unwrap();

    let notices = t.transport.sent_to("zchain-1");
    // Only the block sync notice goes out.
    assert_eq!(notices.len(), 1);
    let notice: serde_json::Value = serde_json::from_slice(&notices[0]).unwrap();
    assert_eq!(notice["type"], "block_sync");
}

#[test]
fn genesis_seeds_rigs_and_nodes() {
    let t = TestEngine::new();
    let genesis = GenesisState {
        mining_rigs: vec![rig(9, "qry1seed", 700)],
        staking_nodes: vec![staking_node("qry1genesis", &["polygon-137"])],
        ..GenesisState::default()
    };
    t.engine.init_genesis(&genesis).unwrap();

    assert_eq!(t.engine.total_hash_power().unwrap(), 700);
    let node = t.engine.staking_node("qry1genesis").unwrap().unwrap();
    assert!(node.is_online);
}

#[test]
fn rejected_genesis_leaves_engine_usable() {
    let t = TestEngine::new();
    let genesis = GenesisState {
        staking_nodes: vec![{
            let mut n = staking_node("qry1weak", &["polygon-137"]);
            n.staked_amount = 1;
            n
        }],
        ..GenesisState::default()
    };
    assert!(matches!(
        t.engine.init_genesis(&genesis),
        Err(EngineError::Config(_))
    ));
    assert!(t.engine.staking_node("qry1weak").unwrap().is_none());
}

#[test]
fn rounding_dust_is_never_minted() {
    let t = TestEngine::new();
    // 3 rigs of weight 1 against a reward of 50e15: each share is
    // floored and the dust is simply not issued.
    seed_rig(&t, &rig(1, "qry1a", 1));
    seed_rig(&t, &rig(2, "qry1b", 1));
    seed_rig(&t, &rig(3, "qry1c", 1));

    t.engine.on_block_end(&block_ctx(100, 50_000)).unwrap();

    let per_rig = 50_000_000_000_000_000u128 / 3;
    assert_eq!(t.custody.balance("qry1a", NATIVE_DENOM), per_rig);
    assert_eq!(t.custody.balance("qry1b", NATIVE_DENOM), per_rig);
    assert_eq!(t.custody.balance("qry1c", NATIVE_DENOM), per_rig);
    assert!(per_rig * 3 < 50_000_000_000_000_000);
    assert_eq!(t.custody.balance(MODULE_ACCOUNT, NATIVE_DENOM), 0);
}
