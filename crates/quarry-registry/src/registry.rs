//! Staking node bookkeeping.

use crate::{RegistryError, RegistryResult};
use quarry_storage::Storage;
use quarry_types::keys::{staking_node_key, STAKING_NODE_PREFIX};
use quarry_types::{Amount, StakingNode, BASE_UNITS_PER_TOKEN};
use tracing::{debug, info};

/// An online/offline flip observed by the per-block signer feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    /// Node signed after being offline.
    CameOnline,
    /// Node missed a block after being online.
    WentOffline,
}

/// Registry of staking nodes.
///
/// Stateless over the store: each operation loads, validates, and writes
/// through. `min_stake` comes from validated module parameters.
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    min_stake: Amount,
}

impl NodeRegistry {
    /// Create a registry enforcing the given minimum stake.
    pub fn new(min_stake: Amount) -> Self {
        Self { min_stake }
    }

    /// Register a new staking node.
    ///
    /// `verified_stake` is the operator's stake as confirmed by the
    /// staking collaborator. Registration is create-once: an operator
    /// that already has a node is rejected, and no state changes on any
    /// failure path.
    pub fn register_node(
        &self,
        store: &dyn Storage,
        operator: &str,
        moniker: &str,
        supported_chains: Vec<String>,
        verified_stake: Amount,
        height: i64,
    ) -> RegistryResult<StakingNode> {
        if operator.is_empty() {
            return Err(RegistryError::Validation("operator cannot be empty".into()));
        }
        if moniker.is_empty() {
            return Err(RegistryError::Validation("moniker cannot be empty".into()));
        }
        if supported_chains.is_empty() {
            return Err(RegistryError::Validation(
                "supported chains cannot be empty".into(),
            ));
        }
        if verified_stake < self.min_stake {
            return Err(RegistryError::InsufficientStake {
                required: self.min_stake,
                got: verified_stake,
            });
        }
        if store.contains(&staking_node_key(operator))? {
            return Err(RegistryError::AlreadyRegistered(operator.to_string()));
        }

        let node = StakingNode {
            operator: operator.to_string(),
            moniker: moniker.to_string(),
            staked_amount: verified_stake,
            is_online: true,
            last_block_signed: height,
            voting_power: voting_power(verified_stake),
            supported_chains,
        };
        self.save(store, &node)?;

        info!(
            operator,
            moniker,
            voting_power = node.voting_power,
            "Created staking node"
        );
        Ok(node)
    }

    /// Apply one `(operator, did_sign, height)` tuple from the
    /// consensus-engine signer feed.
    ///
    /// Returns the transition if the online flag flipped, for event
    /// emission.
    pub fn update_online_status(
        &self,
        store: &dyn Storage,
        operator: &str,
        did_sign: bool,
        height: i64,
    ) -> RegistryResult<Option<StatusTransition>> {
        let mut node = self
            .get_node(store, operator)?
            .ok_or_else(|| RegistryError::UnknownNode(operator.to_string()))?;

        let was_online = node.is_online;
        node.is_online = did_sign;
        if did_sign {
            node.last_block_signed = height;
        }
        self.save(store, &node)?;

        let transition = match (was_online, did_sign) {
            (false, true) => Some(StatusTransition::CameOnline),
            (true, false) => Some(StatusTransition::WentOffline),
            _ => None,
        };
        if let Some(t) = transition {
            debug!(operator, height, ?t, "Staking node status changed");
        }
        Ok(transition)
    }

    /// Load a node by operator.
    pub fn get_node(
        &self,
        store: &dyn Storage,
        operator: &str,
    ) -> RegistryResult<Option<StakingNode>> {
        match store.get(&staking_node_key(operator))? {
            Some(bytes) => {
                let node = serde_json::from_slice(&bytes)
                    .map_err(|e| RegistryError::CorruptEntry(format!("{operator}: {e}")))?;
                Ok(Some(node))
            }
            None => Ok(None),
        }
    }

    /// All nodes with `is_online = true`, in store key order.
    pub fn online_nodes(&self, store: &dyn Storage) -> RegistryResult<Vec<StakingNode>> {
        let mut nodes = Vec::new();
        for (key, value) in store.scan_prefix(STAKING_NODE_PREFIX.as_bytes())? {
            let node: StakingNode = serde_json::from_slice(&value).map_err(|e| {
                RegistryError::CorruptEntry(format!("{}: {e}", String::from_utf8_lossy(&key)))
            })?;
            if node.is_online {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    fn save(&self, store: &dyn Storage, node: &StakingNode) -> RegistryResult<()> {
        let bytes = serde_json::to_vec(node)
            .map_err(|e| RegistryError::CorruptEntry(format!("{}: {e}", node.operator)))?;
        store.put(&node.store_key(), &bytes)?;
        Ok(())
    }
}

/// One unit of voting power per whole staked token.
pub fn voting_power(staked: Amount) -> u64 {
    u64::try_from(staked / BASE_UNITS_PER_TOKEN).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_storage::MemoryStore;
    use quarry_types::MIN_NODE_STAKE;

    fn registry() -> NodeRegistry {
        NodeRegistry::new(MIN_NODE_STAKE)
    }

    fn chains() -> Vec<String> {
        vec!["polygon-137".into()]
    }

    #[test]
    fn registration_at_exact_minimum_succeeds() {
        let store = MemoryStore::new();
        let node = registry()
            .register_node(&store, "qry1op", "alpha", chains(), MIN_NODE_STAKE, 5)
            .unwrap();
        assert_eq!(node.voting_power, 21);
        assert!(node.is_online);
        assert_eq!(node.last_block_signed, 5);
    }

    #[test]
    fn one_base_unit_short_is_rejected_without_writes() {
        let store = MemoryStore::new();
        let err = registry()
            .register_node(&store, "qry1op", "alpha", chains(), MIN_NODE_STAKE - 1, 5)
            .unwrap_err();
        assert!(matches!(err, RegistryError::InsufficientStake { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn re_registration_is_rejected() {
        let store = MemoryStore::new();
        let reg = registry();
        reg.register_node(&store, "qry1op", "alpha", chains(), MIN_NODE_STAKE, 5)
            .unwrap();
        let err = reg
            .register_node(&store, "qry1op", "beta", chains(), MIN_NODE_STAKE * 2, 6)
            .unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered(_)));

        // The original registration is untouched.
        let node = reg.get_node(&store, "qry1op").unwrap().unwrap();
        assert_eq!(node.moniker, "alpha");
    }

    #[test]
    fn empty_moniker_rejected() {
        let store = MemoryStore::new();
        let err = registry()
            .register_node(&store, "qry1op", "", chains(), MIN_NODE_STAKE, 5)
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
    }

    #[test]
    fn signer_feed_flips_status_and_tracks_height() {
        let store = MemoryStore::new();
        let reg = registry();
        reg.register_node(&store, "qry1op", "alpha", chains(), MIN_NODE_STAKE, 5)
            .unwrap();

        let t = reg.update_online_status(&store, "qry1op", false, 6).unwrap();
        assert_eq!(t, Some(StatusTransition::WentOffline));
        let node = reg.get_node(&store, "qry1op").unwrap().unwrap();
        assert!(!node.is_online);
        assert_eq!(node.last_block_signed, 5); // missed block leaves it

        let t = reg.update_online_status(&store, "qry1op", true, 7).unwrap();
        assert_eq!(t, Some(StatusTransition::CameOnline));
        let node = reg.get_node(&store, "qry1op").unwrap().unwrap();
        assert_eq!(node.last_block_signed, 7);

        let t = reg.update_online_status(&store, "qry1op", true, 8).unwrap();
        assert_eq!(t, None);
    }

    #[test]
    fn unknown_operator_in_feed_errors() {
        let store = MemoryStore::new();
        let err = registry()
            .update_online_status(&store, "qry1ghost", true, 1)
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownNode(_)));
    }

    #[test]
    fn online_nodes_filters_offline() {
        let store = MemoryStore::new();
        let reg = registry();
        reg.register_node(&store, "qry1a", "a", chains(), MIN_NODE_STAKE, 1)
            .unwrap();
        reg.register_node(&store, "qry1b", "b", chains(), MIN_NODE_STAKE, 1)
            .unwrap();
        reg.update_online_status(&store, "qry1a", false, 2).unwrap();

        let online = reg.online_nodes(&store).unwrap();
        assert_eq!(online.len(), 1);
        assert_eq!(online[0].operator, "qry1b");
    }

    #[test]
    fn voting_power_truncates_partial_tokens() {
        assert_eq!(voting_power(MIN_NODE_STAKE), 21);
        assert_eq!(voting_power(MIN_NODE_STAKE + BASE_UNITS_PER_TOKEN - 1), 21);
        assert_eq!(voting_power(0), 0);
    }
}
