//! Node configuration.

use crate::Args;
use anyhow::{bail, Context, Result};
use quarry_types::Params;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node name.
    pub node_name: String,
    /// Data directory.
    pub data_dir: PathBuf,
    /// Milliseconds between produced blocks.
    #[serde(default = "default_block_interval_ms")]
    pub block_interval_ms: u64,
    /// Path to a genesis state file (JSON). Applied once on first start.
    pub genesis_file: Option<PathBuf>,
    /// Engine parameters.
    #[serde(default)]
    pub params: Params,
    /// Mining configuration.
    #[serde(default)]
    pub mining: MiningConfig,
}

fn default_block_interval_ms() -> u64 {
    500
}

/// Mining configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningConfig {
    /// Enable local mining attempts.
    pub enabled: bool,
    /// Reward address.
    pub reward_address: Option<String>,
    /// Acceptance threshold for the local hash verifier. Higher accepts
    /// more proofs; `u64::MAX` accepts every attempt.
    #[serde(default = "default_proof_threshold")]
    pub proof_threshold: u64,
}

fn default_proof_threshold() -> u64 {
    u64::MAX / 16
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            reward_address: None,
            proof_threshold: default_proof_threshold(),
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_name: "quarry-node".to_string(),
            data_dir: PathBuf::from(".quarry"),
            block_interval_ms: default_block_interval_ms(),
            genesis_file: None,
            params: Params::default(),
            mining: MiningConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Load configuration from file and CLI args.
    pub fn load(config_path: &Path, args: &Args) -> Result<Self> {
        let mut config: Self = if config_path.exists() {
            let content =
                std::fs::read_to_string(config_path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            Self::default()
        };

        // Override with CLI args
        if let Some(ref data_dir) = args.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(ref genesis) = args.genesis {
            config.genesis_file = Some(genesis.clone());
        }
        if let Some(interval) = args.block_interval_ms {
            config.block_interval_ms = interval;
        }
        if args.mining {
            config.mining.enabled = true;
        }
        if let Some(ref addr) = args.mining_address {
            config.mining.reward_address = Some(addr.clone());
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine would choke on later.
    pub fn validate(&self) -> Result<()> {
        if self.block_interval_ms == 0 {
            bail!("block_interval_ms cannot be zero");
        }
        if self.mining.enabled && self.mining.reward_address.is_none() {
            bail!("mining requires a reward address");
        }
        self.params
            .validate()
            .context("Invalid engine parameters")?;
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
