//! Node configuration: the recognized options of the external configuration
//! surface, plus the ambient logging/storage settings every node carries
//! regardless of which features are enabled.
//!
//! `NodeConfig` is a plain, `serde`-serializable data struct — parsing it
//! from a TOML file or the command line is the job of the (out-of-scope)
//! CLI/config-loading collaborator; this crate only defines the shape and
//! sane defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::network::NetworkId;

/// Frontier-confirmation background loop mode (spec §4.7).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrontiersConfirmationMode {
    Disabled,
    Automatic,
    Always,
}

/// Tunables for the ledger processor (C4).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Minimum proof-of-work difficulty for send-like blocks.
    pub min_work_difficulty_send: u64,
    /// Minimum proof-of-work difficulty for receive/open blocks (higher than send).
    pub min_work_difficulty_receive: u64,
    /// Minimum proof-of-work difficulty for epoch blocks (highest).
    pub min_work_difficulty_epoch: u64,
    /// Number of recently-processed blocks below which the bootstrap weight
    /// snapshot is used instead of live rep weights (C3).
    pub bootstrap_weight_max_blocks: u64,
    /// Number of blocks pruned per commit batch.
    pub pruning_batch_size: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            min_work_difficulty_send: 0xffff_ffc0_0000_0000,
            min_work_difficulty_receive: 0xfffe_0000_0000_0000,
            min_work_difficulty_epoch: 0xfffe_0000_0000_0000,
            bootstrap_weight_max_blocks: 100,
            pruning_batch_size: 512,
        }
    }
}

/// Tunables for the active-elections engine (C5-C7), spec §6.4.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Soft cap on concurrent elections.
    pub active_elections_size: usize,
    /// Controls the frontier-confirmation loop.
    pub frontiers_confirmation: FrontiersConfirmationMode,
    /// Minimum rep weight (raw units) for a vote to be tallied at all.
    pub vote_minimum: u128,
    /// Minimum amount (raw units) for the wallet to auto-receive a pending entry.
    pub receive_minimum: u128,
    /// Whether this node generates and broadcasts its own votes.
    pub enable_voting: bool,
    /// Cap on `recently_cemented`.
    pub confirmation_history_size: usize,
    /// Fraction (0.0-1.0) of trended online weight needed to hint-start an election.
    pub election_hint_weight_percent: f64,
    /// Floor for the quorum delta, raw units.
    pub online_weight_minimum: u128,
    /// Per-voter vote acceptance cooldown, in seconds (decided: 20s, see DESIGN.md).
    pub vote_cooldown_secs: u64,
    /// Interval between active-elections scheduling loop ticks, in milliseconds.
    pub request_interval_ms: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            active_elections_size: 5000,
            frontiers_confirmation: FrontiersConfirmationMode::Automatic,
            vote_minimum: 1_000_000,
            receive_minimum: 1_000_000,
            enable_voting: true,
            confirmation_history_size: 2048,
            election_hint_weight_percent: 0.10,
            online_weight_minimum: 60_000_000_000_000_000_000_000_000_000_000,
            vote_cooldown_secs: 20,
            request_interval_ms: 3000,
        }
    }
}

/// Ambient logging configuration, consumed by the (named-interface) daemon
/// entrypoint to configure a `tracing_subscriber` layer. Library crates never
/// read this directly; they only emit `tracing` events.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub log_to_file: bool,
    pub log_dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: false,
            log_dir: PathBuf::from("log"),
        }
    }
}

/// Top-level node configuration (spec §6.4 plus §10.3's ambient additions).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    pub network: NetworkId,
    pub data_path: PathBuf,
    pub lmdb_map_size: usize,
    pub peering_port: u16,
    pub password_fanout: u32,
    pub work_threads: usize,
    pub logging: LoggingConfig,
    pub ledger: LedgerConfig,
    pub consensus: ConsensusConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            network: NetworkId::Dev,
            data_path: PathBuf::from("data"),
            lmdb_map_size: 1 << 34,
            peering_port: NetworkId::Dev.default_port(),
            password_fanout: 1024,
            work_threads: 1,
            logging: LoggingConfig::default(),
            ledger: LedgerConfig::default(),
            consensus: ConsensusConfig::default(),
        }
    }
}
