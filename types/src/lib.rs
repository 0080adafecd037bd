//! Fundamental types for the BLN protocol.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! addresses, hashes, amounts, timestamps, protocol parameters, and state enums.

pub mod address;
pub mod amount;
pub mod block;
pub mod epoch;
pub mod error;
pub mod hash;
pub mod keys;
pub mod network;
pub mod params;
pub mod time;

pub use address::Account;
pub use amount::Amount;
pub use block::BlockHash;
pub use epoch::Epoch;
pub use error::BlnError;
pub use hash::TxHash;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use network::NetworkId;
pub use params::{ConsensusConfig, FrontiersConfirmationMode, LedgerConfig, LoggingConfig, NodeConfig};
pub use time::Timestamp;

/// A qualified root uniquely identifies the conflict set an election
/// resolves: the previous block's hash for non-open blocks, or the
/// account's own address for an as-yet-unopened account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct QualifiedRoot {
    pub previous: BlockHash,
    pub root_account: Account,
}

impl QualifiedRoot {
    pub fn new(previous: BlockHash, root_account: Account) -> Self {
        Self { previous, root_account }
    }
}
