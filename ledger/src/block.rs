//! Block variants for BLN's block-lattice.
//!
//! Five variants share the ledger: the legacy `Send`/`Receive`/`Open`/`Change`
//! blocks (retained for chains that predate the state-block format) and the
//! universal `State` block, which every new chain uses exclusively. Every
//! variant is signed over its own hashable preimage and carries a work nonce.

use bln_crypto::blake2b_256;
use bln_types::{Account, BlockHash, Epoch, Signature};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendBlock {
    pub previous: BlockHash,
    pub destination: Account,
    pub balance: u128,
    pub signature: Signature,
    pub work: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveBlock {
    pub previous: BlockHash,
    pub source: BlockHash,
    pub signature: Signature,
    pub work: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenBlock {
    pub source: BlockHash,
    pub representative: Account,
    pub account: Account,
    pub signature: Signature,
    pub work: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBlock {
    pub previous: BlockHash,
    pub representative: Account,
    pub signature: Signature,
    pub work: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateBlock {
    pub account: Account,
    pub previous: BlockHash,
    pub representative: Account,
    pub balance: u128,
    /// Destination account (send), source block hash (receive), or an
    /// epoch sentinel (balance-unchanged epoch upgrade).
    pub link: BlockHash,
    pub signature: Signature,
    pub work: u64,
}

/// A block in BLN's block-lattice (spec §3 "Block").
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    Send(SendBlock),
    Receive(ReceiveBlock),
    Open(OpenBlock),
    Change(ChangeBlock),
    State(StateBlock),
}

impl Block {
    pub fn previous(&self) -> BlockHash {
        match self {
            Block::Send(b) => b.previous,
            Block::Receive(b) => b.previous,
            Block::Open(_) => BlockHash::ZERO,
            Block::Change(b) => b.previous,
            Block::State(b) => b.previous,
        }
    }

    pub fn signature(&self) -> &Signature {
        match self {
            Block::Send(b) => &b.signature,
            Block::Receive(b) => &b.signature,
            Block::Open(b) => &b.signature,
            Block::Change(b) => &b.signature,
            Block::State(b) => &b.signature,
        }
    }

    pub fn work(&self) -> u64 {
        match self {
            Block::Send(b) => b.work,
            Block::Receive(b) => b.work,
            Block::Open(b) => b.work,
            Block::Change(b) => b.work,
            Block::State(b) => b.work,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Block::Open(_))
    }

    pub fn is_legacy(&self) -> bool {
        !matches!(self, Block::State(_))
    }

    /// The account this block belongs to. Legacy send/receive/change blocks
    /// don't carry their own account — it must be supplied from chain
    /// context (the account whose frontier this block extends).
    pub fn account(&self, chain_account: Option<&Account>) -> Option<Account> {
        match self {
            Block::Open(b) => Some(b.account.clone()),
            Block::State(b) => Some(b.account.clone()),
            _ => chain_account.cloned(),
        }
    }

    /// Compute this block's hash from its hashable preimage (excludes
    /// signature and work, per spec §3).
    pub fn hash(&self, chain_account: &Account) -> BlockHash {
        let mut buffer = Vec::with_capacity(160);
        match self {
            Block::Send(b) => {
                buffer.push(0u8);
                buffer.extend_from_slice(b.previous.as_bytes());
                buffer.extend_from_slice(b.destination.as_str().as_bytes());
                buffer.extend_from_slice(&b.balance.to_be_bytes());
            }
            Block::Receive(b) => {
                buffer.push(1u8);
                buffer.extend_from_slice(b.previous.as_bytes());
                buffer.extend_from_slice(b.source.as_bytes());
            }
            Block::Open(b) => {
                buffer.push(2u8);
                buffer.extend_from_slice(b.source.as_bytes());
                buffer.extend_from_slice(b.representative.as_str().as_bytes());
                buffer.extend_from_slice(b.account.as_str().as_bytes());
            }
            Block::Change(b) => {
                buffer.push(3u8);
                buffer.extend_from_slice(b.previous.as_bytes());
                buffer.extend_from_slice(b.representative.as_str().as_bytes());
            }
            Block::State(b) => {
                buffer.push(4u8);
                buffer.extend_from_slice(b.account.as_str().as_bytes());
                buffer.extend_from_slice(b.previous.as_bytes());
                buffer.extend_from_slice(b.representative.as_str().as_bytes());
                buffer.extend_from_slice(&b.balance.to_be_bytes());
                buffer.extend_from_slice(b.link.as_bytes());
            }
        }
        // Legacy blocks don't embed their own account, but two different
        // accounts' chains must not collide on hash by coincidence of
        // identical field values, so the chain account is always folded in.
        if self.is_legacy() {
            buffer.extend_from_slice(chain_account.as_str().as_bytes());
        }
        BlockHash::new(blake2b_256(&buffer))
    }
}

/// Per-variant classification used to select the proof-of-work threshold
/// and to populate the sideband (spec §3 "sideband.details").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDetails {
    pub epoch: Epoch,
    pub is_send: bool,
    pub is_receive: bool,
    pub is_epoch: bool,
}

/// Metadata attached to every stored block, computed at insertion and never
/// trusted from the wire (spec §3 "sideband").
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sideband {
    pub account: Account,
    pub successor: BlockHash,
    pub balance: u128,
    pub height: u64,
    pub timestamp: bln_types::Timestamp,
    pub details: BlockDetails,
    pub source_epoch: Epoch,
}

impl Sideband {
    pub fn successor_clear(&mut self) {
        self.successor = BlockHash::ZERO;
    }
}

/// A block together with the sideband computed for it at insertion time.
/// This is the unit actually persisted by `BlockStore`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredBlock {
    pub block: Block,
    pub sideband: Sideband,
}

impl StoredBlock {
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("block serialization should not fail")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}
