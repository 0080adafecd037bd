//! Genesis block creation — the first block on each network.
//!
//! The genesis block is an `Open` block with `previous: BlockHash::ZERO`,
//! `source: BlockHash::ZERO` (it receives nothing — its balance is minted by
//! fiat at network creation), and a network-specific creator account so each
//! network has a distinct, deterministic genesis hash.

use crate::block::{Block, OpenBlock};
use bln_crypto::address::derive_address;
use bln_types::{Account, BlockHash, NetworkId, PublicKey, Signature};

/// Total raw-unit supply minted into the genesis account at network creation.
pub const GENESIS_SUPPLY: u128 = 1_000_000_000_000_000_000_000_000_000_000_000;

pub struct GenesisConfig {
    pub network: NetworkId,
    pub creator: Account,
}

/// Create the genesis block for a given configuration. Work and signature
/// are left zeroed — a real network's genesis is signed and worked offline
/// once, then its block bytes are hardcoded for bootstrapping; this function
/// exists to let tests and devnets derive that byte sequence on demand.
pub fn create_genesis_block(config: &GenesisConfig) -> Block {
    Block::Open(OpenBlock {
        source: BlockHash::ZERO,
        representative: config.creator.clone(),
        account: config.creator.clone(),
        signature: Signature([0u8; 64]),
        work: 0,
    })
}

/// The deterministic genesis block hash for a network, using that network's
/// canonical creator account.
pub fn genesis_hash(network: NetworkId) -> BlockHash {
    let creator = genesis_creator(network);
    let config = GenesisConfig { network, creator: creator.clone() };
    let block = create_genesis_block(&config);
    block.hash(&creator)
}

/// Canonical genesis creator address per network, derived from an all-zero
/// seed so any node can recompute it without a hardcoded address table.
/// Live's real creator key is generated and discarded at network launch —
/// this fallback only matters for `Test`/`Dev`, where reproducibility across
/// nodes is the point.
pub fn genesis_creator(network: NetworkId) -> Account {
    let mut seed = [0u8; 32];
    seed[0] = match network {
        NetworkId::Live => 0,
        NetworkId::Test => 1,
        NetworkId::Dev => 2,
    };
    derive_address(&PublicKey(seed))
}

/// The reserved burn account: sends to this account destroy the balance
/// permanently. Derived from the all-zero public key so it's recognizable
/// and requires no hardcoded table.
pub fn burn_account() -> Account {
    derive_address(&PublicKey([0u8; 32]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_hash_is_deterministic() {
        assert_eq!(genesis_hash(NetworkId::Dev), genesis_hash(NetworkId::Dev));
    }

    #[test]
    fn genesis_hashes_differ_per_network() {
        let live = genesis_hash(NetworkId::Live);
        let test = genesis_hash(NetworkId::Test);
        let dev = genesis_hash(NetworkId::Dev);
        assert_ne!(live, test);
        assert_ne!(live, dev);
        assert_ne!(test, dev);
    }

    #[test]
    fn genesis_block_is_open() {
        let creator = genesis_creator(NetworkId::Dev);
        let config = GenesisConfig { network: NetworkId::Dev, creator };
        let block = create_genesis_block(&config);
        assert!(block.is_open());
        assert!(block.previous().is_zero());
    }

    #[test]
    fn genesis_hash_not_zero() {
        assert!(!genesis_hash(NetworkId::Live).is_zero());
    }

    #[test]
    fn create_genesis_with_custom_creator() {
        let creator = Account::new(
            "bln_1custom111111111111111111111111111111111111111111111111111111111111",
        );
        let config = GenesisConfig { network: NetworkId::Dev, creator: creator.clone() };
        let block = create_genesis_block(&config);
        match block {
            Block::Open(b) => {
                assert_eq!(b.account, creator);
                assert_eq!(b.representative, creator);
            }
            _ => panic!("expected open block"),
        }
    }

    #[test]
    fn burn_account_is_stable() {
        assert_eq!(burn_account(), burn_account());
        assert_ne!(burn_account(), genesis_creator(NetworkId::Dev));
    }
}
