//! Epoch registry (spec §4.1): maps each protocol-rule tier to its
//! designated signer key and the fixed `link` sentinel that marks an epoch
//! upgrade block.

use std::collections::HashMap;

use bln_crypto::blake2b_256;
use bln_types::{BlockHash, Epoch, PublicKey};

pub struct EpochRegistry {
    links: HashMap<BlockHash, Epoch>,
    signers: HashMap<Epoch, PublicKey>,
}

/// Deterministic sentinel link for an epoch tier. Real networks hardcode
/// these once chosen; derived here so devnets and tests agree without a
/// shared config file.
pub fn epoch_link(tier: Epoch) -> BlockHash {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"bln epoch link");
    buf.push(tier.as_u8());
    BlockHash::new(blake2b_256(&buf))
}

impl EpochRegistry {
    /// Build a registry where each epoch's signer key is derived from its
    /// tier number. Production networks would load real signer keys from
    /// node configuration instead.
    pub fn new_default() -> Self {
        let mut links = HashMap::new();
        let mut signers = HashMap::new();
        for tier in Epoch::ALL {
            links.insert(epoch_link(tier), tier);
            let mut seed = [0u8; 32];
            seed[0] = 0xE0;
            seed[1] = tier.as_u8();
            signers.insert(tier, PublicKey(seed));
        }
        Self { links, signers }
    }

    pub fn epoch_of(&self, link: &BlockHash) -> Option<Epoch> {
        self.links.get(link).copied()
    }

    pub fn signer(&self, tier: Epoch) -> Option<&PublicKey> {
        self.signers.get(&tier)
    }

    pub fn is_sequential(&self, from: Epoch, to: Epoch) -> bool {
        from.is_sequential_to(to)
    }
}

impl Default for EpochRegistry {
    fn default() -> Self {
        Self::new_default()
    }
}
