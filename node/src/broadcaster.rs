//! Named-interface boundaries for collaborators this crate treats as
//! external (§10.4): peer transport and bootstrap hinting. No production
//! body — these traits exist so C4-C8 compile and are testable end-to-end
//! without a real network stack.

use bln_ledger::Block;
use bln_types::BlockHash;

/// Vote envelope broadcast to peers once a local election generates one.
/// Mirrors the wire layout of §6.2; this crate never serializes it itself.
#[derive(Clone, Debug)]
pub struct Vote {
    pub voter: bln_types::Account,
    pub timestamp: u64,
    pub hashes: Vec<BlockHash>,
    pub signature: bln_types::Signature,
}

/// Sends blocks and votes to connected peers. No transport.
pub trait Broadcaster: Send + Sync {
    fn broadcast(&self, block: &Block);
    fn flood_vote(&self, vote: &Vote);
}

/// Hints the (external) bootstrap subsystem that a hash is worth pulling,
/// per the inactive-votes cache's `bootstrap_started` transition (§4.5).
pub trait BootstrapHint: Send + Sync {
    fn hint_bootstrap(&self, hash: BlockHash);
}

/// A [`Broadcaster`]/[`BootstrapHint`] that records calls instead of sending
/// anything, for tests and for a daemon with no configured peers.
#[derive(Default)]
pub struct NullBroadcaster {
    pub broadcasts: std::sync::Mutex<Vec<BlockHash>>,
    pub hints: std::sync::Mutex<Vec<BlockHash>>,
}

impl Broadcaster for NullBroadcaster {
    fn broadcast(&self, block: &Block) {
        self.broadcasts.lock().unwrap().push(block.previous());
    }

    fn flood_vote(&self, _vote: &Vote) {}
}

impl BootstrapHint for NullBroadcaster {
    fn hint_bootstrap(&self, hash: BlockHash) {
        self.hints.lock().unwrap().push(hash);
    }
}
