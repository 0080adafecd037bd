//! Gap-dependency buffer for blocks that arrive before the block they
//! depend on (`GapPrevious`/`GapSource` from [`crate::error::ProcessResult`]).
//!
//! Bootstrap and the peer block-broadcast path don't guarantee delivery
//! order, so a block can arrive whose `previous` or `link`-as-source hasn't
//! been processed yet. Rather than reject it outright, the ledger's caller
//! stashes it here keyed by the missing hash, and replays it once that hash
//! is satisfied. Bounded FIFO eviction keeps an adversarial peer from
//! growing this map without limit.

use std::collections::{HashMap, VecDeque};

use bln_types::BlockHash;

use crate::block::Block;

/// Buffers blocks waiting on a dependency, keyed by the missing hash.
pub struct UncheckedMap {
    by_dependency: HashMap<BlockHash, Vec<Block>>,
    insertion_order: VecDeque<BlockHash>,
    capacity: usize,
    len: usize,
}

impl UncheckedMap {
    pub fn new(capacity: usize) -> Self {
        Self {
            by_dependency: HashMap::new(),
            insertion_order: VecDeque::new(),
            capacity,
            len: 0,
        }
    }

    /// Stash `block`, which is waiting on `missing_hash` to appear in the
    /// ledger. Evicts the oldest dependency bucket if at capacity.
    pub fn insert(&mut self, missing_hash: BlockHash, block: Block) {
        if !self.by_dependency.contains_key(&missing_hash) {
            self.insertion_order.push_back(missing_hash);
        }
        self.by_dependency
            .entry(missing_hash)
            .or_default()
            .push(block);
        self.len += 1;

        while self.len > self.capacity {
            if let Some(oldest) = self.insertion_order.pop_front() {
                if let Some(evicted) = self.by_dependency.remove(&oldest) {
                    self.len -= evicted.len();
                }
            } else {
                break;
            }
        }
    }

    /// Remove and return every block that was waiting on `hash`, now that
    /// it has appeared in the ledger. The caller re-submits these to
    /// `Ledger::process`.
    pub fn take_dependents(&mut self, hash: &BlockHash) -> Vec<Block> {
        if let Some(blocks) = self.by_dependency.remove(hash) {
            self.len -= blocks.len();
            self.insertion_order.retain(|h| h != hash);
            blocks
        } else {
            Vec::new()
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::ChangeBlock;
    use bln_types::{Account, Signature};

    fn dummy_block() -> Block {
        Block::Change(ChangeBlock {
            previous: BlockHash::ZERO,
            representative: Account::new("bln_alice"),
            signature: Signature([0u8; 64]),
            work: 0,
        })
    }

    #[test]
    fn insert_and_take_dependents() {
        let mut map = UncheckedMap::new(100);
        let missing = BlockHash::new([1u8; 32]);
        map.insert(missing, dummy_block());
        assert_eq!(map.len(), 1);

        let taken = map.take_dependents(&missing);
        assert_eq!(taken.len(), 1);
        assert!(map.is_empty());
    }

    #[test]
    fn multiple_dependents_on_same_hash() {
        let mut map = UncheckedMap::new(100);
        let missing = BlockHash::new([1u8; 32]);
        map.insert(missing, dummy_block());
        map.insert(missing, dummy_block());
        assert_eq!(map.len(), 2);

        let taken = map.take_dependents(&missing);
        assert_eq!(taken.len(), 2);
    }

    #[test]
    fn take_dependents_on_unknown_hash_returns_empty() {
        let mut map = UncheckedMap::new(100);
        let taken = map.take_dependents(&BlockHash::new([9u8; 32]));
        assert!(taken.is_empty());
    }

    #[test]
    fn eviction_drops_oldest_bucket_at_capacity() {
        let mut map = UncheckedMap::new(2);
        let h1 = BlockHash::new([1u8; 32]);
        let h2 = BlockHash::new([2u8; 32]);
        let h3 = BlockHash::new([3u8; 32]);
        map.insert(h1, dummy_block());
        map.insert(h2, dummy_block());
        map.insert(h3, dummy_block());

        assert!(map.len() <= 2);
        assert!(map.take_dependents(&h1).is_empty());
    }
}
