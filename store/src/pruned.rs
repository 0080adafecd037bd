//! Pruned block hash set (spec §4.4 pruning).
//!
//! Pruning deletes a block's body from `BlockStore` but must retain the
//! hash so the chain can still be walked and gaps distinguished from
//! missing (unsynced) blocks.

use crate::StoreError;
use bln_types::BlockHash;

/// Trait for the set of pruned block hashes.
pub trait PrunedStore {
    fn put_pruned(&self, hash: &BlockHash) -> Result<(), StoreError>;

    fn delete_pruned(&self, hash: &BlockHash) -> Result<(), StoreError>;

    fn is_pruned(&self, hash: &BlockHash) -> Result<bool, StoreError>;

    fn iter_pruned(&self) -> Result<Vec<BlockHash>, StoreError>;

    fn pruned_count(&self) -> Result<u64, StoreError>;
}
