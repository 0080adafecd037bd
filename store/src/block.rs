//! Block storage trait.
//!
//! Blocks are stored with their sideband appended (spec §4.2): readers
//! reconstruct the sideband on retrieval rather than trusting anything from
//! the wire. The store itself is agnostic to the block/sideband encoding —
//! it moves opaque bytes, serialized and deserialized by `bln_ledger`.

use crate::StoreError;
use bln_types::{Account, BlockHash};

/// Trait for block storage operations (the block-lattice).
pub trait BlockStore {
    /// Store a block (block + sideband, serialized, keyed by hash).
    fn put_block(&self, hash: &BlockHash, block_bytes: &[u8]) -> Result<(), StoreError>;

    /// Retrieve a block by hash.
    fn get_block(&self, hash: &BlockHash) -> Result<Vec<u8>, StoreError>;

    /// Check if a block's body is present (false for pruned blocks even
    /// though their hash remains known via `PrunedStore`).
    fn exists(&self, hash: &BlockHash) -> Result<bool, StoreError>;

    /// Delete a block's body (used by pruning; the hash is recorded
    /// separately in the `pruned` table by the caller).
    fn delete_block(&self, hash: &BlockHash) -> Result<(), StoreError>;

    /// Get all block hashes for an account (the account chain), in chain order.
    fn get_account_blocks(&self, account: &Account) -> Result<Vec<BlockHash>, StoreError>;

    /// Height of a block within its account's chain, if known (used to test
    /// confirmation without re-walking the chain).
    fn height_of_block(&self, hash: &BlockHash) -> Result<Option<u64>, StoreError>;

    /// Total number of blocks in the store.
    fn block_count(&self) -> Result<u64, StoreError>;
}
