//! Ledger pruning — delete deeply-cemented block bodies while retaining
//! their hashes, so the chain can still be walked without re-fetching the
//! full history from a peer (spec §4.4 "Pruning").
//!
//! Pruning never touches an account's head block: the walk stops one block
//! short of it, and is further bounded by the confirmation height so an
//! unconfirmed block is never pruned out from under an in-flight election.

use bln_store::{BlockStore, PrunedStore};
use bln_types::BlockHash;

use crate::block::StoredBlock;
use crate::error::LedgerError;

#[derive(Clone, Copy, Debug)]
pub struct PruningConfig {
    pub enabled: bool,
    /// Blocks pruned (bodies deleted) per commit batch.
    pub batch_size: u64,
}

impl Default for PruningConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            batch_size: 512,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PruneResult {
    pub pruned_count: u64,
}

/// Walk an account chain backward from `start_hash` toward genesis, deleting
/// block bodies and recording their hashes in `pruned`, stopping at whichever
/// comes first: `stop_at` (exclusive — never pruned), `confirmation_height`
/// (never prune past what's cemented), or `batch_size` blocks processed.
///
/// Returns the number of blocks pruned. The caller is responsible for
/// committing the underlying transaction (this function doesn't batch
/// commits itself — it's invoked per batch by the caller's loop).
pub fn prune_chain<B, P>(
    blocks: &B,
    pruned: &P,
    start_hash: BlockHash,
    stop_at: BlockHash,
    confirmation_height: u64,
    batch_size: u64,
) -> Result<PruneResult, LedgerError>
where
    B: BlockStore,
    P: PrunedStore,
{
    let mut cursor = start_hash;
    let mut count = 0u64;

    while cursor != stop_at && !cursor.is_zero() && count < batch_size {
        if pruned.is_pruned(&cursor).map_err(LedgerError::Storage)? {
            break;
        }
        let bytes = match blocks.get_block(&cursor) {
            Ok(bytes) => bytes,
            Err(_) => break,
        };
        let stored = StoredBlock::from_bytes(&bytes).map_err(|e| LedgerError::Decode(e.to_string()))?;
        // Heights are 1-based; only prune blocks strictly below the
        // cemented frontier so an uncemented block never loses its body.
        if stored.sideband.height >= confirmation_height {
            break;
        }

        let previous = stored.block.previous();
        blocks.delete_block(&cursor).map_err(LedgerError::Storage)?;
        pruned.put_pruned(&cursor).map_err(LedgerError::Storage)?;
        count += 1;
        cursor = previous;
    }

    Ok(PruneResult { pruned_count: count })
}
