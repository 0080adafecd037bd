//! Final vote storage trait (spec §4.6 final-vote override).
//!
//! A final vote binds an election's qualified root to a single block hash
//! irrevocably: once recorded, the election cannot confirm a different
//! block for that root, even under a later fork with more tallied weight.

use crate::StoreError;
use bln_types::{BlockHash, QualifiedRoot};

/// Trait for the persisted final-vote table.
pub trait FinalVotesStore {
    fn put_final_vote(
        &self,
        root: &QualifiedRoot,
        block_hash: &BlockHash,
    ) -> Result<(), StoreError>;

    fn get_final_vote(&self, root: &QualifiedRoot) -> Result<Option<BlockHash>, StoreError>;

    fn delete_final_vote(&self, root: &QualifiedRoot) -> Result<(), StoreError>;

    fn final_vote_count(&self) -> Result<u64, StoreError>;
}
