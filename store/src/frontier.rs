//! Frontier storage trait (legacy hash→account table).
//!
//! Distinct from the in-memory account→head frontier cache used by the
//! ledger during processing (`bln_ledger::frontier::DagFrontier`): this is
//! the persisted, legacy-format table keyed by block hash, used to answer
//! bootstrap frontier requests without an account-chain walk.

use crate::StoreError;
use bln_types::{Account, BlockHash};

/// Trait for the legacy frontier table: head block hash -> owning account.
pub trait FrontierStore {
    /// Record that `head` is the current frontier (head block) of `account`.
    fn put_frontier(&self, head: &BlockHash, account: &Account) -> Result<(), StoreError>;

    /// Look up the account that owns a given frontier hash.
    fn get_frontier(&self, head: &BlockHash) -> Result<Account, StoreError>;

    /// Remove a frontier entry (called when the head moves; the caller
    /// deletes the old entry and inserts the new one).
    fn delete_frontier(&self, head: &BlockHash) -> Result<(), StoreError>;

    /// Iterate over all frontiers, returning (head, account) pairs in hash order.
    fn iter_frontiers(&self) -> Result<Vec<(BlockHash, Account)>, StoreError>;

    /// Total number of frontier entries.
    fn frontier_count(&self) -> Result<u64, StoreError>;
}
