//! Account storage trait.

use crate::StoreError;
use bln_types::{Account, BlockHash, Epoch, Timestamp};

/// Per-account information stored in the ledger (spec §3 "Account info").
///
/// Exists iff `block_count > 0`.
#[derive(Clone, Debug)]
pub struct AccountInfo {
    pub account: Account,
    /// Hash of the latest (head) block in this account's chain.
    pub head: BlockHash,
    /// The account's delegated voting representative.
    pub representative: Account,
    /// Hash of this account's first (open) block.
    pub open_block: BlockHash,
    /// Current balance after the head block.
    pub balance: u128,
    /// Timestamp of the head block.
    pub modified_ts: Timestamp,
    /// Number of blocks in this account's chain.
    pub block_count: u64,
    /// Highest epoch tier reached by any block on this chain.
    pub epoch: Epoch,
}

/// Trait for account storage operations.
pub trait AccountStore {
    fn get_account(&self, account: &Account) -> Result<AccountInfo, StoreError>;
    fn put_account(&self, info: &AccountInfo) -> Result<(), StoreError>;
    fn delete_account(&self, account: &Account) -> Result<(), StoreError>;
    fn exists(&self, account: &Account) -> Result<bool, StoreError>;
    fn account_count(&self) -> Result<u64, StoreError>;
    fn iter_accounts(&self) -> Result<Vec<AccountInfo>, StoreError>;

    /// Paged iteration ordered by account, starting strictly after `cursor`.
    fn iter_accounts_paged(
        &self,
        cursor: Option<&Account>,
        limit: usize,
    ) -> Result<Vec<AccountInfo>, StoreError>;
}
