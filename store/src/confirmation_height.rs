//! Confirmation height storage trait (spec §3 "Confirmation height info").

use crate::StoreError;
use bln_types::{Account, BlockHash};

/// Cemented height for an account's chain, and the hash of the block at
/// that height (the frontier of confirmation, distinct from the chain head).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfirmationHeightInfo {
    pub height: u64,
    pub frontier_hash: BlockHash,
}

/// Trait for tracking confirmation (cementation) height per account.
pub trait ConfirmationHeightStore {
    fn get_confirmation_height(
        &self,
        account: &Account,
    ) -> Result<ConfirmationHeightInfo, StoreError>;

    fn put_confirmation_height(
        &self,
        account: &Account,
        info: &ConfirmationHeightInfo,
    ) -> Result<(), StoreError>;

    fn delete_confirmation_height(&self, account: &Account) -> Result<(), StoreError>;

    fn exists(&self, account: &Account) -> Result<bool, StoreError>;

    /// Total number of accounts with a recorded confirmation height.
    fn count(&self) -> Result<u64, StoreError>;
}
