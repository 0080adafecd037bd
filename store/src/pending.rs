//! Pending receive storage trait.

use crate::StoreError;
use bln_types::{Account, Epoch, TxHash};
use serde::{Deserialize, Serialize};

/// Information about a pending incoming transfer (spec §3 "Pending entry").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingInfo {
    pub source_account: Account,
    pub amount: u128,
    /// Epoch of the send block that created this entry, inherited by the
    /// eventual receive (invariant 4: pruned-source entries may carry a
    /// zero `source_account` instead of failing lookup).
    pub epoch: Epoch,
}

/// Trait for tracking pending receives.
///
/// Keys are `(destination, send_hash)` pairs. Each pending entry represents
/// an incoming transfer that has not yet been pocketed by the destination account.
pub trait PendingStore {
    /// Record a pending receive for the destination account.
    fn put_pending(
        &self,
        destination: &Account,
        send_hash: &TxHash,
        info: &PendingInfo,
    ) -> Result<(), StoreError>;

    /// Retrieve a specific pending receive.
    fn get_pending(
        &self,
        destination: &Account,
        send_hash: &TxHash,
    ) -> Result<PendingInfo, StoreError>;

    /// Delete a pending receive (once it has been pocketed by a receive block).
    fn delete_pending(&self, destination: &Account, send_hash: &TxHash) -> Result<(), StoreError>;

    /// Get all pending receives for a given destination account.
    fn get_pending_for_account(
        &self,
        destination: &Account,
    ) -> Result<Vec<(TxHash, PendingInfo)>, StoreError>;

    /// Total number of pending receives across all accounts.
    fn pending_count(&self) -> Result<u64, StoreError>;
}
