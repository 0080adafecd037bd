//! Per-account chain bookkeeping used while validating a block append.

use crate::block::Block;
use bln_types::{Account, BlockHash};

/// A lightweight view of one account's chain, used by [`crate::ledger::Ledger`]
/// to check block position before committing a write.
pub struct AccountChain {
    pub account: Account,
    /// Hash of the most recent (head) block, or `BlockHash::ZERO` if the
    /// account has never been opened.
    pub head: BlockHash,
    pub block_count: u64,
}

impl AccountChain {
    pub fn new(account: Account, head: BlockHash, block_count: u64) -> Self {
        Self {
            account,
            head,
            block_count,
        }
    }

    pub fn unopened(account: Account) -> Self {
        Self {
            account,
            head: BlockHash::ZERO,
            block_count: 0,
        }
    }

    pub fn is_opened(&self) -> bool {
        self.block_count > 0
    }

    /// Check block position: an `Open` must be first, everything else must
    /// chain from the current head. Doesn't check signatures or balances —
    /// those live in [`crate::ledger::Ledger::process`].
    pub fn check_position(&self, block: &Block) -> bool {
        if self.is_opened() {
            !block.is_open() && block.previous() == self.head
        } else {
            block.is_open()
        }
    }

    pub fn append(&mut self, hash: BlockHash) {
        self.head = hash;
        self.block_count += 1;
    }
}
