//! Observer callbacks (§6.5) — fired from the ledger-writer and the
//! confirmation-height processor. Must be non-blocking: these are plain
//! Rust callback traits, not a wire protocol, and the caller invokes them
//! synchronously on its own thread.

use bln_ledger::ProcessResult;
use bln_types::{Account, BlockHash};

/// A vote that contributed weight to a block's confirmation, for the
/// `blocks` observer callback.
#[derive(Clone, Debug)]
pub struct VoteWeight {
    pub voter: Account,
    pub weight: u128,
}

/// Observer hooks a daemon or test harness can attach to a [`crate::node::BlnNode`].
///
/// Default implementations are no-ops, so callers only override what they
/// need.
pub trait Observers: Send + Sync {
    /// Fired after a block is processed, successfully or not.
    fn blocks(
        &self,
        _status: &ProcessResult,
        _votes_with_weight: &[VoteWeight],
        _account: &Account,
        _amount: u128,
        _is_state_send: bool,
        _is_state_epoch: bool,
    ) {
    }

    /// Fired after an account's balance changes (post-confirmation).
    fn account_balance(&self, _account: &Account, _balance: u128, _pending: bool) {}

    /// Fired when an election for `hash` stops being active (confirmed or expired).
    fn active_stopped(&self, _hash: BlockHash) {}
}

/// An [`Observers`] implementation that does nothing; the default for a
/// node that isn't wired to any test harness or daemon hook.
#[derive(Default)]
pub struct NullObservers;

impl Observers for NullObservers {}
