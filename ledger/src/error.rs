use thiserror::Error;

/// Outcome of submitting a block to [`crate::ledger::Ledger::process`].
///
/// Mirrors the validation algorithm's decision points so callers (the wallet
/// action queue, block-processing worker, bootstrap import) can react without
/// re-deriving ledger state themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResult {
    /// Accepted and appended; the ledger advanced.
    Progress,
    /// Already present with identical contents — not an error, just a no-op.
    Old,
    /// `previous` isn't in the store yet.
    GapPrevious,
    /// `link` (as a source hash) isn't in the store yet.
    GapSource,
    /// An epoch-upgrade open block names a pending entry that doesn't exist.
    GapEpochOpenPending,
    /// Signature doesn't verify against the account's public key.
    BadSignature,
    /// Declared balance increased without a matching pending entry, or a
    /// send block would take balance below zero.
    NegativeSpend,
    /// The block claims to receive a pending entry that isn't there (already
    /// received, never sent, or destined for a different account).
    Unreceivable,
    /// `previous` doesn't match the account's current head.
    Fork,
    /// A send or receive targets the reserved burn account.
    OpenedBurnAccount,
    /// Declared balance doesn't match `previous.balance +/- amount`.
    BalanceMismatch,
    /// Representative changed but the chain has a pending representative
    /// constraint that forbids it (epoch blocks only).
    RepresentativeMismatch,
    /// Block type doesn't belong at this position (e.g. `Open` on a chain
    /// that already has a head, or non-`Open` as the first block).
    BlockPosition,
    /// Proof-of-work doesn't meet the threshold for this block's details.
    InsufficientWork,
}

impl ProcessResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessResult::Progress | ProcessResult::Old)
    }
}

impl std::fmt::Display for ProcessResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("block rejected: {0}")]
    Rejected(ProcessResult),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("block not found: {0}")]
    BlockNotFound(String),

    #[error("cannot roll back below confirmation height for account {account}")]
    BelowConfirmationHeight { account: String },

    #[error("storage error: {0}")]
    Storage(#[from] bln_store::StoreError),

    #[error("block decode error: {0}")]
    Decode(String),
}
