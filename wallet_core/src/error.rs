use thiserror::Error;

/// Errors surfaced by wallet operations (key store, action queue, signed
/// block construction).
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("wallet is locked")]
    WalletLocked,

    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("source block missing or not yet confirmed")]
    SourceMissing,

    #[error("work generation failed: {0}")]
    WorkGenerationFailed(String),

    #[error("key error: {0}")]
    Key(String),

    #[error("{0}")]
    Other(String),
}

impl From<bln_store::StoreError> for WalletError {
    fn from(err: bln_store::StoreError) -> Self {
        WalletError::Other(err.to_string())
    }
}

impl From<bln_ledger::LedgerError> for WalletError {
    fn from(err: bln_ledger::LedgerError) -> Self {
        WalletError::Other(err.to_string())
    }
}
