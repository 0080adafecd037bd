use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("ledger error: {0}")]
    Ledger(#[from] bln_ledger::LedgerError),

    #[error("consensus error: {0}")]
    Consensus(#[from] bln_consensus::ConsensusError),

    #[error("store error: {0}")]
    Store(#[from] bln_store::StoreError),

    #[error("node not initialized")]
    NotInitialized,

    #[error("{0}")]
    Other(String),
}
