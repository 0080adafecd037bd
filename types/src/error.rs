//! Top-level error type shared across crates that don't need a richer, more
//! specific error enum of their own (ledger, store, consensus and wallet_core
//! each define their own `thiserror` enum at their boundary instead).

use thiserror::Error;

/// Common error type for basic type-level operations (address parsing,
/// generic wire-format validation) shared across the workspace.
#[derive(Debug, Error)]
pub enum BlnError {
    #[error("invalid account address: {0}")]
    InvalidAddress(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid proof of work")]
    InvalidWork,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("{0}")]
    Other(String),
}
