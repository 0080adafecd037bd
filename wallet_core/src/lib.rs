//! Wallet core library.
//!
//! Provides everything a wallet application needs:
//! - Key generation, deterministic derivation, and import/export
//! - A multi-slot key store (password-wrapped wallet key, deterministic
//!   seed, ad-hoc keys, watch-only accounts)
//! - A priority action queue serializing signed block construction
//! - Send/receive/change block building and signing against a live ledger

pub mod action_queue;
pub mod error;
pub mod keys;
pub mod keystore;
pub mod transaction_builder;
pub mod wallet;

pub use action_queue::{ActionQueue, Priority};
pub use error::WalletError;
pub use keystore::{load_keystore, save_keystore, KeystoreFile, WalletKey};
pub use wallet::Wallet;
