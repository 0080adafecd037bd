//! Cryptographic primitives for the BLN protocol.
//!
//! - **Ed25519** for signing and signature verification
//! - **Blake2b** for hashing (block hashes, transaction hashes)
//! - Address derivation with `bln_` prefix
//! - BIP39 mnemonic handling for wallet seed backup/recovery

pub mod address;
pub mod hash;
pub mod keys;
pub mod mnemonic;
pub mod sign;

pub use address::derive_address;
pub use hash::{blake2b_256, hash_block, hash_transaction};
pub use keys::generate_keypair;
pub use sign::{sign_message, verify_signature};
