//! The `link` field of a [`crate::block::StateBlock`] overloads the same
//! 32-byte slot as an account's public key (when the block sends) or a
//! block hash (when it receives) — exactly how the account field itself
//! doubles as a public key. This module holds the one conversion that
//! interpretation requires.

use bln_crypto::address::derive_address;
use bln_types::{Account, BlockHash, PublicKey};

/// Interpret a send block's `link` as the destination account.
pub fn link_as_account(link: &BlockHash) -> Account {
    derive_address(&PublicKey(*link.as_bytes()))
}
