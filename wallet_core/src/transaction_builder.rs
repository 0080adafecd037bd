//! Builds and signs the state blocks behind `send`/`receive`/`change`
//! (spec §4.8). This crate only ever emits `StateBlock`s — the legacy
//! per-kind block variants exist in `bln_ledger::block` for older chains,
//! but a wallet creating new blocks always uses the universal state form.

use bln_crypto::sign_message;
use bln_ledger::block::{Block, StateBlock};
use bln_types::{Account, BlockHash, PrivateKey};

use crate::error::WalletError;

/// The fields of an account's current frontier a wallet needs to build
/// its next block. Mirrors the subset of `bln_store::AccountInfo` the
/// wallet cares about, without pulling in a store dependency here.
#[derive(Clone, Debug)]
pub struct AccountSnapshot {
    pub head: BlockHash,
    pub representative: Account,
    pub balance: u128,
}

/// Interpret an account address as a state block's `link` field (the
/// inverse of `bln_ledger::block_link::link_as_account`).
pub fn account_to_link(account: &Account) -> Result<BlockHash, WalletError> {
    bln_crypto::address::decode_address(account.as_str())
        .map(BlockHash::new)
        .ok_or_else(|| WalletError::Key(format!("invalid account address: {account}")))
}

fn sign_block(mut block: StateBlock, account: &Account, private: &PrivateKey) -> StateBlock {
    let hash = Block::State(block.clone()).hash(account);
    block.signature = sign_message(hash.as_bytes(), private);
    block
}

/// Build and sign a send block: `balance -= amount`, `link = destination`.
pub fn build_send_block(
    snapshot: &AccountSnapshot,
    account: &Account,
    destination: &Account,
    amount: u128,
    private: &PrivateKey,
) -> Result<StateBlock, WalletError> {
    let new_balance =
        snapshot
            .balance
            .checked_sub(amount)
            .ok_or(WalletError::InsufficientBalance {
                needed: amount,
                available: snapshot.balance,
            })?;
    let link = account_to_link(destination)?;
    let block = StateBlock {
        account: account.clone(),
        previous: snapshot.head,
        representative: snapshot.representative.clone(),
        balance: new_balance,
        link,
        signature: bln_types::Signature([0u8; 64]),
        work: 0,
    };
    Ok(sign_block(block, account, private))
}

/// Build and sign a receive block. `snapshot` is `None` for an unopened
/// account (the receive doubles as the account's open block).
pub fn build_receive_block(
    snapshot: Option<&AccountSnapshot>,
    account: &Account,
    source_hash: BlockHash,
    amount: u128,
    default_representative: &Account,
    private: &PrivateKey,
) -> Result<StateBlock, WalletError> {
    let (previous, representative, balance) = match snapshot {
        Some(s) => (
            s.head,
            s.representative.clone(),
            s.balance
                .checked_add(amount)
                .ok_or_else(|| WalletError::Other("balance overflow on receive".into()))?,
        ),
        None => (BlockHash::ZERO, default_representative.clone(), amount),
    };
    let block = StateBlock {
        account: account.clone(),
        previous,
        representative,
        balance,
        link: source_hash,
        signature: bln_types::Signature([0u8; 64]),
        work: 0,
    };
    Ok(sign_block(block, account, private))
}

/// Build and sign a representative-change block. Balance and link are
/// unchanged; only `representative` differs from the current head.
pub fn build_change_block(
    snapshot: &AccountSnapshot,
    account: &Account,
    new_representative: &Account,
    private: &PrivateKey,
) -> Result<StateBlock, WalletError> {
    let block = StateBlock {
        account: account.clone(),
        previous: snapshot.head,
        representative: new_representative.clone(),
        balance: snapshot.balance,
        link: BlockHash::ZERO,
        signature: bln_types::Signature([0u8; 64]),
        work: 0,
    };
    Ok(sign_block(block, account, private))
}

/// The PoW root for a state block, per spec §6.1: the account itself for
/// an opening block, otherwise the previous block hash.
pub fn work_root(account: &Account, previous: &BlockHash) -> Result<BlockHash, WalletError> {
    if previous.is_zero() {
        account_to_link(account)
    } else {
        Ok(*previous)
    }
}
