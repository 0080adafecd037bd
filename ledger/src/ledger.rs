//! The ledger processor (spec §4.4): validates and applies blocks, tracks
//! per-account balances, and answers the queries the rest of the node needs
//! without re-deriving chain state.
//!
//! Generic over any backend implementing the store traits, so the same
//! validation algorithm runs against the LMDB backend and an in-memory
//! fake used in tests.

use bln_store::{
    AccountInfo, AccountStore, BlockStore, ConfirmationHeightInfo, ConfirmationHeightStore,
    FrontierStore, PendingInfo, PendingStore, PrunedStore,
};
use bln_types::{Account, BlockHash, Epoch, PublicKey, Timestamp, TxHash};
use bln_work::thresholds::{WorkBlockKind, WorkThresholds};
use bln_work::validate_work;

use crate::block::{Block, BlockDetails, Sideband, StoredBlock};
use crate::block_link::link_as_account;
use crate::epoch_registry::EpochRegistry;
use crate::error::{LedgerError, ProcessResult};

fn as_tx_hash(h: &BlockHash) -> TxHash {
    TxHash::new(*h.as_bytes())
}

/// The effective balance operation a block performs, derived from the
/// difference between its declared balance and the account's prior balance
/// (or its explicit legacy fields).
enum Operation {
    Send { amount: u128, destination: Account },
    Receive { amount: u128, source: BlockHash, source_epoch: Epoch },
    Epoch { tier: Epoch },
    ChangeOnly,
}

pub struct LedgerSummary {
    pub block_count: u64,
    pub account_count: u64,
    pub pruned_count: u64,
}

pub struct Ledger<S> {
    store: S,
    epochs: EpochRegistry,
    work: WorkThresholds,
}

impl<S> Ledger<S>
where
    S: AccountStore
        + BlockStore
        + FrontierStore
        + PendingStore
        + ConfirmationHeightStore
        + PrunedStore,
{
    pub fn new(store: S) -> Self {
        Self::with_work_thresholds(store, WorkThresholds::new())
    }

    /// Build a ledger with custom proof-of-work thresholds (devnets and
    /// tests that don't want to pay real PoW cost).
    pub fn with_work_thresholds(store: S, work: WorkThresholds) -> Self {
        Self {
            store,
            epochs: EpochRegistry::new_default(),
            work,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn block_known(&self, hash: &BlockHash) -> Result<bool, LedgerError> {
        Ok(BlockStore::exists(&self.store, hash).map_err(LedgerError::Storage)?
            || self.store.is_pruned(hash).map_err(LedgerError::Storage)?)
    }

    /// Resolve a receive's amount and enforce that a matching pending entry
    /// exists. Returns `Err` carrying the `ProcessResult` to bail out with.
    fn resolve_receive(
        &self,
        account: &Account,
        source: BlockHash,
    ) -> Result<Result<(u128, Epoch), ProcessResult>, LedgerError> {
        match self.store.get_pending(account, &as_tx_hash(&source)) {
            Ok(pending) => Ok(Ok((pending.amount, pending.epoch))),
            Err(_) => {
                if self.block_known(&source)? {
                    Ok(Err(ProcessResult::Unreceivable))
                } else {
                    Ok(Err(ProcessResult::GapSource))
                }
            }
        }
    }

    /// Validate and apply `block`, which extends `account`'s chain.
    /// `account` must match the block's own embedded account for `Open`/
    /// `State` variants — callers building legacy `Send`/`Receive`/`Change`
    /// blocks (which carry no account field) supply it from chain context.
    pub fn process(&self, account: &Account, block: Block) -> Result<ProcessResult, LedgerError> {
        let hash = block.hash(account);

        if self.block_known(&hash)? {
            return Ok(ProcessResult::Old);
        }
        if let Some(embedded) = block.account(None) {
            if &embedded != account {
                return Ok(ProcessResult::BlockPosition);
            }
        }

        let exists = AccountStore::exists(&self.store, account).map_err(LedgerError::Storage)?;
        let is_valid_open =
            block.is_open() || (matches!(block, Block::State(_)) && block.previous().is_zero());

        let account_info = if exists {
            Some(self.store.get_account(account).map_err(LedgerError::Storage)?)
        } else {
            None
        };

        match &account_info {
            Some(info) => {
                if block.is_open() {
                    return Ok(ProcessResult::BlockPosition);
                }
                if block.previous() != info.head {
                    return Ok(if self.block_known(&block.previous())? {
                        ProcessResult::Fork
                    } else {
                        ProcessResult::GapPrevious
                    });
                }
            }
            None if !is_valid_open => return Ok(ProcessResult::BlockPosition),
            None => {}
        }

        let old_balance = account_info.as_ref().map(|i| i.balance).unwrap_or(0);
        let old_representative = account_info
            .as_ref()
            .map(|i| i.representative.clone())
            .unwrap_or_else(|| account.clone());
        let old_epoch = account_info.as_ref().map(|i| i.epoch).unwrap_or(Epoch::Epoch0);

        let (new_balance, new_representative, operation) = match &block {
            Block::Send(b) => {
                if b.balance > old_balance {
                    return Ok(ProcessResult::NegativeSpend);
                }
                (
                    b.balance,
                    old_representative.clone(),
                    Operation::Send {
                        amount: old_balance - b.balance,
                        destination: b.destination.clone(),
                    },
                )
            }
            Block::Receive(b) => match self.resolve_receive(account, b.source)? {
                Err(result) => return Ok(result),
                Ok((amount, source_epoch)) => (
                    old_balance + amount,
                    old_representative.clone(),
                    Operation::Receive { amount, source: b.source, source_epoch },
                ),
            },
            Block::Open(b) => match self.resolve_receive(account, b.source)? {
                Err(result) => return Ok(result),
                Ok((amount, source_epoch)) => (
                    amount,
                    b.representative.clone(),
                    Operation::Receive { amount, source: b.source, source_epoch },
                ),
            },
            Block::Change(b) => (old_balance, b.representative.clone(), Operation::ChangeOnly),
            Block::State(b) => {
                if b.balance > old_balance {
                    match self.resolve_receive(account, b.link)? {
                        Err(result) => return Ok(result),
                        Ok((amount, source_epoch)) => {
                            if amount != b.balance - old_balance {
                                return Ok(ProcessResult::BalanceMismatch);
                            }
                            (
                                b.balance,
                                b.representative.clone(),
                                Operation::Receive { amount, source: b.link, source_epoch },
                            )
                        }
                    }
                } else if b.balance < old_balance {
                    let destination = link_as_account(&b.link);
                    (
                        b.balance,
                        b.representative.clone(),
                        Operation::Send {
                            amount: old_balance - b.balance,
                            destination,
                        },
                    )
                } else if let Some(tier) = self.epochs.epoch_of(&b.link) {
                    if !self.epochs.is_sequential(old_epoch, tier) {
                        return Ok(ProcessResult::BlockPosition);
                    }
                    if exists {
                        if b.representative != old_representative {
                            return Ok(ProcessResult::RepresentativeMismatch);
                        }
                    } else if self
                        .store
                        .get_pending_for_account(account)
                        .map_err(LedgerError::Storage)?
                        .is_empty()
                    {
                        return Ok(ProcessResult::GapEpochOpenPending);
                    }
                    (b.balance, b.representative.clone(), Operation::Epoch { tier })
                } else {
                    (b.balance, b.representative.clone(), Operation::ChangeOnly)
                }
            }
        };

        let is_send = matches!(operation, Operation::Send { .. });
        let is_receive = matches!(operation, Operation::Receive { .. });
        let is_epoch = matches!(operation, Operation::Epoch { .. });

        let work_kind = if is_epoch {
            WorkBlockKind::Epoch
        } else if is_receive || block.is_open() {
            WorkBlockKind::ReceiveOrOpen
        } else {
            WorkBlockKind::Base
        };
        if !validate_work(&hash, block.work(), self.work.threshold_for(work_kind)) {
            return Ok(ProcessResult::InsufficientWork);
        }

        let pubkey = if let Operation::Epoch { tier } = operation {
            self.epochs.signer(tier).cloned()
        } else {
            bln_crypto::address::decode_address(account.as_str()).map(PublicKey)
        };
        let Some(pubkey) = pubkey else {
            return Ok(ProcessResult::BadSignature);
        };
        if !bln_crypto::verify_signature(hash.as_bytes(), block.signature(), &pubkey) {
            return Ok(ProcessResult::BadSignature);
        }

        let new_epoch = match &operation {
            Operation::Epoch { tier } => *tier,
            Operation::Receive { source_epoch, .. } => old_epoch.max(*source_epoch),
            _ => old_epoch,
        };
        let source_epoch = match &operation {
            Operation::Receive { source_epoch, .. } => *source_epoch,
            _ => old_epoch,
        };

        let height = account_info.as_ref().map(|i| i.block_count + 1).unwrap_or(1);
        let open_block = account_info.as_ref().map(|i| i.open_block).unwrap_or(hash);
        let old_head = account_info.as_ref().map(|i| i.head);

        let sideband = Sideband {
            account: account.clone(),
            successor: BlockHash::ZERO,
            balance: new_balance,
            height,
            timestamp: Timestamp::now(),
            details: BlockDetails { epoch: new_epoch, is_send, is_receive, is_epoch },
            source_epoch,
        };
        let stored = StoredBlock { block, sideband };
        self.store
            .put_block(&hash, &stored.to_bytes())
            .map_err(LedgerError::Storage)?;

        if let Some(old) = old_head {
            if let Ok(bytes) = self.store.get_block(&old) {
                if let Ok(mut prev) = StoredBlock::from_bytes(&bytes) {
                    prev.sideband.successor = hash;
                    self.store.put_block(&old, &prev.to_bytes()).map_err(LedgerError::Storage)?;
                }
            }
            self.store.delete_frontier(&old).map_err(LedgerError::Storage)?;
        }
        self.store.put_frontier(&hash, account).map_err(LedgerError::Storage)?;

        match &operation {
            Operation::Send { amount, destination } => {
                self.store
                    .put_pending(
                        destination,
                        &as_tx_hash(&hash),
                        &PendingInfo {
                            source_account: account.clone(),
                            amount: *amount,
                            epoch: new_epoch,
                        },
                    )
                    .map_err(LedgerError::Storage)?;
            }
            Operation::Receive { source, .. } => {
                self.store
                    .delete_pending(account, &as_tx_hash(source))
                    .map_err(LedgerError::Storage)?;
            }
            Operation::Epoch { .. } | Operation::ChangeOnly => {}
        }

        self.store
            .put_account(&AccountInfo {
                account: account.clone(),
                head: hash,
                representative: new_representative,
                open_block,
                balance: new_balance,
                modified_ts: Timestamp::now(),
                block_count: height,
                epoch: new_epoch,
            })
            .map_err(LedgerError::Storage)?;

        if account_info.is_none() {
            self.store
                .put_confirmation_height(
                    account,
                    &ConfirmationHeightInfo { height: 0, frontier_hash: BlockHash::ZERO },
                )
                .map_err(LedgerError::Storage)?;
        }

        Ok(ProcessResult::Progress)
    }

    /// Reverse the effects of the block at `hash`, provided it's the current
    /// head of its account and above the confirmed frontier.
    pub fn rollback(&self, hash: &BlockHash) -> Result<(), LedgerError> {
        let bytes = self
            .store
            .get_block(hash)
            .map_err(|_| LedgerError::BlockNotFound(hash.to_string()))?;
        let stored =
            StoredBlock::from_bytes(&bytes).map_err(|e| LedgerError::Decode(e.to_string()))?;
        let account = stored.sideband.account.clone();

        let info = self
            .store
            .get_account(&account)
            .map_err(|_| LedgerError::AccountNotFound(account.as_str().to_string()))?;
        if info.head != *hash {
            return Err(LedgerError::Rejected(ProcessResult::Fork));
        }
        let ch = self
            .store
            .get_confirmation_height(&account)
            .unwrap_or(ConfirmationHeightInfo { height: 0, frontier_hash: BlockHash::ZERO });
        if stored.sideband.height <= ch.height {
            return Err(LedgerError::BelowConfirmationHeight {
                account: account.as_str().to_string(),
            });
        }

        if stored.sideband.details.is_send {
            let destination = match &stored.block {
                Block::Send(b) => b.destination.clone(),
                Block::State(b) => link_as_account(&b.link),
                _ => unreachable!("is_send only set for send-shaped blocks"),
            };
            self.store
                .delete_pending(&destination, &as_tx_hash(hash))
                .map_err(LedgerError::Storage)?;
        }
        if stored.sideband.details.is_receive {
            let source = match &stored.block {
                Block::Receive(b) => b.source,
                Block::Open(b) => b.source,
                Block::State(b) => b.link,
                _ => unreachable!("is_receive only set for receive-shaped blocks"),
            };
            let source_account = self
                .store
                .get_block(&source)
                .ok()
                .and_then(|b| StoredBlock::from_bytes(&b).ok())
                .map(|s| s.sideband.account)
                .unwrap_or_else(|| account.clone());
            let amount = self.amount(hash)?;
            self.store
                .put_pending(
                    &account,
                    &as_tx_hash(&source),
                    &PendingInfo {
                        source_account,
                        amount,
                        epoch: stored.sideband.source_epoch,
                    },
                )
                .map_err(LedgerError::Storage)?;
        }

        self.store.delete_block(hash).map_err(LedgerError::Storage)?;
        self.store.delete_frontier(hash).map_err(LedgerError::Storage)?;

        if stored.sideband.height <= 1 {
            self.store.delete_account(&account).map_err(LedgerError::Storage)?;
            self.store.delete_confirmation_height(&account).map_err(LedgerError::Storage)?;
            return Ok(());
        }

        let previous = stored.block.previous();
        let prev_bytes = self.store.get_block(&previous).map_err(LedgerError::Storage)?;
        let mut prev =
            StoredBlock::from_bytes(&prev_bytes).map_err(|e| LedgerError::Decode(e.to_string()))?;
        prev.sideband.successor_clear();
        let prev_representative = match &prev.block {
            Block::Open(b) => b.representative.clone(),
            Block::Change(b) => b.representative.clone(),
            Block::State(b) => b.representative.clone(),
            _ => info.representative.clone(),
        };
        self.store.put_block(&previous, &prev.to_bytes()).map_err(LedgerError::Storage)?;
        self.store.put_frontier(&previous, &account).map_err(LedgerError::Storage)?;

        self.store
            .put_account(&AccountInfo {
                account: account.clone(),
                head: previous,
                representative: prev_representative,
                open_block: info.open_block,
                balance: prev.sideband.balance,
                modified_ts: prev.sideband.timestamp,
                block_count: info.block_count - 1,
                epoch: prev.sideband.details.epoch,
            })
            .map_err(LedgerError::Storage)?;

        Ok(())
    }

    /// Delete block bodies from `start_hash` backward, up to `batch` blocks,
    /// never touching a chain's current head or anything above its
    /// confirmation height.
    pub fn pruning_action(&self, start_hash: &BlockHash, batch: u64) -> Result<u64, LedgerError> {
        let bytes = self
            .store
            .get_block(start_hash)
            .map_err(|_| LedgerError::BlockNotFound(start_hash.to_string()))?;
        let stored =
            StoredBlock::from_bytes(&bytes).map_err(|e| LedgerError::Decode(e.to_string()))?;
        let ch = self
            .store
            .get_confirmation_height(&stored.sideband.account)
            .unwrap_or(ConfirmationHeightInfo { height: 0, frontier_hash: BlockHash::ZERO });

        let result = crate::pruning::prune_chain(
            &self.store,
            &self.store,
            *start_hash,
            BlockHash::ZERO,
            ch.height,
            batch,
        )?;
        Ok(result.pruned_count)
    }

    pub fn balance(&self, account: &Account) -> Result<u128, LedgerError> {
        Ok(self.store.get_account(account).map_err(LedgerError::Storage)?.balance)
    }

    pub fn latest(&self, account: &Account) -> Result<BlockHash, LedgerError> {
        Ok(self.store.get_account(account).map_err(LedgerError::Storage)?.head)
    }

    pub fn account_of(&self, hash: &BlockHash) -> Result<Account, LedgerError> {
        let bytes = self
            .store
            .get_block(hash)
            .map_err(|_| LedgerError::BlockNotFound(hash.to_string()))?;
        Ok(StoredBlock::from_bytes(&bytes)
            .map_err(|e| LedgerError::Decode(e.to_string()))?
            .sideband
            .account)
    }

    /// The value transferred by a send or receive block (zero for a pure
    /// representative change or epoch upgrade).
    pub fn amount(&self, hash: &BlockHash) -> Result<u128, LedgerError> {
        let bytes = self
            .store
            .get_block(hash)
            .map_err(|_| LedgerError::BlockNotFound(hash.to_string()))?;
        let stored =
            StoredBlock::from_bytes(&bytes).map_err(|e| LedgerError::Decode(e.to_string()))?;
        if !stored.sideband.details.is_send && !stored.sideband.details.is_receive {
            return Ok(0);
        }
        let previous = stored.block.previous();
        let previous_balance = if previous.is_zero() {
            0
        } else {
            let prev_bytes = self.store.get_block(&previous).map_err(LedgerError::Storage)?;
            StoredBlock::from_bytes(&prev_bytes)
                .map_err(|e| LedgerError::Decode(e.to_string()))?
                .sideband
                .balance
        };
        Ok(stored.sideband.balance.abs_diff(previous_balance))
    }

    pub fn block_confirmed(&self, hash: &BlockHash) -> Result<bool, LedgerError> {
        let bytes = self
            .store
            .get_block(hash)
            .map_err(|_| LedgerError::BlockNotFound(hash.to_string()))?;
        let stored =
            StoredBlock::from_bytes(&bytes).map_err(|e| LedgerError::Decode(e.to_string()))?;
        let ch = self
            .store
            .get_confirmation_height(&stored.sideband.account)
            .map_err(LedgerError::Storage)?;
        Ok(stored.sideband.height <= ch.height)
    }

    /// Whether every block this one causally depends on (its `previous`,
    /// and for a receive, the send it pockets) is already confirmed.
    pub fn dependents_confirmed(&self, hash: &BlockHash) -> Result<bool, LedgerError> {
        let bytes = self
            .store
            .get_block(hash)
            .map_err(|_| LedgerError::BlockNotFound(hash.to_string()))?;
        let stored =
            StoredBlock::from_bytes(&bytes).map_err(|e| LedgerError::Decode(e.to_string()))?;

        let previous = stored.block.previous();
        if !previous.is_zero() && !self.block_confirmed(&previous)? {
            return Ok(false);
        }
        if stored.sideband.details.is_receive {
            let source = match &stored.block {
                Block::Receive(b) => b.source,
                Block::Open(b) => b.source,
                Block::State(b) => b.link,
                _ => return Ok(true),
            };
            if !source.is_zero() && BlockStore::exists(&self.store, &source).map_err(LedgerError::Storage)? {
                return self.block_confirmed(&source);
            }
        }
        Ok(true)
    }

    pub fn find_receive_block_by_send_hash(
        &self,
        destination: &Account,
        send_hash: &BlockHash,
    ) -> Result<Option<BlockHash>, LedgerError> {
        for hash in self
            .store
            .get_account_blocks(destination)
            .map_err(LedgerError::Storage)?
        {
            let Ok(bytes) = self.store.get_block(&hash) else { continue };
            let Ok(stored) = StoredBlock::from_bytes(&bytes) else { continue };
            if !stored.sideband.details.is_receive {
                continue;
            }
            let source = match &stored.block {
                Block::Receive(b) => b.source,
                Block::Open(b) => b.source,
                Block::State(b) => b.link,
                _ => continue,
            };
            if source == *send_hash {
                return Ok(Some(hash));
            }
        }
        Ok(None)
    }

    pub fn summary(&self) -> Result<LedgerSummary, LedgerError> {
        Ok(LedgerSummary {
            block_count: self.store.block_count().map_err(LedgerError::Storage)?,
            account_count: self.store.account_count().map_err(LedgerError::Storage)?,
            pruned_count: self.store.pruned_count().map_err(LedgerError::Storage)?,
        })
    }
}

/// Copy every account and its blocks from one store to another, preserving
/// content exactly. Used when a node switches storage backends; doesn't
/// interpret or re-validate anything.
pub fn migrate<From, To>(from: &From, to: &To) -> Result<u64, LedgerError>
where
    From: AccountStore + BlockStore,
    To: AccountStore + BlockStore,
{
    let mut copied = 0u64;
    for info in from.iter_accounts().map_err(LedgerError::Storage)? {
        for hash in from.get_account_blocks(&info.account).map_err(LedgerError::Storage)? {
            let bytes = from.get_block(&hash).map_err(LedgerError::Storage)?;
            to.put_block(&hash, &bytes).map_err(LedgerError::Storage)?;
            copied += 1;
        }
        to.put_account(&info).map_err(LedgerError::Storage)?;
    }
    Ok(copied)
}
