//! Nullable store — in-memory storage for testing.

use std::collections::HashMap;
use std::sync::Mutex;

use bln_store::account::{AccountInfo, AccountStore};
use bln_store::block::BlockStore;
use bln_store::confirmation_height::{ConfirmationHeightInfo, ConfirmationHeightStore};
use bln_store::frontier::FrontierStore;
use bln_store::pending::{PendingInfo, PendingStore};
use bln_store::pruned::PrunedStore;
use bln_store::StoreError;
use bln_types::{Account, BlockHash, TxHash};

/// An in-memory store implementing every store trait, for tests that want
/// a real `Ledger<S>` without a filesystem.
#[derive(Default)]
pub struct NullStore {
    accounts: Mutex<HashMap<Account, AccountInfo>>,
    blocks: Mutex<HashMap<BlockHash, Vec<u8>>>,
    frontiers: Mutex<HashMap<BlockHash, Account>>,
    pending: Mutex<HashMap<(Account, TxHash), PendingInfo>>,
    heights: Mutex<HashMap<Account, ConfirmationHeightInfo>>,
    pruned: Mutex<Vec<BlockHash>>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for NullStore {
    fn get_account(&self, account: &Account) -> Result<AccountInfo, StoreError> {
        self.accounts
            .lock()
            .unwrap()
            .get(account)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(account.to_string()))
    }

    fn put_account(&self, info: &AccountInfo) -> Result<(), StoreError> {
        self.accounts
            .lock()
            .unwrap()
            .insert(info.account.clone(), info.clone());
        Ok(())
    }

    fn delete_account(&self, account: &Account) -> Result<(), StoreError> {
        self.accounts.lock().unwrap().remove(account);
        Ok(())
    }

    fn exists(&self, account: &Account) -> Result<bool, StoreError> {
        Ok(self.accounts.lock().unwrap().contains_key(account))
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        Ok(self.accounts.lock().unwrap().len() as u64)
    }

    fn iter_accounts(&self) -> Result<Vec<AccountInfo>, StoreError> {
        Ok(self.accounts.lock().unwrap().values().cloned().collect())
    }

    fn iter_accounts_paged(
        &self,
        _cursor: Option<&Account>,
        limit: usize,
    ) -> Result<Vec<AccountInfo>, StoreError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .take(limit)
            .cloned()
            .collect())
    }
}

impl BlockStore for NullStore {
    fn put_block(&self, hash: &BlockHash, block_bytes: &[u8]) -> Result<(), StoreError> {
        self.blocks
            .lock()
            .unwrap()
            .insert(*hash, block_bytes.to_vec());
        Ok(())
    }

    fn get_block(&self, hash: &BlockHash) -> Result<Vec<u8>, StoreError> {
        self.blocks
            .lock()
            .unwrap()
            .get(hash)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{hash:?}")))
    }

    fn exists(&self, hash: &BlockHash) -> Result<bool, StoreError> {
        Ok(self.blocks.lock().unwrap().contains_key(hash))
    }

    fn delete_block(&self, hash: &BlockHash) -> Result<(), StoreError> {
        self.blocks.lock().unwrap().remove(hash);
        Ok(())
    }

    fn get_account_blocks(&self, _account: &Account) -> Result<Vec<BlockHash>, StoreError> {
        Ok(Vec::new())
    }

    fn height_of_block(&self, _hash: &BlockHash) -> Result<Option<u64>, StoreError> {
        Ok(None)
    }

    fn block_count(&self) -> Result<u64, StoreError> {
        Ok(self.blocks.lock().unwrap().len() as u64)
    }
}

impl FrontierStore for NullStore {
    fn put_frontier(&self, head: &BlockHash, account: &Account) -> Result<(), StoreError> {
        self.frontiers
            .lock()
            .unwrap()
            .insert(*head, account.clone());
        Ok(())
    }

    fn get_frontier(&self, head: &BlockHash) -> Result<Account, StoreError> {
        self.frontiers
            .lock()
            .unwrap()
            .get(head)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("frontier".into()))
    }

    fn delete_frontier(&self, head: &BlockHash) -> Result<(), StoreError> {
        self.frontiers.lock().unwrap().remove(head);
        Ok(())
    }

    fn iter_frontiers(&self) -> Result<Vec<(BlockHash, Account)>, StoreError> {
        Ok(self
            .frontiers
            .lock()
            .unwrap()
            .iter()
            .map(|(h, a)| (*h, a.clone()))
            .collect())
    }

    fn frontier_count(&self) -> Result<u64, StoreError> {
        Ok(self.frontiers.lock().unwrap().len() as u64)
    }
}

impl PendingStore for NullStore {
    fn put_pending(
        &self,
        destination: &Account,
        send_hash: &TxHash,
        info: &PendingInfo,
    ) -> Result<(), StoreError> {
        self.pending
            .lock()
            .unwrap()
            .insert((destination.clone(), *send_hash), info.clone());
        Ok(())
    }

    fn get_pending(&self, destination: &Account, send_hash: &TxHash) -> Result<PendingInfo, StoreError> {
        self.pending
            .lock()
            .unwrap()
            .get(&(destination.clone(), *send_hash))
            .cloned()
            .ok_or_else(|| StoreError::NotFound("pending".into()))
    }

    fn delete_pending(&self, destination: &Account, send_hash: &TxHash) -> Result<(), StoreError> {
        self.pending
            .lock()
            .unwrap()
            .remove(&(destination.clone(), *send_hash));
        Ok(())
    }

    fn get_pending_for_account(
        &self,
        destination: &Account,
    ) -> Result<Vec<(TxHash, PendingInfo)>, StoreError> {
        Ok(self
            .pending
            .lock()
            .unwrap()
            .iter()
            .filter(|((acct, _), _)| acct == destination)
            .map(|((_, hash), info)| (*hash, info.clone()))
            .collect())
    }

    fn pending_count(&self) -> Result<u64, StoreError> {
        Ok(self.pending.lock().unwrap().len() as u64)
    }
}

impl ConfirmationHeightStore for NullStore {
    fn get_confirmation_height(&self, account: &Account) -> Result<ConfirmationHeightInfo, StoreError> {
        self.heights
            .lock()
            .unwrap()
            .get(account)
            .copied()
            .ok_or_else(|| StoreError::NotFound("confirmation height".into()))
    }

    fn put_confirmation_height(
        &self,
        account: &Account,
        info: &ConfirmationHeightInfo,
    ) -> Result<(), StoreError> {
        self.heights.lock().unwrap().insert(account.clone(), *info);
        Ok(())
    }

    fn delete_confirmation_height(&self, account: &Account) -> Result<(), StoreError> {
        self.heights.lock().unwrap().remove(account);
        Ok(())
    }

    fn exists(&self, account: &Account) -> Result<bool, StoreError> {
        Ok(self.heights.lock().unwrap().contains_key(account))
    }

    fn count(&self) -> Result<u64, StoreError> {
        Ok(self.heights.lock().unwrap().len() as u64)
    }
}

impl PrunedStore for NullStore {
    fn put_pruned(&self, hash: &BlockHash) -> Result<(), StoreError> {
        self.pruned.lock().unwrap().push(*hash);
        Ok(())
    }

    fn delete_pruned(&self, hash: &BlockHash) -> Result<(), StoreError> {
        self.pruned.lock().unwrap().retain(|h| h != hash);
        Ok(())
    }

    fn is_pruned(&self, hash: &BlockHash) -> Result<bool, StoreError> {
        Ok(self.pruned.lock().unwrap().contains(hash))
    }

    fn iter_pruned(&self) -> Result<Vec<BlockHash>, StoreError> {
        Ok(self.pruned.lock().unwrap().clone())
    }

    fn pruned_count(&self) -> Result<u64, StoreError> {
        Ok(self.pruned.lock().unwrap().len() as u64)
    }
}
