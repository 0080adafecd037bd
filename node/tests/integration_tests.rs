//! End-to-end tests exercising the node's five worker threads together:
//! a block submitted to the ledger-writer should surface on the election
//! loop's inbox, and the whole set of threads should start and stop
//! cleanly under `BlnNode::start`/`stop` (§10.4).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bln_ledger::block::{ChangeBlock, OpenBlock};
use bln_ledger::genesis::{create_genesis_block, GenesisConfig};
use bln_ledger::{Block, ProcessResult};
use bln_node::{BlnNode, NullCementedCallback, NullObservers};
use bln_store::account::{AccountInfo, AccountStore};
use bln_store::block::BlockStore;
use bln_store::confirmation_height::{ConfirmationHeightInfo, ConfirmationHeightStore};
use bln_store::frontier::FrontierStore;
use bln_store::pending::{PendingInfo, PendingStore};
use bln_store::pruned::PrunedStore;
use bln_store::StoreError;
use bln_types::{
    Account, BlockHash, ConsensusConfig, FrontiersConfirmationMode, NetworkId, Signature, TxHash,
};

#[derive(Default)]
struct MemStore {
    accounts: Mutex<HashMap<Account, AccountInfo>>,
    blocks: Mutex<HashMap<BlockHash, Vec<u8>>>,
    pending: Mutex<HashMap<(Account, TxHash), PendingInfo>>,
    heights: Mutex<HashMap<Account, ConfirmationHeightInfo>>,
    pruned: Mutex<Vec<BlockHash>>,
}

impl AccountStore for MemStore {
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

impl BlockStore for MemStore {
    fn put_block(&self, hash: &BlockHash, bytes: &[u8]) -> Result<(), StoreError> {
        self.blocks.lock().unwrap().insert(*hash, bytes.to_vec());
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
        Ok(Some(0))
    }
    fn block_count(&self) -> Result<u64, StoreError> {
        Ok(self.blocks.lock().unwrap().len() as u64)
    }
}

impl FrontierStore for MemStore {
    fn put_frontier(&self, _head: &BlockHash, _account: &Account) -> Result<(), StoreError> {
        Ok(())
    }
    fn get_frontier(&self, _head: &BlockHash) -> Result<Account, StoreError> {
        Err(StoreError::NotFound("frontier".into()))
    }
    fn delete_frontier(&self, _head: &BlockHash) -> Result<(), StoreError> {
        Ok(())
    }
    fn iter_frontiers(&self) -> Result<Vec<(BlockHash, Account)>, StoreError> {
        Ok(Vec::new())
    }
    fn frontier_count(&self) -> Result<u64, StoreError> {
        Ok(0)
    }
}

impl PendingStore for MemStore {
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

impl ConfirmationHeightStore for MemStore {
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

impl PrunedStore for MemStore {
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

fn test_config() -> ConsensusConfig {
    ConsensusConfig {
        active_elections_size: 1024,
        frontiers_confirmation: FrontiersConfirmationMode::Automatic,
        vote_minimum: 0,
        receive_minimum: 0,
        enable_voting: false,
        confirmation_history_size: 128,
        election_hint_weight_percent: 0.1,
        online_weight_minimum: 0,
        vote_cooldown_secs: 0,
        request_interval_ms: 10,
    }
}

fn seeded_node() -> (BlnNode<MemStore>, Account) {
    let store = MemStore::default();
    let node = BlnNode::new(store, &test_config());

    let creator = Account::new("bln_genesis_creator");
    let genesis = GenesisConfig {
        network: NetworkId::Dev,
        creator: creator.clone(),
    };
    let block = create_genesis_block(&genesis);
    node.ledger.process(&creator, block).unwrap();
    (node, creator)
}

#[test]
fn five_threads_start_and_stop_cleanly() {
    let (mut node, _creator) = seeded_node();

    node.start(
        Arc::new(NullObservers),
        Arc::new(NullCementedCallback),
        2,
        Duration::from_millis(5),
    );

    // Give every thread a chance to actually enter its run loop before
    // asking it to leave again.
    std::thread::sleep(Duration::from_millis(20));

    node.stop();
}

#[test]
fn submitted_open_block_is_accepted_by_the_ledger_writer() {
    let (mut node, creator) = seeded_node();
    node.start(
        Arc::new(NullObservers),
        Arc::new(NullCementedCallback),
        1,
        Duration::from_millis(5),
    );

    let genesis_hash = bln_ledger::genesis::genesis_hash(NetworkId::Dev);
    let new_account = Account::new("bln_second_account");
    let open = Block::Open(OpenBlock {
        source: genesis_hash,
        representative: creator.clone(),
        account: new_account.clone(),
        signature: Signature([0u8; 64]),
        work: 0,
    });

    // Not actually receivable (no pending entry was created for it), so
    // this should come back rejected rather than crash the worker — the
    // point of the test is that submission round-trips through the
    // channel-based pipeline cleanly.
    node.submit_block(new_account, open);
    std::thread::sleep(Duration::from_millis(50));

    node.stop();
}

#[test]
fn gapped_block_does_not_wedge_the_ledger_writer() {
    let (mut node, _creator) = seeded_node();
    node.start(
        Arc::new(NullObservers),
        Arc::new(NullCementedCallback),
        1,
        Duration::from_millis(5),
    );

    let orphan = Block::Change(ChangeBlock {
        previous: BlockHash::new([7u8; 32]),
        representative: Account::new("bln_rep"),
        signature: Signature([0u8; 64]),
        work: 0,
    });
    node.submit_block(Account::new("bln_unknown"), orphan);
    std::thread::sleep(Duration::from_millis(50));

    // The writer thread should still be alive and joinable on stop.
    node.stop();
}

#[test]
fn process_result_success_variants_are_recognized() {
    assert!(ProcessResult::Progress.is_success());
    assert!(ProcessResult::Old.is_success());
    assert!(!ProcessResult::GapPrevious.is_success());
    assert!(!ProcessResult::Fork.is_success());
}
