//! `BlnNode` — owns C4-C8 and wires together the five threads of §5.
//!
//! A minimal daemon entrypoint constructs one of these over in-memory or
//! LMDB storage and a stub [`Broadcaster`], calls [`BlnNode::start`], and
//! [`BlnNode::stop`]s it again; that's the full extent of this crate's
//! node-lifecycle responsibility (§10.4 — no sockets opened here).

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use bln_consensus::{ActiveElections, RepWeightCache, VoteCache};
use bln_ledger::Ledger;
use bln_store::account::AccountStore;
use bln_store::block::BlockStore;
use bln_store::confirmation_height::ConfirmationHeightStore;
use bln_store::frontier::FrontierStore;
use bln_store::pending::PendingStore;
use bln_store::pruned::PrunedStore;
use bln_types::{Account, ConsensusConfig};
use bln_wallet_core::Wallet;

use crate::block_processor::{BlockContext, BlockProcessor};
use crate::broadcaster::{BootstrapHint, Broadcaster, NullBroadcaster};
use crate::confirmation_height_processor::{
    CementedCallback, ConfirmationHeightProcessor, NullCementedCallback,
};
use crate::election_loop::{self, ElectionLoopHandles};
use crate::observers::{NullObservers, Observers};
use crate::shutdown::ShutdownController;
use crate::vote_processor::{self, WeightLookup};

/// Looks up a representative's weight from the shared [`RepWeightCache`].
struct RepWeightLookup(Arc<Mutex<RepWeightCache>>);

impl WeightLookup for RepWeightLookup {
    fn weight_of(&self, rep: &Account) -> u128 {
        self.0.lock().unwrap().weight(rep)
    }
}

/// Thread handles joined in `stop()`, innermost consumer first.
#[derive(Default)]
struct ThreadHandles {
    ledger_writer: Option<JoinHandle<()>>,
    confirmation_height: Option<JoinHandle<()>>,
    election_loop: Option<JoinHandle<()>>,
    vote_processors: Vec<JoinHandle<()>>,
    wallet_actions: Option<JoinHandle<()>>,
}

/// The node's C4-C8 core plus the five worker threads that drive it.
///
/// Threads, innermost first: ledger-writer consumes `BlockContext`s off
/// `block_submit` and publishes `ProcessedBlock`s; the election loop
/// consumes those plus validated votes and submits winners to the
/// confirmation-height processor, which persists heights and fires the
/// cemented callback. The wallet's own action-queue worker runs
/// independently, serializing signed block construction (§4.8).
pub struct BlnNode<S> {
    pub ledger: Arc<Ledger<S>>,
    pub active_elections: Arc<Mutex<ActiveElections>>,
    pub rep_weights: Arc<Mutex<RepWeightCache>>,
    pub vote_cache: Arc<Mutex<VoteCache>>,
    pub broadcaster: Arc<dyn Broadcaster>,
    pub bootstrap_hint: Arc<dyn BootstrapHint>,
    pub wallet: Option<Wallet<S>>,
    block_submit: Option<std::sync::mpsc::SyncSender<BlockContext>>,
    vote_submit: Option<std::sync::mpsc::SyncSender<crate::broadcaster::Vote>>,
    shutdown: ShutdownController,
    threads: ThreadHandles,
}

impl<S> BlnNode<S>
where
    S: AccountStore
        + BlockStore
        + FrontierStore
        + PendingStore
        + ConfirmationHeightStore
        + PrunedStore
        + Send
        + Sync
        + 'static,
{
    /// Build a node over an already genesis-seeded ledger. No threads are
    /// running yet; call [`Self::start`] to spawn them.
    pub fn new(store: S, config: &ConsensusConfig) -> Self {
        Self {
            ledger: Arc::new(Ledger::new(store)),
            active_elections: Arc::new(Mutex::new(ActiveElections::new(
                config.active_elections_size,
                config.online_weight_minimum,
            ))),
            rep_weights: Arc::new(Mutex::new(RepWeightCache::new())),
            vote_cache: Arc::new(Mutex::new(VoteCache::new())),
            broadcaster: Arc::new(NullBroadcaster::default()),
            bootstrap_hint: Arc::new(NullBroadcaster::default()),
            wallet: None,
            block_submit: None,
            vote_submit: None,
            shutdown: ShutdownController::new(),
            threads: ThreadHandles::default(),
        }
    }

    /// Swap in a real broadcaster/bootstrap-hint implementation. Must be
    /// called before [`Self::start`].
    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    /// Attach a wallet whose action-queue worker should start alongside the
    /// other four threads. Must be called before [`Self::start`].
    pub fn with_wallet(mut self, wallet: Wallet<S>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    /// Spawn the five worker threads of §5. `vote_threads` sizes the vote
    /// processor pool; `request_interval` paces the election loop's tick.
    pub fn start(
        &mut self,
        observers: Arc<dyn Observers>,
        cemented_callback: Arc<dyn CementedCallback>,
        vote_threads: usize,
        request_interval: Duration,
    ) {
        let (ledger_writer, block_handle) = BlockProcessor::spawn(
            self.ledger.clone(),
            observers.clone(),
            self.shutdown.clone(),
            4096,
            65536,
        );

        let (confirmation_height, cement_handle) = ConfirmationHeightProcessor::spawn(
            self.ledger.clone(),
            observers,
            cemented_callback,
            self.shutdown.clone(),
            4096,
        );

        let (vote_processors, vote_handle) = vote_processor::spawn(
            vote_threads.max(1),
            self.vote_cache.clone(),
            Arc::new(RepWeightLookup(self.rep_weights.clone())),
            self.shutdown.clone(),
            4096,
        );

        let election_loop = election_loop::spawn(
            self.active_elections.clone(),
            self.rep_weights.clone(),
            ElectionLoopHandles {
                processed_blocks: block_handle.results,
                validated_votes: vote_handle.validated,
                cement_submit: cement_handle.submit,
            },
            request_interval,
            self.shutdown.clone(),
        );

        let wallet_actions = self.wallet.as_ref().map(|w| w.spawn_action_worker());

        self.block_submit = Some(block_handle.submit);
        self.vote_submit = Some(vote_handle.submit);
        self.threads = ThreadHandles {
            ledger_writer: Some(ledger_writer),
            confirmation_height: Some(confirmation_height),
            election_loop: Some(election_loop),
            vote_processors,
            wallet_actions,
        };
    }

    /// Submit a block to the ledger-writer thread. Panics if called before
    /// [`Self::start`].
    pub fn submit_block(&self, account: Account, block: bln_ledger::Block) {
        self.block_submit
            .as_ref()
            .expect("node not started")
            .send(BlockContext { account, block })
            .ok();
    }

    /// Submit an incoming vote to the vote processor pool. Panics if called
    /// before [`Self::start`].
    pub fn submit_vote(&self, vote: crate::broadcaster::Vote) {
        self.vote_submit
            .as_ref()
            .expect("node not started")
            .send(vote)
            .ok();
    }

    /// Signal every thread to stop and join them. Idempotent.
    pub fn stop(&mut self) {
        self.shutdown.stop();
        if let Some(wallet) = &self.wallet {
            wallet.stop_action_worker();
        }
        if let Some(h) = self.threads.wallet_actions.take() {
            let _ = h.join();
        }
        if let Some(h) = self.threads.ledger_writer.take() {
            let _ = h.join();
        }
        if let Some(h) = self.threads.confirmation_height.take() {
            let _ = h.join();
        }
        if let Some(h) = self.threads.election_loop.take() {
            let _ = h.join();
        }
        for h in self.threads.vote_processors.drain(..) {
            let _ = h.join();
        }
    }

    pub fn shutdown_controller(&self) -> ShutdownController {
        self.shutdown.clone()
    }
}

impl<S> Drop for BlnNode<S> {
    fn drop(&mut self) {
        self.shutdown.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bln_ledger::genesis::{create_genesis_block, GenesisConfig};
    use bln_store::account::{AccountInfo, AccountStore};
    use bln_store::block::BlockStore;
    use bln_store::confirmation_height::{ConfirmationHeightInfo, ConfirmationHeightStore};
    use bln_store::frontier::FrontierStore;
    use bln_store::pending::{PendingInfo, PendingStore};
    use bln_store::pruned::PrunedStore;
    use bln_store::StoreError;
    use bln_types::{BlockHash, ConsensusConfig, FrontiersConfirmationMode, NetworkId, TxHash};
    use std::collections::HashMap;

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
        fn get_pending(
            &self,
            destination: &Account,
            send_hash: &TxHash,
        ) -> Result<PendingInfo, StoreError> {
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
        fn get_confirmation_height(
            &self,
            account: &Account,
        ) -> Result<ConfirmationHeightInfo, StoreError> {
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

    #[test]
    fn starts_and_stops_all_five_threads_cleanly() {
        let store = MemStore::default();
        let config = test_config();
        let mut node = BlnNode::new(store, &config);

        let creator = Account::new("bln_genesis_creator");
        let genesis = GenesisConfig {
            network: NetworkId::Dev,
            creator: creator.clone(),
        };
        let block = create_genesis_block(&genesis);
        node.ledger.process(&creator, block).unwrap();

        let (wallet, _seed) = Wallet::create(node.ledger.clone(), "hunter2", 0).unwrap();
        node = node.with_wallet(wallet);

        node.start(
            Arc::new(NullObservers),
            Arc::new(NullCementedCallback),
            2,
            Duration::from_millis(5),
        );

        node.stop();
    }
}
