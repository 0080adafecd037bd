//! The wallet: unlocks a key store, derives and imports account keys, and
//! serializes signed block construction through the action queue (spec
//! §4.8). Every ledger-mutating call blocks the caller until the single
//! wallet-actions worker thread has processed it, but does not itself hold
//! any store transaction open longer than that one call.

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use bln_crypto::derive_address;
use bln_ledger::block::{Block, StateBlock};
use bln_ledger::ledger::Ledger;
use bln_store::{AccountStore, BlockStore, ConfirmationHeightStore, FrontierStore, PendingStore, PrunedStore};
use bln_types::{Account, BlockHash, PrivateKey, PublicKey, TxHash};
use bln_work::generator::WorkGenerator;
use bln_work::thresholds::{WorkBlockKind, WorkThresholds};

use crate::action_queue::{ActionQueue, Priority};
use crate::error::WalletError;
use crate::keystore::{KeystoreFile, WalletKey};
use crate::transaction_builder::{self, AccountSnapshot};

fn as_tx_hash(hash: &BlockHash) -> TxHash {
    TxHash::new(*hash.as_bytes())
}

struct WalletInner<S> {
    ledger: Arc<Ledger<S>>,
    keystore: Mutex<KeystoreFile>,
    wallet_key: Mutex<Option<WalletKey>>,
    action_queue: ActionQueue,
    work_generator: WorkGenerator,
    work_thresholds: WorkThresholds,
    receive_minimum: u128,
    send_action_ids: Mutex<HashMap<String, BlockHash>>,
}

/// A wallet backed by store `S`. Cheap to clone — every clone shares the
/// same key store, action queue, and ledger handle.
pub struct Wallet<S>(Arc<WalletInner<S>>);

impl<S> Clone for Wallet<S> {
    fn clone(&self) -> Self {
        Wallet(Arc::clone(&self.0))
    }
}

impl<S> Wallet<S>
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
    pub fn new(
        ledger: Arc<Ledger<S>>,
        keystore: KeystoreFile,
        wallet_key: WalletKey,
        receive_minimum: u128,
    ) -> Self {
        Wallet(Arc::new(WalletInner {
            ledger,
            keystore: Mutex::new(keystore),
            wallet_key: Mutex::new(Some(wallet_key)),
            action_queue: ActionQueue::new(),
            work_generator: WorkGenerator,
            work_thresholds: WorkThresholds::new(),
            receive_minimum,
            send_action_ids: Mutex::new(HashMap::new()),
        }))
    }

    /// Create a brand new wallet (fresh key store) unlocked with `password`.
    /// Returns the plaintext seed alongside the wallet so the caller can
    /// display it once for backup purposes.
    pub fn create(
        ledger: Arc<Ledger<S>>,
        password: &str,
        receive_minimum: u128,
    ) -> Result<(Self, [u8; 32]), WalletError> {
        let (keystore, seed) = KeystoreFile::create(password)?;
        let wallet_key = keystore.attempt_password(password)?;
        Ok((
            Self::new(ledger, keystore, wallet_key, receive_minimum),
            seed,
        ))
    }

    /// Re-open an existing key store, locked.
    pub fn open_locked(
        ledger: Arc<Ledger<S>>,
        keystore: KeystoreFile,
        receive_minimum: u128,
    ) -> Self {
        Wallet(Arc::new(WalletInner {
            ledger,
            keystore: Mutex::new(keystore),
            wallet_key: Mutex::new(None),
            action_queue: ActionQueue::new(),
            work_generator: WorkGenerator,
            work_thresholds: WorkThresholds::new(),
            receive_minimum,
            send_action_ids: Mutex::new(HashMap::new()),
        }))
    }

    /// Spawn the dedicated wallet-actions worker thread (spec §5).
    pub fn spawn_action_worker(&self) -> JoinHandle<()> {
        self.0.action_queue.spawn_worker()
    }

    /// Signal the worker thread to stop after draining in-flight work.
    pub fn stop_action_worker(&self) {
        self.0.action_queue.stop();
    }

    pub fn is_locked(&self) -> bool {
        self.0.wallet_key.lock().expect("wallet_key mutex poisoned").is_none()
    }

    pub fn lock(&self) {
        *self.0.wallet_key.lock().expect("wallet_key mutex poisoned") = None;
    }

    pub fn unlock(&self, password: &str) -> Result<(), WalletError> {
        let key = self
            .0
            .keystore
            .lock()
            .expect("keystore mutex poisoned")
            .attempt_password(password)?;
        *self.0.wallet_key.lock().expect("wallet_key mutex poisoned") = Some(key);
        Ok(())
    }

    pub fn rekey(&self, new_password: &str) -> Result<(), WalletError> {
        let wallet_key = self.wallet_key()?;
        self.0
            .keystore
            .lock()
            .expect("keystore mutex poisoned")
            .rekey(&wallet_key, new_password)
    }

    fn wallet_key(&self) -> Result<WalletKey, WalletError> {
        self.0
            .wallet_key
            .lock()
            .expect("wallet_key mutex poisoned")
            .clone()
            .ok_or(WalletError::WalletLocked)
    }

    /// Snapshot the current key store (for persistence by the caller).
    pub fn keystore_snapshot(&self) -> KeystoreFile {
        self.0.keystore.lock().expect("keystore mutex poisoned").clone()
    }

    /// Derive and register the next deterministic account.
    pub fn new_deterministic_account(&self) -> Result<Account, WalletError> {
        let wallet_key = self.wallet_key()?;
        let mut keystore = self.0.keystore.lock().expect("keystore mutex poisoned");
        let (private, _index) = keystore.next_deterministic_key(&wallet_key)?;
        let public = bln_crypto::keys::public_from_private(&private);
        Ok(derive_address(&public))
    }

    /// Import an externally-generated private key as an ad-hoc account.
    pub fn insert_adhoc_key(&self, private: PrivateKey) -> Result<Account, WalletError> {
        let wallet_key = self.wallet_key()?;
        let public = bln_crypto::keys::public_from_private(&private);
        self.0
            .keystore
            .lock()
            .expect("keystore mutex poisoned")
            .insert_adhoc_key(&wallet_key, &public, &private);
        Ok(derive_address(&public))
    }

    /// Track `account` without any key material (e.g. a cold-storage address).
    pub fn insert_watch_only(&self, account: &Account) -> Result<(), WalletError> {
        let public = account_public_key(account)?;
        self.0
            .keystore
            .lock()
            .expect("keystore mutex poisoned")
            .insert_watch_only(&public);
        Ok(())
    }

    pub fn set_representative(&self, representative: &Account) {
        self.0
            .keystore
            .lock()
            .expect("keystore mutex poisoned")
            .set_representative(representative);
    }

    fn find_private_key(&self, account: &Account) -> Result<PrivateKey, WalletError> {
        let wallet_key = self.wallet_key()?;
        let keystore = self.0.keystore.lock().expect("keystore mutex poisoned");
        let public = account_public_key(account)?;
        let pub_hex = hex_encode(public.as_bytes());

        if keystore.adhoc_keys.contains_key(&pub_hex) {
            return keystore.adhoc_key(&wallet_key, &public);
        }
        for index in 0..keystore.deterministic_index {
            let candidate = keystore.deterministic_key_at(&wallet_key, index)?;
            if bln_crypto::keys::public_from_private(&candidate) == public {
                return Ok(candidate);
            }
        }
        if keystore.watch_only.contains(&pub_hex) {
            return Err(WalletError::Key("watch-only account has no private key".into()));
        }
        Err(WalletError::Key("account is not held by this wallet".into()))
    }

    fn account_snapshot(&self, account: &Account) -> Option<AccountSnapshot> {
        self.0
            .ledger
            .store()
            .get_account(account)
            .ok()
            .map(|info| AccountSnapshot {
                head: info.head,
                representative: info.representative,
                balance: info.balance,
            })
    }

    fn ensure_work(&self, block: &mut StateBlock, account: &Account, kind: WorkBlockKind) -> Result<(), WalletError> {
        let root = transaction_builder::work_root(account, &block.previous)?;
        let required = self.0.work_thresholds.threshold_for(kind);
        if !bln_work::validate_work(&root, block.work, required) {
            let nonce = self
                .0
                .work_generator
                .generate(&root, required)
                .map_err(|e| WalletError::WorkGenerationFailed(e.to_string()))?;
            block.work = nonce.0;
        }
        Ok(())
    }

    fn remember_action_id(&self, id: Option<&str>, hash: BlockHash) {
        if let Some(id) = id {
            self.0
                .send_action_ids
                .lock()
                .expect("send_action_ids mutex poisoned")
                .insert(id.to_string(), hash);
        }
    }

    fn cached_action(&self, id: Option<&str>) -> Option<BlockHash> {
        id.and_then(|id| {
            self.0
                .send_action_ids
                .lock()
                .expect("send_action_ids mutex poisoned")
                .get(id)
                .copied()
        })
    }

    /// Queue a send. Idempotent when `id` is supplied: a retry with the
    /// same `id` returns the block hash from the first attempt without
    /// submitting a second block.
    pub fn send(
        &self,
        from: Account,
        to: Account,
        amount: u128,
        id: Option<String>,
    ) -> Result<BlockHash, WalletError> {
        if let Some(hash) = self.cached_action(id.as_deref()) {
            return Ok(hash);
        }
        self.run_action(Priority::amount(amount), from.clone(), move |wallet| {
            wallet.do_send(&from, &to, amount, id.as_deref())
        })
    }

    /// Queue a receive of a pending send, opening the account if it's new.
    pub fn receive(
        &self,
        send_hash: BlockHash,
        representative: Account,
        amount: u128,
        account: Account,
    ) -> Result<BlockHash, WalletError> {
        self.run_action(Priority::amount(amount), account.clone(), move |wallet| {
            wallet.do_receive(send_hash, &representative, amount, &account)
        })
    }

    /// Queue a representative change. Always serviced ahead of sends and
    /// receives (spec §4.8's `high_priority`).
    pub fn change(&self, source: Account, new_representative: Account) -> Result<BlockHash, WalletError> {
        self.run_action(Priority::high_priority(), source.clone(), move |wallet| {
            wallet.do_change(&source, &new_representative)
        })
    }

    /// Precache proof-of-work for `account`'s likely next block. Lowest
    /// priority: runs only when nothing else is queued.
    pub fn precache_work(&self, account: Account) {
        let wallet = self.clone();
        self.0.action_queue.push(Priority::generate_priority(), account.clone(), move || {
            let _ = wallet.do_precache_work(&account);
        });
    }

    fn run_action<F>(&self, priority: Priority, wallet_id: Account, action: F) -> Result<BlockHash, WalletError>
    where
        F: FnOnce(&Wallet<S>) -> Result<BlockHash, WalletError> + Send + 'static,
    {
        let wallet = self.clone();
        let (tx, rx) = mpsc::channel();
        self.0.action_queue.push(priority, wallet_id, move || {
            let result = action(&wallet);
            let _ = tx.send(result);
        });
        rx.recv()
            .map_err(|_| WalletError::Other("wallet action worker dropped the result channel".into()))?
    }

    fn do_send(&self, from: &Account, to: &Account, amount: u128, id: Option<&str>) -> Result<BlockHash, WalletError> {
        let private = self.find_private_key(from)?;
        let snapshot = self.account_snapshot(from).ok_or(WalletError::SourceMissing)?;
        let mut block = transaction_builder::build_send_block(&snapshot, from, to, amount, &private)?;
        self.ensure_work(&mut block, from, WorkBlockKind::Base)?;

        let hash = Block::State(block.clone()).hash(from);
        let outcome = self.0.ledger.process(from, Block::State(block))?;
        if !outcome.is_success() {
            return Err(WalletError::Other(format!("ledger rejected send: {outcome}")));
        }
        self.remember_action_id(id, hash);
        self.precache_work(from.clone());
        Ok(hash)
    }

    fn do_receive(
        &self,
        send_hash: BlockHash,
        representative: &Account,
        amount: u128,
        account: &Account,
    ) -> Result<BlockHash, WalletError> {
        if amount < self.0.receive_minimum {
            return Err(WalletError::Other(format!(
                "amount {amount} below receive_minimum {}",
                self.0.receive_minimum
            )));
        }
        let pending = self
            .0
            .ledger
            .store()
            .get_pending(account, &as_tx_hash(&send_hash))
            .map_err(|_| WalletError::SourceMissing)?;
        if pending.amount != amount {
            return Err(WalletError::Other(
                "receive amount does not match pending entry".into(),
            ));
        }

        let private = self.find_private_key(account)?;
        let snapshot = self.account_snapshot(account);
        let mut block = transaction_builder::build_receive_block(
            snapshot.as_ref(),
            account,
            send_hash,
            amount,
            representative,
            &private,
        )?;
        self.ensure_work(&mut block, account, WorkBlockKind::ReceiveOrOpen)?;

        let hash = Block::State(block.clone()).hash(account);
        let outcome = self.0.ledger.process(account, Block::State(block))?;
        if !outcome.is_success() {
            return Err(WalletError::Other(format!("ledger rejected receive: {outcome}")));
        }
        self.precache_work(account.clone());
        Ok(hash)
    }

    fn do_change(&self, source: &Account, new_representative: &Account) -> Result<BlockHash, WalletError> {
        let private = self.find_private_key(source)?;
        let snapshot = self.account_snapshot(source).ok_or(WalletError::SourceMissing)?;
        let mut block = transaction_builder::build_change_block(&snapshot, source, new_representative, &private)?;
        self.ensure_work(&mut block, source, WorkBlockKind::Base)?;

        let hash = Block::State(block.clone()).hash(source);
        let outcome = self.0.ledger.process(source, Block::State(block))?;
        if !outcome.is_success() {
            return Err(WalletError::Other(format!("ledger rejected change: {outcome}")));
        }
        Ok(hash)
    }

    fn do_precache_work(&self, account: &Account) -> Result<(), WalletError> {
        let snapshot = match self.account_snapshot(account) {
            Some(s) => s,
            None => return Ok(()),
        };
        let root = transaction_builder::work_root(account, &snapshot.head)?;
        let required = self.0.work_thresholds.threshold_for(WorkBlockKind::Base);
        self.0
            .work_generator
            .generate(&root, required)
            .map_err(|e| WalletError::WorkGenerationFailed(e.to_string()))?;
        Ok(())
    }
}

fn account_public_key(account: &Account) -> Result<PublicKey, WalletError> {
    let link = transaction_builder::account_to_link(account)?;
    Ok(PublicKey(*link.as_bytes()))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
