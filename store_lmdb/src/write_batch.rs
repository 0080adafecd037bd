//! Write batching — groups multiple store operations into a single LMDB write
//! transaction, amortising the cost of the fsync that each commit performs.
//!
//! # Usage
//!
//! ```ignore
//! let mut batch = env.write_batch()?;
//! batch.put_block(&hash, &block_bytes)?;
//! batch.put_account_block_index(&account, height, &hash)?;
//! batch.put_account(&account, &account_info_bytes)?;
//! batch.commit()?;
//! ```
//!
//! If the batch is dropped without calling [`WriteBatch::commit`], all
//! operations are rolled back (the underlying LMDB transaction is aborted).

use heed::RwTxn;

use bln_store::StoreError;
use bln_types::{Account, BlockHash, TxHash};

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

/// A write batch that groups multiple store operations into a single LMDB
/// write transaction, amortising the cost of the fsync.
pub struct WriteBatch<'a> {
    txn: RwTxn<'a>,
    env: &'a LmdbEnvironment,
}

impl<'a> WriteBatch<'a> {
    pub(crate) fn new(env: &'a LmdbEnvironment) -> Result<Self, StoreError> {
        let txn = env.env().write_txn().map_err(LmdbError::from)?;
        Ok(Self { txn, env })
    }

    // ── Block operations ────────────────────────────────────────────────

    /// Put a block into the batch (block + sideband bytes, keyed by hash).
    pub fn put_block(&mut self, hash: &BlockHash, block_bytes: &[u8]) -> Result<(), StoreError> {
        self.env
            .blocks_db
            .put(&mut self.txn, hash.as_bytes(), block_bytes)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    /// Put a block and update the account-chain height indexes.
    ///
    /// `height` is the block's 1-based sequence number in the account chain.
    pub fn put_block_with_account(
        &mut self,
        hash: &BlockHash,
        block_bytes: &[u8],
        account: &Account,
        height: u64,
    ) -> Result<(), StoreError> {
        self.env
            .blocks_db
            .put(&mut self.txn, hash.as_bytes(), block_bytes)
            .map_err(LmdbError::from)?;

        let mut hk = account.as_str().as_bytes().to_vec();
        hk.extend_from_slice(&height.to_be_bytes());
        self.env
            .account_blocks_db
            .put(&mut self.txn, &hk, hash.as_bytes())
            .map_err(LmdbError::from)?;

        self.env
            .block_height_db
            .put(&mut self.txn, hash.as_bytes(), &height.to_be_bytes())
            .map_err(LmdbError::from)?;

        Ok(())
    }

    /// Delete a block from the store (its body only; retain the hash
    /// separately via `put_pruned` if this is a pruning operation).
    pub fn delete_block(&mut self, hash: &BlockHash) -> Result<(), StoreError> {
        self.env
            .blocks_db
            .delete(&mut self.txn, hash.as_bytes().as_slice())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    // ── Frontier operations (legacy hash -> account table) ──────────────

    pub fn put_frontier(&mut self, head: &BlockHash, account: &Account) -> Result<(), StoreError> {
        self.env
            .frontiers_db
            .put(&mut self.txn, head.as_bytes(), account.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn delete_frontier(&mut self, head: &BlockHash) -> Result<(), StoreError> {
        self.env
            .frontiers_db
            .delete(&mut self.txn, head.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    // ── Account operations ──────────────────────────────────────────────

    /// Put an account record into the batch (pre-serialised bytes).
    pub fn put_account(&mut self, account: &Account, data: &[u8]) -> Result<(), StoreError> {
        self.env
            .accounts_db
            .put(&mut self.txn, account.as_str().as_bytes(), data)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    // ── Pending operations ──────────────────────────────────────────────

    /// Put a pending entry into the batch (binary composite key).
    pub fn put_pending(
        &mut self,
        destination: &Account,
        send_hash: &TxHash,
        data: &[u8],
    ) -> Result<(), StoreError> {
        let key = pending_key(destination, send_hash);
        self.env
            .pending_db
            .put(&mut self.txn, &key, data)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    /// Delete a pending entry from the batch.
    pub fn delete_pending(
        &mut self,
        destination: &Account,
        send_hash: &TxHash,
    ) -> Result<(), StoreError> {
        let key = pending_key(destination, send_hash);
        self.env
            .pending_db
            .delete(&mut self.txn, &key)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    // ── Confirmation height operations ──────────────────────────────────

    pub fn put_confirmation_height(
        &mut self,
        account: &Account,
        data: &[u8],
    ) -> Result<(), StoreError> {
        self.env
            .confirmation_height_db
            .put(&mut self.txn, account.as_str().as_bytes(), data)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    // ── Pruned operations ────────────────────────────────────────────────

    pub fn put_pruned(&mut self, hash: &BlockHash) -> Result<(), StoreError> {
        self.env
            .pruned_db
            .put(&mut self.txn, hash.as_bytes(), &[])
            .map_err(LmdbError::from)?;
        Ok(())
    }

    // ── Meta operations ─────────────────────────────────────────────────

    pub fn put_meta(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.env
            .meta_db
            .put(&mut self.txn, key.as_bytes(), value)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    // ── Commit / rollback ───────────────────────────────────────────────

    /// Commit all batched operations in a single write transaction. This is
    /// the only fsync in the entire batch.
    pub fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

fn pending_key(destination: &Account, send_hash: &TxHash) -> Vec<u8> {
    let dest = destination.as_str().as_bytes();
    let mut key = Vec::with_capacity(dest.len() + 32);
    key.extend_from_slice(dest);
    key.extend_from_slice(send_hash.as_bytes());
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use bln_store::block::BlockStore;
    use bln_store::frontier::FrontierStore;

    fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let env = LmdbEnvironment::open(dir.path(), 16, 10 * 1024 * 1024)
            .expect("failed to open env");
        (dir, env)
    }

    #[test]
    fn batch_put_block_and_frontier_committed() {
        let (_dir, env) = temp_env();

        let hash = BlockHash::new([1u8; 32]);
        let account = Account::new(
            "bln_1genesis1ive1111111111111111111111111111111111111111111111111111111",
        );
        let block_bytes = b"fake-block-data";

        let mut batch = env.write_batch().expect("write_batch");
        batch.put_block(&hash, block_bytes).expect("put_block");
        batch.put_frontier(&hash, &account).expect("put_frontier");
        batch.commit().expect("commit");

        let block_store = env.block_store();
        let stored = block_store.get_block(&hash).expect("get_block");
        assert_eq!(stored, block_bytes);

        let frontier_store = env.frontier_store();
        let owner = frontier_store.get_frontier(&hash).expect("get_frontier");
        assert_eq!(owner, account);
    }

    #[test]
    fn dropped_batch_does_not_persist() {
        let (_dir, env) = temp_env();

        let hash = BlockHash::new([2u8; 32]);
        let block_bytes = b"should-not-persist";

        {
            let mut batch = env.write_batch().expect("write_batch");
            batch.put_block(&hash, block_bytes).expect("put_block");
        }

        let block_store = env.block_store();
        let result = block_store.get_block(&hash);
        assert!(result.is_err(), "dropped batch should not persist");
    }

    #[test]
    fn batch_multiple_blocks() {
        let (_dir, env) = temp_env();

        let mut batch = env.write_batch().expect("write_batch");

        let hashes: Vec<BlockHash> = (0..10)
            .map(|i| {
                let mut bytes = [0u8; 32];
                bytes[0] = i;
                BlockHash::new(bytes)
            })
            .collect();

        for (i, hash) in hashes.iter().enumerate() {
            let data = format!("block-{i}");
            batch.put_block(hash, data.as_bytes()).expect("put_block");
        }

        batch.commit().expect("commit");

        let block_store = env.block_store();
        for (i, hash) in hashes.iter().enumerate() {
            let stored = block_store.get_block(hash).expect("get_block");
            assert_eq!(stored, format!("block-{i}").as_bytes());
        }
    }

    #[test]
    fn batch_delete_block() {
        let (_dir, env) = temp_env();

        let hash = BlockHash::new([3u8; 32]);
        let block_bytes = b"to-be-deleted";

        let mut batch = env.write_batch().expect("write_batch");
        batch.put_block(&hash, block_bytes).expect("put_block");
        batch.commit().expect("commit");

        let mut batch = env.write_batch().expect("write_batch");
        batch.delete_block(&hash).expect("delete_block");
        batch.commit().expect("commit");

        let block_store = env.block_store();
        assert!(block_store.get_block(&hash).is_err());
    }

    #[test]
    fn batch_put_meta() {
        let (_dir, env) = temp_env();

        let mut batch = env.write_batch().expect("write_batch");
        batch.put_meta("schema_version", b"42").expect("put_meta");
        batch.commit().expect("commit");

        let rtxn = env.env().read_txn().expect("read_txn");
        let stored = env
            .meta_db
            .get(&rtxn, "schema_version".as_bytes())
            .expect("get")
            .expect("meta should exist");
        assert_eq!(stored, b"42");
    }
}
