//! LMDB implementation of BlockStore.
//!
//! `blocks_db` holds the block + sideband bytes keyed by hash. `account_blocks_db`
//! indexes `account ++ height_be` -> hash so a chain can be walked in order
//! without touching block bodies; `block_height_db` is the reverse index used
//! to answer `height_of_block` without a chain walk.

use std::ops::Bound;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use bln_store::block::BlockStore;
use bln_store::StoreError;
use bln_types::{Account, BlockHash};

use crate::LmdbError;

pub struct LmdbBlockStore {
    pub(crate) env: Arc<Env>,
    pub(crate) blocks_db: Database<Bytes, Bytes>,
    pub(crate) account_blocks_db: Database<Bytes, Bytes>,
    pub(crate) block_height_db: Database<Bytes, Bytes>,
}

/// Increment a byte string as if it were a big-endian integer, used to
/// build an exclusive upper bound for a prefix range scan.
pub(crate) fn increment_prefix(prefix: &mut Vec<u8>) {
    for byte in prefix.iter_mut().rev() {
        if *byte == 0xff {
            *byte = 0;
        } else {
            *byte += 1;
            return;
        }
    }
    prefix.insert(0, 1);
}

impl BlockStore for LmdbBlockStore {
    fn put_block(&self, hash: &BlockHash, block_bytes: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.blocks_db
            .put(&mut wtxn, hash.as_bytes(), block_bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_block(&self, hash: &BlockHash) -> Result<Vec<u8>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .blocks_db
            .get(&rtxn, hash.as_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("block {}", hash)))?;
        Ok(val.to_vec())
    }

    fn exists(&self, hash: &BlockHash) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let exists = self
            .blocks_db
            .get(&rtxn, hash.as_bytes())
            .map_err(LmdbError::from)?
            .is_some();
        Ok(exists)
    }

    fn delete_block(&self, hash: &BlockHash) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.blocks_db
            .delete(&mut wtxn, hash.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_account_blocks(&self, account: &Account) -> Result<Vec<BlockHash>, StoreError> {
        let prefix = account.as_str().as_bytes().to_vec();
        let mut upper = prefix.clone();
        increment_prefix(&mut upper);

        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let bounds = (
            Bound::Included(prefix.as_slice()),
            Bound::Excluded(upper.as_slice()),
        );
        let iter = self
            .account_blocks_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;
        let mut hashes = Vec::new();
        for result in iter {
            let (_key, val) = result.map_err(LmdbError::from)?;
            let arr: [u8; 32] = val
                .try_into()
                .map_err(|_| LmdbError::Serialization("invalid block hash length".into()))?;
            hashes.push(BlockHash::new(arr));
        }
        Ok(hashes)
    }

    fn height_of_block(&self, hash: &BlockHash) -> Result<Option<u64>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .block_height_db
            .get(&rtxn, hash.as_bytes())
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) if bytes.len() >= 8 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&bytes[bytes.len() - 8..]);
                Ok(Some(u64::from_be_bytes(buf)))
            }
            _ => Ok(None),
        }
    }

    fn block_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.blocks_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
